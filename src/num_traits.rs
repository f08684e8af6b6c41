//! # Edge Weight Traits
//!
//! Every algorithm in this crate is generic over the edge weight type `W`.
//! The [`Weight`] trait collects what they need from it:
//!
//! - a zero value, used both as "no edge" in matrices and as the distance of
//!   a shortest path source,
//! - a fixed sentinel standing in for infinity (see [`INFINITE_WEIGHT`]),
//! - sign tests implementing the directed sign convention.
//!
//! Implementations are provided for the signed integer primitives of at least
//! 32 bits and for `f32`/`f64`. Smaller integers cannot hold the sentinel,
//! and `f32` only holds it rounded up to `2^28`.

use duplicate::duplicate;
use std::fmt::{Debug, Display};
use std::ops::{Add, Neg};

/// Sentinel used for "unreachable" and for absent edges in dense weight
/// matrices.
///
/// It is a large finite number rather than a true infinity: a path whose
/// real length reaches this value is indistinguishable from no path at all.
pub const INFINITE_WEIGHT: i64 = 0x0FFF_FFFF;

pub trait Weight:
    Copy + PartialOrd + Add<Output = Self> + Neg<Output = Self> + Display + Debug
{
    fn zero() -> Self;

    /// The sentinel infinity, equal to [`INFINITE_WEIGHT`]. `f32` has no
    /// exact representation of it and uses `268_435_456.0` instead.
    fn infinity() -> Self;

    /// Length of a path extended by one edge. Sums at or above the sentinel
    /// are clamped to it, so they read as unreachable and never overflow.
    fn path_add(self, other: Self) -> Self;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Whether a matrix cell holding this weight is an edge leaving the row
    /// node.
    fn is_forward(&self) -> bool {
        *self > Self::zero()
    }

    fn is_infinite(&self) -> bool {
        *self >= Self::infinity()
    }

    fn magnitude(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }
}

duplicate! {
    [types zero_value infinity_value clamped_sum;
        [i32] [0] [0x0FFF_FFFF] [self.saturating_add(other).min(Self::infinity())];
        [i64] [0] [INFINITE_WEIGHT] [self.saturating_add(other).min(Self::infinity())];
        [i128] [0] [0x0FFF_FFFF] [self.saturating_add(other).min(Self::infinity())];
        [isize] [0] [0x0FFF_FFFF] [self.saturating_add(other).min(Self::infinity())];
        [f32] [0.0] [268_435_456.0] [(self + other).min(Self::infinity())];
        [f64] [0.0] [268_435_455.0] [(self + other).min(Self::infinity())];
        ]

    impl Weight for types {
        fn zero() -> Self {
            zero_value
        }

        fn infinity() -> Self {
            infinity_value
        }

        fn path_add(self, other: Self) -> Self {
            clamped_sum
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sentinel_matches_across_types() {
        assert_eq!(i32::infinity() as i64, INFINITE_WEIGHT);
        assert_eq!(i128::infinity() as i64, INFINITE_WEIGHT);
        assert_eq!(f64::infinity() as i64, INFINITE_WEIGHT);
        assert_eq!(isize::infinity() as i64, INFINITE_WEIGHT);
        assert_eq!(i64::infinity(), INFINITE_WEIGHT);
    }

    #[test]
    fn f32_sentinel_rounds_up() {
        assert_eq!(f32::infinity(), 268_435_456.0);
        assert_eq!(f32::infinity() as i64, INFINITE_WEIGHT + 1);
        // the inherent f32::is_infinite would shadow the sentinel test
        assert!(Weight::is_infinite(&(INFINITE_WEIGHT as f32)));
        assert!(!Weight::is_infinite(&(f32::infinity() - 64.0)));
    }

    #[test]
    fn path_add_clamps_at_the_sentinel() {
        assert_eq!(2i32.path_add(3), 5);
        assert_eq!(0x0FFF_FFF0i32.path_add(2_000_000_000), i32::infinity());
        assert_eq!(i32::MAX.path_add(i32::MAX), i32::infinity());
        assert_eq!(i64::infinity().path_add(1), i64::infinity());
        assert_eq!(5i64.path_add(-7), -2);
        assert_eq!(i32::MIN.path_add(-1), i32::MIN);
        assert_eq!(268_000_000.0f64.path_add(1_000_000.0), f64::infinity());
        assert_eq!(1.5f32.path_add(2.0), 3.5);
    }

    #[test]
    fn sign_convention() {
        assert!(3i32.is_forward());
        assert!(!(-3i32).is_forward());
        assert!(!0i64.is_forward());
        assert!(0.0f64.is_zero());
        assert_eq!((-4i64).magnitude(), 4);
        assert_eq!(2.5f32.magnitude(), 2.5);
        assert!(i32::infinity().is_infinite());
        assert!(!(i32::infinity() + -1i32).is_infinite());
    }
}
