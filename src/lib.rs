//! # Matgraph
//!
//! Matgraph is a Rust library of classic graph algorithms over weighted graphs
//! stored as matrices. A [`graph::Graph`] keeps two views of the same edge set:
//! an adjacency matrix (node × node) and an incidence matrix (node × edge).
//!
//! Directed edges follow a sign convention: a cell is positive when the edge
//! leaves the row node and negative when it enters it, so a directed graph
//! satisfies `M = -Mᵀ` and an undirected graph satisfies `M = Mᵀ`.
//!
//! On top of that storage the library provides traversals, cycle detection,
//! topological sorting, four shortest path algorithms and two minimum
//! spanning tree algorithms.

pub mod graph;
pub mod num_traits;
