//! # Adjacency and Incidence Matrices
//!
//! The two storage views of a [`Graph`](super::Graph). Both are an ordered list
//! of [`MatrixRow`]s, one per node, in node insertion order:
//!
//! - in an [`AdjacencyMatrix`] row `i` holds one cell per node, `weights[j]`
//!   being the weight of the edge between node `i` and node `j` (`0` = no
//!   edge, positive = the edge leaves node `i`, negative = it enters node `i`);
//! - in an [`IncidenceMatrix`] row `i` holds one cell per edge, non-zero only
//!   when node `i` is an endpoint of that edge. Each column has exactly two
//!   non-zero cells, carrying the adjacency value seen from each endpoint.
//!
//! Both types are validated on construction, so converting one into the other
//! cannot fail.

use std::fmt::{self, Display};

use ahash::AHashMap;
use itertools::Itertools;
use thiserror::Error;

use super::{Node, Uuid};
use crate::num_traits::Weight;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix has no rows")]
    Empty,
    #[error("adjacency row of node {uuid} has {len} cells, expected {expected}")]
    NotSquare {
        uuid: Uuid,
        len: usize,
        expected: usize,
    },
    #[error("incidence row of node {uuid} has {len} columns, expected {expected}")]
    Ragged {
        uuid: Uuid,
        len: usize,
        expected: usize,
    },
    #[error("node {uuid} has a self loop")]
    SelfLoop { uuid: Uuid },
    #[error("edge between {from} and {to} is only recorded on the row of {from}")]
    HalfEdge { from: Uuid, to: Uuid },
    #[error("cells {forward} and {backward} between {from} and {to} are neither opposite nor equal and positive")]
    SignConvention {
        from: Uuid,
        to: Uuid,
        forward: String,
        backward: String,
    },
    #[error("incidence column {column} has {nonzero} non-zero cells, expected 2")]
    MalformedColumn { column: usize, nonzero: usize },
    #[error("incidence columns {first} and {second} both join {from} and {to}")]
    ParallelEdge {
        first: usize,
        second: usize,
        from: Uuid,
        to: Uuid,
    },
    #[error("uuid {uuid} is used by rows {first} and {second}")]
    DuplicateUuid {
        uuid: Uuid,
        first: usize,
        second: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatrixRow<T, W> {
    pub node: Node<T>,
    pub weights: Vec<W>,
}

impl<T, W> From<(Node<T>, Vec<W>)> for MatrixRow<T, W> {
    fn from((node, weights): (Node<T>, Vec<W>)) -> Self {
        MatrixRow { node, weights }
    }
}

fn check_unique_uuids<T, W>(rows: &[MatrixRow<T, W>]) -> Result<(), MatrixError> {
    let mut seen = AHashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if let Some(first) = seen.insert(row.node.uuid, i) {
            return Err(MatrixError::DuplicateUuid {
                uuid: row.node.uuid,
                first,
                second: i,
            });
        }
    }
    Ok(())
}

/// Checks the two cells recording the edge between `from` and `to`: opposite
/// values for a directed edge, the same positive value for an undirected one.
fn check_signs<W: Weight>(
    from: Uuid,
    to: Uuid,
    forward: W,
    backward: W,
) -> Result<(), MatrixError> {
    if forward == -backward || (forward == backward && forward.is_forward()) {
        return Ok(());
    }
    Err(MatrixError::SignConvention {
        from,
        to,
        forward: forward.to_string(),
        backward: backward.to_string(),
    })
}

pub(crate) fn write_table<H, R, C>(f: &mut fmt::Formatter<'_>, header: H, rows: R) -> fmt::Result
where
    H: Iterator,
    H::Item: Display,
    R: Iterator<Item = (Uuid, C)>,
    C: Iterator,
    C::Item: Display,
{
    write!(f, "\t{}", header.format("\t"))?;
    for (uuid, cells) in rows {
        write!(f, "\n{uuid}\t{}", cells.format("\t"))?;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix<T, W> {
    rows: Vec<MatrixRow<T, W>>,
}

impl<T, W: Weight> AdjacencyMatrix<T, W> {
    /// Builds an adjacency matrix, checking that it is square, loop free, has
    /// unique UUIDs, and records every edge on both endpoint rows following
    /// the sign convention.
    pub fn new<I, R>(rows: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = R>,
        R: Into<MatrixRow<T, W>>,
    {
        let rows: Vec<MatrixRow<T, W>> = rows.into_iter().map(Into::into).collect();
        let n = rows.len();
        if n == 0 {
            return Err(MatrixError::Empty);
        }
        check_unique_uuids(&rows)?;

        for row in &rows {
            if row.weights.len() != n {
                return Err(MatrixError::NotSquare {
                    uuid: row.node.uuid,
                    len: row.weights.len(),
                    expected: n,
                });
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if !row.weights[i].is_zero() {
                return Err(MatrixError::SelfLoop {
                    uuid: row.node.uuid,
                });
            }
            for (j, other) in rows.iter().enumerate().skip(i + 1) {
                let there = row.weights[j].is_zero();
                let back = other.weights[i].is_zero();
                if there != back {
                    let (from, to) = if there {
                        (other.node.uuid, row.node.uuid)
                    } else {
                        (row.node.uuid, other.node.uuid)
                    };
                    return Err(MatrixError::HalfEdge { from, to });
                }
                if !there {
                    check_signs(
                        row.node.uuid,
                        other.node.uuid,
                        row.weights[j],
                        other.weights[i],
                    )?;
                }
            }
        }

        Ok(AdjacencyMatrix { rows })
    }

    /// Number of non-zero cells strictly above the diagonal.
    pub fn n_edges(&self) -> usize {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.weights[i + 1..].iter().filter(|w| !w.is_zero()).count())
            .sum()
    }

    pub fn weight(&self, from: usize, to: usize) -> W {
        self.rows[from].weights[to]
    }

    /// Derives the incidence view: one column per non-zero cell `(i, j)`,
    /// `i < j`, allocated in row-major order.
    pub fn to_incidence(&self) -> IncidenceMatrix<T, W>
    where
        T: Clone,
    {
        let n_edges = self.n_edges();
        let mut rows: Vec<MatrixRow<T, W>> = self
            .rows
            .iter()
            .map(|row| MatrixRow {
                node: row.node.clone(),
                weights: vec![W::zero(); n_edges],
            })
            .collect();

        let mut column = 0;
        for i in 0..self.rows.len() {
            for j in i + 1..self.rows.len() {
                if !self.weight(i, j).is_zero() {
                    rows[i].weights[column] = self.weight(i, j);
                    rows[j].weights[column] = self.weight(j, i);
                    column += 1;
                }
            }
        }

        IncidenceMatrix { rows }
    }
}

impl<T, W> AdjacencyMatrix<T, W> {
    /// Wraps rows known to satisfy the checks of [`AdjacencyMatrix::new`].
    pub(crate) fn new_unchecked(rows: Vec<MatrixRow<T, W>>) -> Self {
        AdjacencyMatrix { rows }
    }

    pub fn rows(&self) -> &[MatrixRow<T, W>] {
        &self.rows
    }

    pub fn n_nodes(&self) -> usize {
        self.rows.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.rows.iter().map(|row| &row.node)
    }

    pub fn uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.rows.iter().map(|row| row.node.uuid)
    }

    pub fn into_rows(self) -> Vec<MatrixRow<T, W>> {
        self.rows
    }
}

impl<T, W: Display> Display for AdjacencyMatrix<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(
            f,
            self.rows.iter().map(|row| row.node.uuid.to_string()),
            self.rows
                .iter()
                .map(|row| (row.node.uuid, row.weights.iter())),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncidenceMatrix<T, W> {
    rows: Vec<MatrixRow<T, W>>,
}

impl<T, W: Weight> IncidenceMatrix<T, W> {
    /// Builds an incidence matrix, checking that rows have the same number of
    /// columns, that every column joins exactly two nodes with cells following
    /// the sign convention, and that no two columns join the same pair.
    pub fn new<I, R>(rows: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = R>,
        R: Into<MatrixRow<T, W>>,
    {
        let rows: Vec<MatrixRow<T, W>> = rows.into_iter().map(Into::into).collect();
        let Some(first) = rows.first() else {
            return Err(MatrixError::Empty);
        };
        check_unique_uuids(&rows)?;

        let n_edges = first.weights.len();
        for row in &rows {
            if row.weights.len() != n_edges {
                return Err(MatrixError::Ragged {
                    uuid: row.node.uuid,
                    len: row.weights.len(),
                    expected: n_edges,
                });
            }
        }

        let matrix = IncidenceMatrix { rows };
        let mut pairs = AHashMap::with_capacity(n_edges);
        for column in 0..n_edges {
            let (a, b) = matrix.column_endpoints(column)?;
            check_signs(
                matrix.rows[a].node.uuid,
                matrix.rows[b].node.uuid,
                matrix.rows[a].weights[column],
                matrix.rows[b].weights[column],
            )?;
            if let Some(first) = pairs.insert((a, b), column) {
                return Err(MatrixError::ParallelEdge {
                    first,
                    second: column,
                    from: matrix.rows[a].node.uuid,
                    to: matrix.rows[b].node.uuid,
                });
            }
        }

        Ok(matrix)
    }

    fn column_endpoints(&self, column: usize) -> Result<(usize, usize), MatrixError> {
        let nonzero: Vec<usize> = self
            .rows
            .iter()
            .positions(|row| !row.weights[column].is_zero())
            .collect();
        match nonzero[..] {
            [a, b] => Ok((a, b)),
            _ => Err(MatrixError::MalformedColumn {
                column,
                nonzero: nonzero.len(),
            }),
        }
    }

    /// Row indices of the two endpoints of `column`, lowest first.
    ///
    /// # Panics
    ///
    /// If `column` is out of range.
    pub fn edge_endpoints(&self, column: usize) -> (usize, usize) {
        match self.column_endpoints(column) {
            Ok(endpoints) => endpoints,
            Err(_) => unreachable!("incidence columns are validated on construction"),
        }
    }

    /// Derives the adjacency view by writing each endpoint's value into the
    /// cell indexed by the other endpoint.
    pub fn to_adjacency(&self) -> AdjacencyMatrix<T, W>
    where
        T: Clone,
    {
        let n = self.rows.len();
        let mut rows: Vec<MatrixRow<T, W>> = self
            .rows
            .iter()
            .map(|row| MatrixRow {
                node: row.node.clone(),
                weights: vec![W::zero(); n],
            })
            .collect();

        for column in 0..self.n_edges() {
            let (a, b) = self.edge_endpoints(column);
            rows[a].weights[b] = self.rows[a].weights[column];
            rows[b].weights[a] = self.rows[b].weights[column];
        }

        AdjacencyMatrix { rows }
    }
}

impl<T, W> IncidenceMatrix<T, W> {
    pub fn rows(&self) -> &[MatrixRow<T, W>] {
        &self.rows
    }

    pub fn n_nodes(&self) -> usize {
        self.rows.len()
    }

    pub fn n_edges(&self) -> usize {
        self.rows.first().map_or(0, |row| row.weights.len())
    }

    pub fn into_rows(self) -> Vec<MatrixRow<T, W>> {
        self.rows
    }
}

impl<T, W: Weight> Display for IncidenceMatrix<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(
            f,
            (0..self.n_edges()).map(|column| {
                let (a, b) = self.edge_endpoints(column);
                format!("{}-{}", self.rows[a].node.uuid, self.rows[b].node.uuid)
            }),
            self.rows
                .iter()
                .map(|row| (row.node.uuid, row.weights.iter())),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triangle() -> Vec<MatrixRow<&'static str, i32>> {
        // a --2--> b, c --3--> a, b --1--> c
        vec![
            (Node::new("a", 1), vec![0, 2, -3]).into(),
            (Node::new("b", 2), vec![-2, 0, 1]).into(),
            (Node::new("c", 3), vec![3, -1, 0]).into(),
        ]
    }

    #[test]
    fn incidence_columns_follow_row_major_order() {
        let adjacency = AdjacencyMatrix::<&str, i32>::new(triangle()).unwrap();
        let incidence = adjacency.to_incidence();

        assert_eq!(adjacency.n_edges(), 3);
        assert_eq!(incidence.n_edges(), 3);
        assert_eq!(incidence.rows()[0].weights, vec![2, -3, 0]);
        assert_eq!(incidence.rows()[1].weights, vec![-2, 0, 1]);
        assert_eq!(incidence.rows()[2].weights, vec![0, 3, -1]);
        assert_eq!(incidence.edge_endpoints(1), (0, 2));
    }

    #[test]
    fn round_trip() {
        let adjacency = AdjacencyMatrix::<&str, i32>::new(triangle()).unwrap();
        similar_asserts::assert_eq!(adjacency.to_incidence().to_adjacency(), adjacency);
    }

    #[test]
    fn display_tables() {
        let adjacency = AdjacencyMatrix::<&str, i32>::new(triangle()).unwrap();
        assert_eq!(
            adjacency.to_string(),
            "\t1\t2\t3\n1\t0\t2\t-3\n2\t-2\t0\t1\n3\t3\t-1\t0"
        );
        assert_eq!(
            adjacency.to_incidence().to_string(),
            "\t1-2\t1-3\t2-3\n1\t2\t-3\t0\n2\t-2\t0\t1\n3\t0\t3\t-1"
        );
    }

    #[test]
    fn rejects_empty() {
        let rows: Vec<MatrixRow<(), i32>> = vec![];
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows.clone()).unwrap_err(),
            MatrixError::Empty
        );
        assert_eq!(IncidenceMatrix::<_, _>::new(rows).unwrap_err(), MatrixError::Empty);
    }

    #[test]
    fn rejects_inconsistent_adjacency() {
        let mut rows = triangle();
        rows[1].weights.pop();
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows).unwrap_err(),
            MatrixError::NotSquare {
                uuid: 2,
                len: 2,
                expected: 3
            }
        );

        let mut rows = triangle();
        rows[2].weights[2] = 5;
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows).unwrap_err(),
            MatrixError::SelfLoop { uuid: 3 }
        );

        let mut rows = triangle();
        rows[1].weights[2] = 0;
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows).unwrap_err(),
            MatrixError::HalfEdge { from: 3, to: 2 }
        );

        let mut rows = triangle();
        rows[2].node.uuid = 1;
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows).unwrap_err(),
            MatrixError::DuplicateUuid {
                uuid: 1,
                first: 0,
                second: 2
            }
        );
    }

    #[test]
    fn rejects_sign_convention_violations() {
        let both_negative: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![0, -4, 0]).into(),
            (Node::new((), 2), vec![-4, 0, 3]).into(),
            (Node::new((), 3), vec![0, -3, 0]).into(),
        ];
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(both_negative).unwrap_err(),
            MatrixError::SignConvention {
                from: 1,
                to: 2,
                forward: "-4".into(),
                backward: "-4".into(),
            }
        );

        let mut rows = triangle();
        rows[0].weights[1] = 2;
        rows[1].weights[0] = -7;
        assert_eq!(
            AdjacencyMatrix::<_, i32>::new(rows).unwrap_err(),
            MatrixError::SignConvention {
                from: 1,
                to: 2,
                forward: "2".into(),
                backward: "-7".into(),
            }
        );

        let mismatched_column: Vec<MatrixRow<(), f64>> = vec![
            (Node::new((), 1), vec![1.5, 2.0]).into(),
            (Node::new((), 2), vec![-1.5, 0.0]).into(),
            (Node::new((), 3), vec![0.0, 3.0]).into(),
        ];
        assert_eq!(
            IncidenceMatrix::<_, _>::new(mismatched_column).unwrap_err(),
            MatrixError::SignConvention {
                from: 1,
                to: 3,
                forward: "2".into(),
                backward: "3".into(),
            }
        );
    }

    #[test]
    fn accepts_undirected_pairs() {
        let rows: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![0, 4, -2]).into(),
            (Node::new((), 2), vec![4, 0, 0]).into(),
            (Node::new((), 3), vec![2, 0, 0]).into(),
        ];
        let adjacency = AdjacencyMatrix::<_, i32>::new(rows).unwrap();
        assert_eq!(adjacency.n_edges(), 2);

        let incidence = adjacency.to_incidence();
        assert_eq!(incidence.rows()[0].weights, vec![4, -2]);
        assert_eq!(
            IncidenceMatrix::<_, i32>::new(incidence.clone().into_rows()).unwrap(),
            incidence
        );
    }

    #[test]
    fn rejects_malformed_columns() {
        let three_ends: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![1]).into(),
            (Node::new((), 2), vec![-1]).into(),
            (Node::new((), 3), vec![4]).into(),
        ];
        assert_eq!(
            IncidenceMatrix::<_, _>::new(three_ends).unwrap_err(),
            MatrixError::MalformedColumn {
                column: 0,
                nonzero: 3
            }
        );

        let dangling: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![1, 2]).into(),
            (Node::new((), 2), vec![-1, 0]).into(),
        ];
        assert_eq!(
            IncidenceMatrix::<_, _>::new(dangling).unwrap_err(),
            MatrixError::MalformedColumn {
                column: 1,
                nonzero: 1
            }
        );

        let parallel: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![1, 2]).into(),
            (Node::new((), 2), vec![-1, -2]).into(),
        ];
        assert_eq!(
            IncidenceMatrix::<_, _>::new(parallel).unwrap_err(),
            MatrixError::ParallelEdge {
                first: 0,
                second: 1,
                from: 1,
                to: 2
            }
        );

        let ragged: Vec<MatrixRow<(), i32>> = vec![
            (Node::new((), 1), vec![1, 2]).into(),
            (Node::new((), 2), vec![-1]).into(),
        ];
        assert_eq!(
            IncidenceMatrix::<_, _>::new(ragged).unwrap_err(),
            MatrixError::Ragged {
                uuid: 2,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn edgeless_incidence_is_valid() {
        let rows: Vec<MatrixRow<(), f64>> = vec![
            (Node::new((), 7), vec![]).into(),
            (Node::new((), 8), vec![]).into(),
        ];
        let incidence = IncidenceMatrix::<_, _>::new(rows).unwrap();
        let adjacency = incidence.to_adjacency();
        assert_eq!(adjacency.n_edges(), 0);
        assert_eq!(adjacency.rows()[1].weights, vec![0.0, 0.0]);
    }
}
