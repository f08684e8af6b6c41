//! # Matrix Graphs
//!
//! A [`Graph`] owns the same edge set in two views, an [`AdjacencyMatrix`] and
//! an [`IncidenceMatrix`]. It is built once from either of them (see
//! [`MatrixMode`]); the other view is derived immediately and neither is
//! modified afterwards.
//!
//! Nodes are identified by their [`Uuid`]. Row indices depend on the view
//! and on insertion order, so every algorithm keys its intermediate state by
//! UUID.
//!
//! ## Sign convention
//!
//! ```text
//!      a   b   c   d
//!  a   0   2  -3  -4      a-->b, a<--c, a<--d
//!  b  -2   0  -3   1      b<--a, b<--c, b-->d
//!  c   3   3   0  -2      c-->a, c-->b, c<--d
//!  d   4  -1   2   0      d-->a, d<--b, d-->c
//! ```
//!
//! A positive cell is an edge leaving the row node. Algorithms that follow
//! edge direction only walk positive cells.

use derive_more::Display;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::num_traits::Weight;

pub mod algorithms;
pub mod matrix;
pub mod samples;


pub use matrix::{AdjacencyMatrix, IncidenceMatrix, MatrixError, MatrixRow};

pub type Uuid = i64;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node<T> {
    pub data: T,
    pub uuid: Uuid,
}

impl<T> Node<T> {
    pub fn new(data: T, uuid: Uuid) -> Self {
        Node { data, uuid }
    }
}

/// A directed, weighted edge as read from a positive adjacency cell.
#[derive(Clone, Copy, Debug, PartialEq, Display)]
#[display(fmt = "{}-{} ({})", from, to, weight)]
pub struct Edge<W> {
    pub from: Uuid,
    pub to: Uuid,
    pub weight: W,
}

/// Which view a graph is constructed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MatrixMode {
    #[default]
    Adjacency,
    Incidence,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("invalid matrix: {0}")]
    Matrix(#[from] MatrixError),
    #[error("no node with uuid {0}")]
    UnknownNode(Uuid),
    #[error("row index {index} is out of range for a graph of {n_nodes} nodes")]
    RowOutOfRange { index: usize, n_nodes: usize },
}

#[derive(Clone, Debug)]
pub struct Graph<T, W> {
    adjacency: AdjacencyMatrix<T, W>,
    incidence: IncidenceMatrix<T, W>,
    index: IndexMap<Uuid, usize>,
}

impl<T: Clone, W: Weight> Graph<T, W> {
    /// Builds a graph from raw rows interpreted according to `mode`.
    pub fn new<I, R>(rows: I, mode: MatrixMode) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = R>,
        R: Into<MatrixRow<T, W>>,
    {
        Ok(match mode {
            MatrixMode::Adjacency => Self::from_adjacency(AdjacencyMatrix::new(rows)?),
            MatrixMode::Incidence => Self::from_incidence(IncidenceMatrix::new(rows)?),
        })
    }

    pub fn from_adjacency(adjacency: AdjacencyMatrix<T, W>) -> Self {
        let incidence = adjacency.to_incidence();
        Self::assemble(adjacency, incidence)
    }

    pub fn from_incidence(incidence: IncidenceMatrix<T, W>) -> Self {
        let adjacency = incidence.to_adjacency();
        Self::assemble(adjacency, incidence)
    }

    fn assemble(adjacency: AdjacencyMatrix<T, W>, incidence: IncidenceMatrix<T, W>) -> Self {
        let index = adjacency.uuids().enumerate().map(|(i, u)| (u, i)).collect();
        debug!(
            n_nodes = adjacency.n_nodes(),
            n_edges = incidence.n_edges(),
            "built graph"
        );
        Graph {
            adjacency,
            incidence,
            index,
        }
    }
}

impl<T, W: Weight> Graph<T, W> {
    pub fn adjacency(&self) -> &AdjacencyMatrix<T, W> {
        &self.adjacency
    }

    pub fn incidence(&self) -> &IncidenceMatrix<T, W> {
        &self.incidence
    }

    pub fn n_nodes(&self) -> usize {
        self.adjacency.n_nodes()
    }

    pub fn n_edges(&self) -> usize {
        self.incidence.n_edges()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.adjacency.nodes()
    }

    /// UUIDs in insertion order.
    pub fn uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.index.keys().copied()
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.index.contains_key(&uuid)
    }

    pub fn node(&self, uuid: Uuid) -> Option<&Node<T>> {
        self.index
            .get(&uuid)
            .map(|&i| &self.adjacency.rows()[i].node)
    }

    pub fn index_of(&self, uuid: Uuid) -> Option<usize> {
        self.index.get(&uuid).copied()
    }

    /// UUID of the node on row `index` of the adjacency matrix.
    pub fn uuid_at(&self, index: usize) -> Result<Uuid, GraphError> {
        self.index
            .get_index(index)
            .map(|(&uuid, _)| uuid)
            .ok_or(GraphError::RowOutOfRange {
                index,
                n_nodes: self.n_nodes(),
            })
    }

    /// Adjacency cell between two nodes, `None` if either is unknown.
    pub fn weight(&self, from: Uuid, to: Uuid) -> Option<W> {
        Some(self.adjacency.weight(self.index_of(from)?, self.index_of(to)?))
    }

    /// Edges leaving `uuid`, in column order.
    pub fn successors(
        &self,
        uuid: Uuid,
    ) -> Result<impl Iterator<Item = (Uuid, W)> + '_, GraphError> {
        if !self.contains(uuid) {
            return Err(GraphError::UnknownNode(uuid));
        }
        Ok(self.out_edges(uuid))
    }

    /// Every positive cell as an edge, in row-major order.
    pub fn forward_edges(&self) -> Vec<Edge<W>> {
        self.uuids()
            .flat_map(|from| {
                self.out_edges(from)
                    .map(move |(to, weight)| Edge { from, to, weight })
            })
            .collect()
    }

    /// Non-zero cells of the row of a known node, in column order.
    pub(crate) fn row_cells(&self, uuid: Uuid) -> impl Iterator<Item = (Uuid, W)> + '_ {
        let row = &self.adjacency.rows()[self.index[&uuid]];
        self.uuids()
            .zip(row.weights.iter().copied())
            .filter(|(_, w)| !w.is_zero())
    }

    /// Positive cells of the row of a known node, in column order.
    pub(crate) fn out_edges(&self, uuid: Uuid) -> impl Iterator<Item = (Uuid, W)> + '_ {
        self.row_cells(uuid).filter(|(_, w)| w.is_forward())
    }

    pub(crate) fn require(&self, uuid: Uuid) -> Result<(), GraphError> {
        if self.contains(uuid) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(uuid))
        }
    }
}
