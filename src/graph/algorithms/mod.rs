//! # Graph Algorithms for Matrix Graphs
//!
//! Every algorithm reads the adjacency view of a [`Graph`](super::Graph) and
//! keeps its intermediate state keyed by node UUID. None of them modifies the
//! graph.
//!
//! ## Available Algorithms
//!
//! ### Traversal
//! - [`traversal`]: breadth-first and depth-first search
//!
//! ### Cycles and Orderings
//! - [`cycle`]: cycle-closing edges of undirected and directed graphs
//! - [`topological_order`]: depth-first postorder topological sort
//!
//! ### Shortest Paths
//! - [`shortest_path`]: Dijkstra, Bellman–Ford, generic label correcting and
//!   Floyd–Warshall
//!
//! ### Spanning Trees
//! - [`spanning_tree`]: Kruskal and Dijkstra's cycle-breaking algorithm
//!
//! ## Direction
//!
//! Algorithms that respect direction only follow positive adjacency cells.
//! The undirected cycle detector and the spanning tree algorithms read the
//! underlying undirected graph instead. Depth-first searches all run on an
//! explicit stack of `(node, successor iterator)` frames.

use ahash::AHashMap;

use super::Uuid;

pub mod cycle;
pub mod shortest_path;
pub mod spanning_tree;
pub mod topological_order;
pub mod traversal;

pub use cycle::{CycleEdge, CycleKind};
pub use shortest_path::{
    DistanceMatrix, Label, PathReport, ShortestPathAlgorithm, ShortestPathError, ShortestPaths,
};
pub use spanning_tree::{SpanningTree, SpanningTreeAlgorithm, SpanningTreeError, TreeMatrix};
pub use topological_order::{TopoError, TopologicalOrder};
pub use traversal::{Traversal, TraversalEdge};

/// Depth-first state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mark {
    Unvisited,
    /// Discovered, carrying its discovery number.
    Open(usize),
    /// Every successor explored, carrying its finish number.
    Closed(usize),
}

/// Per-call visitation state keyed by UUID. Discovery and finish numbers
/// start at 1.
#[derive(Clone, Debug)]
pub(crate) struct Marks {
    marks: AHashMap<Uuid, Mark>,
    discovered: usize,
    finished: usize,
}

impl Marks {
    pub(crate) fn new(uuids: impl IntoIterator<Item = Uuid>) -> Self {
        Marks {
            marks: uuids.into_iter().map(|u| (u, Mark::Unvisited)).collect(),
            discovered: 0,
            finished: 0,
        }
    }

    pub(crate) fn get(&self, uuid: Uuid) -> Mark {
        self.marks.get(&uuid).copied().unwrap_or(Mark::Unvisited)
    }

    pub(crate) fn is_visited(&self, uuid: Uuid) -> bool {
        self.get(uuid) != Mark::Unvisited
    }

    pub(crate) fn open(&mut self, uuid: Uuid) -> usize {
        self.discovered += 1;
        self.marks.insert(uuid, Mark::Open(self.discovered));
        self.discovered
    }

    pub(crate) fn close(&mut self, uuid: Uuid) -> usize {
        self.finished += 1;
        self.marks.insert(uuid, Mark::Closed(self.finished));
        self.finished
    }
}

/// Key of an edge regardless of its direction.
pub(crate) fn unordered(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
