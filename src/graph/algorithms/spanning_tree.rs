//! # Minimum Spanning Trees
//!
//! Both algorithms read the graph as undirected: every pair of nodes joined
//! by a positive cell is one candidate edge, oriented the way it was first
//! found in row-major order. Trees under construction are kept in a
//! [`TreeMatrix`], a signed adjacency snapshot that is copied on every
//! decision and checked for cycles by depth-first search.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use super::unordered;
use crate::graph::{matrix::write_table, Edge, Graph, Uuid};
use crate::num_traits::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanningTreeAlgorithm {
    /// Cheapest edges first, skipping those that close a cycle.
    Kruskal,
    /// Edges in order of discovery, dropping the heaviest edge of any cycle
    /// that forms.
    Dijkstra,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanningTreeError {
    #[error("graph is disconnected: only {n_edges} tree edges span {n_nodes} nodes")]
    Disconnected { n_edges: usize, n_nodes: usize },
}

/// Signed adjacency snapshot of a forest under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeMatrix<W> {
    index: IndexMap<Uuid, usize>,
    weights: Vec<Vec<W>>,
}

impl<W: Weight> TreeMatrix<W> {
    pub fn empty(uuids: impl IntoIterator<Item = Uuid>) -> Self {
        let index: IndexMap<Uuid, usize> =
            uuids.into_iter().enumerate().map(|(i, u)| (u, i)).collect();
        let n = index.len();
        TreeMatrix {
            index,
            weights: vec![vec![W::zero(); n]; n],
        }
    }

    /// A copy with `edge` added. Edges between unknown nodes are ignored.
    pub fn with_edge(&self, edge: &Edge<W>) -> Self {
        let mut next = self.clone();
        if let (Some(&i), Some(&j)) = (self.index.get(&edge.from), self.index.get(&edge.to)) {
            next.weights[i][j] = edge.weight;
            next.weights[j][i] = -edge.weight;
        }
        next
    }

    /// A copy with the cells between `a` and `b` zeroed.
    pub fn without_edge(&self, a: Uuid, b: Uuid) -> Self {
        let mut next = self.clone();
        if let (Some(&i), Some(&j)) = (self.index.get(&a), self.index.get(&b)) {
            next.weights[i][j] = W::zero();
            next.weights[j][i] = W::zero();
        }
        next
    }

    /// Positive cells as edges, in row-major order.
    pub fn edges(&self) -> Vec<Edge<W>> {
        let n = self.weights.len();
        (0..n)
            .cartesian_product(0..n)
            .filter(|&(i, j)| self.weights[i][j].is_forward())
            .filter_map(|(i, j)| self.edge_at(i, j))
            .collect()
    }

    pub fn n_edges(&self) -> usize {
        self.edges().len()
    }

    /// The edge joining two nodes, oriented along its positive cell.
    pub fn edge_between(&self, a: Uuid, b: Uuid) -> Option<Edge<W>> {
        self.edge_at(*self.index.get(&a)?, *self.index.get(&b)?)
    }

    fn edge_at(&self, a: usize, b: usize) -> Option<Edge<W>> {
        let (from, to) = if self.weights[a][b].is_forward() {
            (a, b)
        } else if self.weights[b][a].is_forward() {
            (b, a)
        } else {
            return None;
        };
        Some(Edge {
            from: self.uuid_at(from)?,
            to: self.uuid_at(to)?,
            weight: self.weights[from][to],
        })
    }

    fn uuid_at(&self, i: usize) -> Option<Uuid> {
        self.index.get_index(i).map(|(&uuid, _)| uuid)
    }

    /// Edges of a cycle of the underlying undirected graph, if there is one.
    ///
    /// Stack frames are `(node, parent, next column)`. In an undirected
    /// depth-first search every non-tree edge leads back to a node on the
    /// stack, so the cycle is the stack suffix starting at that node.
    pub fn find_cycle(&self) -> Option<Vec<Edge<W>>> {
        let n = self.weights.len();
        let mut visited = vec![false; n];

        for root in 0..n {
            if visited[root] {
                continue;
            }
            visited[root] = true;
            let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];

            while let Some((node, parent, next)) = stack.last_mut() {
                let (node, parent) = (*node, *parent);
                let Some(j) = (*next..n)
                    .find(|&j| !self.weights[node][j].is_zero() && Some(j) != parent)
                else {
                    stack.pop();
                    continue;
                };
                *next = j + 1;

                if visited[j] {
                    let start = stack.iter().position(|&(v, _, _)| v == j)?;
                    return stack[start..]
                        .iter()
                        .map(|&(v, _, _)| v)
                        .chain([j])
                        .tuple_windows()
                        .map(|(a, b)| self.edge_at(a, b))
                        .collect();
                }
                visited[j] = true;
                stack.push((j, Some(node), 0));
            }
        }
        None
    }
}

impl<W: Display> Display for TreeMatrix<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(
            f,
            self.index.keys(),
            self.index
                .iter()
                .map(|(&uuid, &i)| (uuid, self.weights[i].iter())),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpanningTree<W> {
    pub matrix: TreeMatrix<W>,
    /// Tree edges in the order the algorithm settled on them.
    pub edges: Vec<Edge<W>>,
    /// Sum of the tree edge weights, clamped to the sentinel.
    pub total_weight: W,
}

impl<W: Weight> SpanningTree<W> {
    fn new(matrix: TreeMatrix<W>, edges: Vec<Edge<W>>) -> Self {
        let total_weight = edges.iter().fold(W::zero(), |sum, e| sum.path_add(e.weight));
        SpanningTree {
            matrix,
            edges,
            total_weight,
        }
    }
}

impl<W: Display> Display for SpanningTree<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.matrix, f)
    }
}

/// Orders edges by weight, then by their endpoints.
fn by_weight<W: Weight>(a: &Edge<W>, b: &Edge<W>) -> Ordering {
    a.weight
        .partial_cmp(&b.weight)
        .unwrap_or(Ordering::Equal)
        .then_with(|| (a.from, a.to).cmp(&(b.from, b.to)))
}

impl<T, W: Weight> Graph<T, W> {
    pub fn spanning_tree(
        &self,
        algorithm: SpanningTreeAlgorithm,
    ) -> Result<SpanningTree<W>, SpanningTreeError> {
        let tree = match algorithm {
            SpanningTreeAlgorithm::Kruskal => self.kruskal(),
            SpanningTreeAlgorithm::Dijkstra => self.dijkstra_spanning_tree(),
        };
        let n_nodes = self.n_nodes();
        if tree.edges.len() + 1 != n_nodes {
            return Err(SpanningTreeError::Disconnected {
                n_edges: tree.edges.len(),
                n_nodes,
            });
        }
        debug!(?algorithm, total_weight = %tree.total_weight, "spanning tree done");
        Ok(tree)
    }

    /// One edge per adjacent pair, in row-major order of the positive cells.
    fn candidate_edges(&self) -> Vec<Edge<W>> {
        let mut seen = AHashSet::new();
        self.forward_edges()
            .into_iter()
            .filter(|e| seen.insert(unordered(e.from, e.to)))
            .collect()
    }

    fn kruskal(&self) -> SpanningTree<W> {
        let mut candidates = self.candidate_edges();
        candidates.sort_by(by_weight);

        let n_tree_edges = self.n_nodes().saturating_sub(1);
        let mut matrix = TreeMatrix::empty(self.uuids());
        let mut edges = Vec::with_capacity(n_tree_edges);

        for edge in candidates {
            if edges.len() == n_tree_edges {
                break;
            }
            let tentative = matrix.with_edge(&edge);
            if tentative.find_cycle().is_some() {
                trace!(%edge, "Kruskal skips cycle-closing edge");
                continue;
            }
            trace!(%edge, "Kruskal accepts edge");
            matrix = tentative;
            edges.push(edge);
        }

        SpanningTree::new(matrix, edges)
    }

    /// Adds every candidate; whenever that closes a cycle, removes the
    /// heaviest edge on it, which may be the one just added.
    fn dijkstra_spanning_tree(&self) -> SpanningTree<W> {
        let mut matrix = TreeMatrix::empty(self.uuids());

        for edge in self.candidate_edges() {
            matrix = matrix.with_edge(&edge);
            let Some(cycle) = matrix.find_cycle() else {
                continue;
            };
            if let Some(heaviest) = cycle.into_iter().max_by(by_weight) {
                trace!(added = %edge, removed = %heaviest, "Dijkstra breaks cycle");
                matrix = matrix.without_edge(heaviest.from, heaviest.to);
            }
        }

        let edges = matrix.edges();
        SpanningTree::new(matrix, edges)
    }
}
