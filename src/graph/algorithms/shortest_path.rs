//! # Shortest Paths
//!
//! Single source engines over the positive cells of the adjacency matrix,
//! each producing [`ShortestPaths`]:
//!
//! - [`Graph::dijkstra`]: repeatedly finalizes the closest open node, found by
//!   a linear scan. Requires non-negative weights, which the sign convention
//!   guarantees for graphs built from matrices.
//! - [`Graph::bellman_ford`]: relaxes every edge per pass until a pass changes
//!   nothing. [`bellman_ford`] runs the same passes over an arbitrary edge
//!   list, where negative weights and negative cycles are possible.
//! - [`Graph::label_correcting`]: a deque work list in which nodes that keep
//!   improving move towards the front.
//!
//! and one all-pairs engine, [`Graph::floyd_warshall`], producing a
//! [`DistanceMatrix`].
//!
//! Unreachable nodes keep the sentinel distance [`Weight::infinity`] with the
//! source as predecessor.

use std::collections::VecDeque;
use std::fmt::{self, Display};

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::graph::{matrix::write_table, Edge, Graph, Uuid};
use crate::num_traits::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortestPathAlgorithm {
    Dijkstra,
    /// Bellman–Ford.
    Ford,
    LabelCorrecting,
    /// Floyd–Warshall, all pairs. Ignores the source.
    FloydWarshall,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortestPathError {
    #[error("source node {0} is not in the graph")]
    UnknownSource(Uuid),
    #[error("labels still change after {passes} passes: negative cycle")]
    NegativeCycle { passes: usize },
}

/// Tentative or final distance of a node together with its predecessor on
/// the path found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label<W> {
    pub distance: W,
    pub predecessor: Uuid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPaths<W> {
    source: Uuid,
    labels: IndexMap<Uuid, Label<W>>,
    iterations: usize,
}

impl<W: Weight> ShortestPaths<W> {
    fn new(source: Uuid, uuids: impl IntoIterator<Item = Uuid>) -> Self {
        let labels = uuids
            .into_iter()
            .map(|uuid| {
                let distance = if uuid == source {
                    W::zero()
                } else {
                    W::infinity()
                };
                (
                    uuid,
                    Label {
                        distance,
                        predecessor: source,
                    },
                )
            })
            .collect();
        ShortestPaths {
            source,
            labels,
            iterations: 0,
        }
    }

    /// Relaxes the edge `from -> to`, never from a node that is still
    /// unreachable. A candidate reaching the sentinel leaves `to`
    /// unreachable. Returns whether the label of `to` improved.
    fn relax(&mut self, from: Uuid, to: Uuid, weight: W) -> bool {
        let Some(start) = self.distance(from) else {
            return false;
        };
        if start.is_infinite() {
            return false;
        }
        let candidate = start.path_add(weight);
        match self.labels.get_mut(&to) {
            Some(label) if candidate < label.distance => {
                *label = Label {
                    distance: candidate,
                    predecessor: from,
                };
                true
            }
            _ => false,
        }
    }

    fn log_iteration(&self, algorithm: ShortestPathAlgorithm) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        let labels = self
            .labels
            .iter()
            .map(|(uuid, l)| format!("({uuid}->{},{})", l.distance, l.predecessor))
            .join(";");
        trace!(?algorithm, iteration = self.iterations, %labels, "labels");
    }

    pub fn source(&self) -> Uuid {
        self.source
    }

    pub fn label(&self, uuid: Uuid) -> Option<&Label<W>> {
        self.labels.get(&uuid)
    }

    pub fn labels(&self) -> impl Iterator<Item = (Uuid, &Label<W>)> + '_ {
        self.labels.iter().map(|(&uuid, label)| (uuid, label))
    }

    pub fn distance(&self, uuid: Uuid) -> Option<W> {
        self.label(uuid).map(|l| l.distance)
    }

    pub fn predecessor(&self, uuid: Uuid) -> Option<Uuid> {
        self.label(uuid).map(|l| l.predecessor)
    }

    /// Iterations performed: finalized nodes for Dijkstra, passes for
    /// Bellman–Ford, work list pops for label correcting.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn is_reachable(&self, uuid: Uuid) -> bool {
        self.distance(uuid).is_some_and(|d| !d.is_infinite())
    }

    /// Nodes on the shortest path from the source to `target`, both
    /// included.
    pub fn path_to(&self, target: Uuid) -> Option<Vec<Uuid>> {
        if !self.is_reachable(target) {
            return None;
        }
        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.predecessor(current)?;
            path.push(current);
            if path.len() > self.labels.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}

impl<W: Display> Display for ShortestPaths<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number of Iterations = {}", self.iterations)?;
        for (uuid, label) in &self.labels {
            write!(
                f,
                "\n{uuid}  -->  {}     {}",
                label.distance, label.predecessor
            )?;
        }
        Ok(())
    }
}

/// All-pairs distances, rows and columns in node insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix<W> {
    index: IndexMap<Uuid, usize>,
    distances: Vec<Vec<W>>,
}

impl<W: Weight> DistanceMatrix<W> {
    pub fn distance(&self, from: Uuid, to: Uuid) -> Option<W> {
        Some(self.distances[*self.index.get(&from)?][*self.index.get(&to)?])
    }

    pub fn row(&self, from: Uuid) -> Option<&[W]> {
        self.index.get(&from).map(|&i| self.distances[i].as_slice())
    }

    pub fn uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.index.keys().copied()
    }
}

impl<W: Display> Display for DistanceMatrix<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(
            f,
            self.index.keys(),
            self.index
                .iter()
                .map(|(&uuid, &i)| (uuid, self.distances[i].iter())),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PathReport<W> {
    SingleSource(ShortestPaths<W>),
    AllPairs(DistanceMatrix<W>),
}

impl<W: Display> Display for PathReport<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathReport::SingleSource(paths) => Display::fmt(paths, f),
            PathReport::AllPairs(matrix) => Display::fmt(matrix, f),
        }
    }
}

/// Bellman–Ford over an explicit edge list.
///
/// Passes are counted including the last one, which changes nothing. A
/// graph without negative cycles needs at most `n_nodes` of them, so labels
/// still changing in pass `n_nodes` means a negative cycle is reachable from
/// the source.
pub fn bellman_ford<W: Weight>(
    uuids: impl IntoIterator<Item = Uuid>,
    edges: &[Edge<W>],
    source: Uuid,
) -> Result<ShortestPaths<W>, ShortestPathError> {
    let mut paths = ShortestPaths::new(source, uuids);
    if !paths.labels.contains_key(&source) {
        return Err(ShortestPathError::UnknownSource(source));
    }
    let n_nodes = paths.labels.len();

    loop {
        paths.iterations += 1;
        let mut changed = false;
        for edge in edges {
            changed |= paths.relax(edge.from, edge.to, edge.weight);
        }
        paths.log_iteration(ShortestPathAlgorithm::Ford);

        if !changed {
            return Ok(paths);
        }
        if paths.iterations >= n_nodes {
            debug!(passes = paths.iterations, "Bellman–Ford found a negative cycle");
            return Err(ShortestPathError::NegativeCycle {
                passes: paths.iterations,
            });
        }
    }
}

impl<T, W: Weight> Graph<T, W> {
    pub fn shortest_paths(
        &self,
        algorithm: ShortestPathAlgorithm,
        source: Uuid,
    ) -> Result<PathReport<W>, ShortestPathError> {
        let report = match algorithm {
            ShortestPathAlgorithm::Dijkstra => PathReport::SingleSource(self.dijkstra(source)?),
            ShortestPathAlgorithm::Ford => PathReport::SingleSource(self.bellman_ford(source)?),
            ShortestPathAlgorithm::LabelCorrecting => {
                PathReport::SingleSource(self.label_correcting(source)?)
            }
            ShortestPathAlgorithm::FloydWarshall => PathReport::AllPairs(self.floyd_warshall()),
        };
        Ok(report)
    }

    fn source_labels(&self, source: Uuid) -> Result<ShortestPaths<W>, ShortestPathError> {
        if !self.contains(source) {
            return Err(ShortestPathError::UnknownSource(source));
        }
        Ok(ShortestPaths::new(source, self.uuids()))
    }

    pub fn dijkstra(&self, source: Uuid) -> Result<ShortestPaths<W>, ShortestPathError> {
        let mut paths = self.source_labels(source)?;
        let mut open: IndexSet<Uuid> = self.uuids().collect();

        while !open.is_empty() {
            // ties go to the earliest inserted node
            let mut closest = 0;
            for (i, uuid) in open.iter().enumerate().skip(1) {
                if paths.labels[uuid].distance < paths.labels[&open[closest]].distance {
                    closest = i;
                }
            }
            let Some(from) = open.shift_remove_index(closest) else {
                break;
            };

            for (to, weight) in self.out_edges(from) {
                if open.contains(&to) {
                    paths.relax(from, to, weight);
                }
            }
            paths.iterations += 1;
            paths.log_iteration(ShortestPathAlgorithm::Dijkstra);
        }

        debug!(source, iterations = paths.iterations, "Dijkstra done");
        Ok(paths)
    }

    /// Bellman–Ford over the forward edges of the graph, in row-major order.
    pub fn bellman_ford(&self, source: Uuid) -> Result<ShortestPaths<W>, ShortestPathError> {
        if !self.contains(source) {
            return Err(ShortestPathError::UnknownSource(source));
        }
        let paths = bellman_ford(self.uuids(), &self.forward_edges(), source)?;
        debug!(source, passes = paths.iterations, "Bellman–Ford done");
        Ok(paths)
    }

    /// Generic label correcting with a frequency ordered deque.
    ///
    /// The source starts with frequency 1. A node whose label improves while
    /// it is not queued has its frequency incremented and is inserted before
    /// the first queued node of lower frequency, or at the back.
    pub fn label_correcting(&self, source: Uuid) -> Result<ShortestPaths<W>, ShortestPathError> {
        let mut paths = self.source_labels(source)?;
        let mut frequency: AHashMap<Uuid, usize> = self.uuids().map(|u| (u, 0)).collect();
        frequency.insert(source, 1);
        let mut queue = VecDeque::from([source]);

        while let Some(from) = queue.pop_front() {
            paths.iterations += 1;
            for (to, weight) in self.out_edges(from) {
                if !paths.relax(from, to, weight) || queue.contains(&to) {
                    continue;
                }
                let count = frequency.entry(to).or_default();
                *count += 1;
                let count = *count;
                match queue.iter().position(|u| frequency[u] < count) {
                    Some(at) => queue.insert(at, to),
                    None => queue.push_back(to),
                }
            }
            paths.log_iteration(ShortestPathAlgorithm::LabelCorrecting);
        }

        debug!(source, iterations = paths.iterations, "label correcting done");
        Ok(paths)
    }

    /// Floyd–Warshall on the matrix of positive cells, with a zero diagonal
    /// and the sentinel everywhere else.
    pub fn floyd_warshall(&self) -> DistanceMatrix<W> {
        let n = self.n_nodes();
        let mut distances: Vec<Vec<W>> = self
            .adjacency()
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.weights
                    .iter()
                    .enumerate()
                    .map(|(j, &w)| match w {
                        _ if i == j => W::zero(),
                        w if w.is_forward() => W::zero().path_add(w),
                        _ => W::infinity(),
                    })
                    .collect()
            })
            .collect();

        for k in 0..n {
            for i in 0..n {
                if distances[i][k].is_infinite() {
                    continue;
                }
                for j in 0..n {
                    if distances[k][j].is_infinite() {
                        continue;
                    }
                    let candidate = distances[i][k].path_add(distances[k][j]);
                    if candidate < distances[i][j] {
                        distances[i][j] = candidate;
                    }
                }
            }
        }

        debug!(n_nodes = n, "Floyd–Warshall done");
        DistanceMatrix {
            index: self.uuids().enumerate().map(|(i, u)| (u, i)).collect(),
            distances,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::samples::Sample;
    use crate::graph::{MatrixMode, Node};

    fn labels<W: Weight>(paths: &ShortestPaths<W>) -> Vec<(Uuid, W, Uuid)> {
        paths
            .labels()
            .map(|(u, l)| (u, l.distance, l.predecessor))
            .collect()
    }

    fn cyclic_labels() -> Vec<(Uuid, i32, Uuid)> {
        vec![
            (101, 0, 101),
            (102, 2, 101),
            (103, 5, 104),
            (104, 3, 102),
            (105, 11, 104),
            (106, 4, 104),
            (107, 7, 102),
        ]
    }

    #[test]
    fn single_source_engines_on_cyclic_sample() {
        let graph = Graph::from_adjacency(Sample::Cyclic.adjacency(100));

        let dijkstra = graph.dijkstra(101).unwrap();
        assert_eq!(labels(&dijkstra), cyclic_labels());
        assert_eq!(dijkstra.iterations(), 7);

        let ford = graph.bellman_ford(101).unwrap();
        assert_eq!(labels(&ford), cyclic_labels());
        assert_eq!(ford.iterations(), 2);

        let label_correcting = graph.label_correcting(101).unwrap();
        assert_eq!(labels(&label_correcting), cyclic_labels());
        assert_eq!(label_correcting.iterations(), 7);
    }

    #[test]
    fn floyd_warshall_on_cyclic_sample() {
        let graph = Graph::from_adjacency(Sample::Cyclic.adjacency(100));
        let all_pairs = graph.floyd_warshall();

        assert_eq!(all_pairs.row(101), Some(&[0, 2, 5, 3, 11, 4, 7][..]));
        for (uuid, distance, _) in cyclic_labels() {
            assert_eq!(all_pairs.distance(101, uuid), Some(distance));
        }
        for uuid in all_pairs.uuids() {
            assert_eq!(all_pairs.distance(uuid, uuid), Some(0));
        }
        assert_eq!(all_pairs.distance(101, 1), None);
    }

    #[test]
    fn dijkstra_on_acyclic_sample() {
        let graph = Graph::from_adjacency(Sample::Acyclic.adjacency(100));
        let paths = graph.dijkstra(101).unwrap();

        assert_eq!(
            labels(&paths),
            vec![
                (101, 0, 101),
                (102, 5, 104),
                (103, 3, 101),
                (104, 4, 101),
                (105, 8, 102),
                (106, 5, 104),
                (107, 14, 105),
            ]
        );
        assert_eq!(paths.path_to(107), Some(vec![101, 104, 102, 105, 107]));
        assert_eq!(paths.path_to(101), Some(vec![101]));
    }

    #[test]
    fn unreachable_nodes_keep_the_sentinel() {
        let graph = Graph::from_adjacency(Sample::Acyclic.adjacency(100));

        for algorithm in [
            ShortestPathAlgorithm::Dijkstra,
            ShortestPathAlgorithm::Ford,
            ShortestPathAlgorithm::LabelCorrecting,
        ] {
            let Ok(PathReport::SingleSource(paths)) = graph.shortest_paths(algorithm, 105) else {
                panic!("{algorithm:?} should report single source paths");
            };
            assert_eq!(paths.distance(107), Some(6));
            assert_eq!(paths.distance(101), Some(i32::infinity()));
            assert_eq!(paths.predecessor(101), Some(105));
            assert!(!paths.is_reachable(101));
            assert_eq!(paths.path_to(101), None);
        }
    }

    #[test]
    fn unknown_source() {
        let graph = Graph::from_adjacency(Sample::Cyclic.adjacency(100));
        for algorithm in [
            ShortestPathAlgorithm::Dijkstra,
            ShortestPathAlgorithm::Ford,
            ShortestPathAlgorithm::LabelCorrecting,
        ] {
            assert_eq!(
                graph.shortest_paths(algorithm, 7),
                Err(ShortestPathError::UnknownSource(7))
            );
        }
        assert!(graph
            .shortest_paths(ShortestPathAlgorithm::FloydWarshall, 7)
            .is_ok());
    }

    #[test]
    fn negative_cycle_is_bounded() {
        let edges = [
            Edge {
                from: 1,
                to: 2,
                weight: 1,
            },
            Edge {
                from: 2,
                to: 3,
                weight: -2,
            },
            Edge {
                from: 3,
                to: 2,
                weight: 1,
            },
        ];
        assert_eq!(
            bellman_ford([1, 2, 3], &edges, 1),
            Err(ShortestPathError::NegativeCycle { passes: 3 })
        );

        let without_cycle = bellman_ford([1, 2, 3], &edges[..2], 1).unwrap();
        assert_eq!(without_cycle.distance(3), Some(-1));
        assert_eq!(without_cycle.path_to(3), Some(vec![1, 2, 3]));
    }

    #[test]
    fn path_lengths_past_the_sentinel_stay_unreachable() {
        let rows = vec![
            (Node::new((), 1), vec![0, 0x0FFF_FFF0, 0]),
            (Node::new((), 2), vec![-0x0FFF_FFF0, 0, 2_000_000_000]),
            (Node::new((), 3), vec![0, -2_000_000_000, 0]),
        ];
        let graph = Graph::<(), i32>::new(rows, MatrixMode::Adjacency).unwrap();

        for algorithm in [
            ShortestPathAlgorithm::Dijkstra,
            ShortestPathAlgorithm::Ford,
            ShortestPathAlgorithm::LabelCorrecting,
        ] {
            let Ok(PathReport::SingleSource(paths)) = graph.shortest_paths(algorithm, 1) else {
                panic!("{algorithm:?} should report single source paths");
            };
            assert_eq!(paths.distance(2), Some(0x0FFF_FFF0));
            assert_eq!(paths.distance(3), Some(i32::infinity()));
            assert!(!paths.is_reachable(3));
        }

        let all_pairs = graph.floyd_warshall();
        assert_eq!(all_pairs.distance(1, 3), Some(i32::infinity()));
        assert_eq!(all_pairs.distance(2, 3), Some(i32::infinity()));

        let edges = graph.forward_edges();
        let paths = bellman_ford(graph.uuids(), &edges, 1).unwrap();
        assert_eq!(paths.distance(3), Some(i32::infinity()));
    }

    #[test]
    fn report_format() {
        let graph = Graph::from_adjacency(Sample::Acyclic.adjacency(0));
        let paths = graph.dijkstra(5).unwrap();

        similar_asserts::assert_eq!(
            paths.to_string(),
            "Number of Iterations = 7\n\
             1  -->  268435455     5\n\
             2  -->  268435455     5\n\
             3  -->  268435455     5\n\
             4  -->  268435455     5\n\
             5  -->  0     5\n\
             6  -->  268435455     5\n\
             7  -->  6     5"
        );
    }
}
