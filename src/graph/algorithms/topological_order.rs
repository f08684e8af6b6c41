use std::fmt::{self, Display};

use indexmap::IndexSet;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use super::{Mark, Marks};
use crate::graph::{Graph, Uuid};
use crate::num_traits::Weight;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopoError {
    #[error("Not a DAG: edge {from} -> {to} closes a directed cycle")]
    Cyclic { from: Uuid, to: Uuid },
}

/// Depth-first finish order of a directed acyclic graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologicalOrder {
    postorder: IndexSet<Uuid>,
}

impl TopologicalOrder {
    /// Nodes by descending finish number: every edge points to a later node.
    pub fn order(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.postorder.iter().rev().copied()
    }

    /// Nodes by ascending finish number, sinks first.
    pub fn postorder(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.postorder.iter().copied()
    }

    /// 1-based finish number of a node.
    pub fn finish_number(&self, uuid: Uuid) -> Option<usize> {
        self.postorder.get_index_of(&uuid).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.postorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postorder.is_empty()
    }
}

impl Display for TopologicalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.order().format(" "))
    }
}

impl<T, W: Weight> Graph<T, W> {
    /// Numbers the nodes in depth-first postorder following positive cells.
    ///
    /// Fails on the first edge to a node that is open on the stack.
    pub fn topological_order(&self) -> Result<TopologicalOrder, TopoError> {
        let mut marks = Marks::new(self.uuids());
        let mut postorder = IndexSet::with_capacity(self.n_nodes());

        for root in self.uuids() {
            if marks.is_visited(root) {
                continue;
            }
            marks.open(root);
            let mut stack = vec![(root, self.out_edges(root))];

            while let Some((from, successors)) = stack.last_mut() {
                let from = *from;
                match successors.next() {
                    Some((to, _)) => match marks.get(to) {
                        Mark::Unvisited => {
                            marks.open(to);
                            stack.push((to, self.out_edges(to)));
                        }
                        Mark::Open(_) => {
                            debug!(from, to, "topological sort hit a back edge");
                            return Err(TopoError::Cyclic { from, to });
                        }
                        Mark::Closed(_) => {}
                    },
                    None => {
                        marks.close(from);
                        postorder.insert(from);
                        stack.pop();
                    }
                }
            }
        }

        Ok(TopologicalOrder { postorder })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{samples::Sample, Node};

    #[test]
    fn acyclic_sample() {
        let graph = Graph::from_adjacency(Sample::Acyclic.adjacency(100));
        let order = graph.topological_order().unwrap();

        insta::assert_debug_snapshot!(order.order().collect::<Vec<_>>(), @r"
        [
            101,
            103,
            104,
            106,
            102,
            105,
            107,
        ]
        ");
        assert_eq!(
            order.postorder().collect::<Vec<_>>(),
            vec![107, 105, 102, 106, 104, 103, 101]
        );
        assert_eq!(order.finish_number(107), Some(1));
        assert_eq!(order.finish_number(101), Some(7));
        assert_eq!(order.finish_number(7), None);
        assert_eq!(order.to_string(), "101 103 104 106 102 105 107");
    }

    #[test]
    fn every_edge_points_forward() {
        let graph = Graph::from_adjacency(Sample::Acyclic.adjacency(100));
        let order = graph.topological_order().unwrap();

        for edge in graph.forward_edges() {
            assert!(order.finish_number(edge.from) > order.finish_number(edge.to));
        }
    }

    #[test]
    fn cyclic_sample_is_rejected() {
        let graph = Graph::from_adjacency(Sample::Cyclic.adjacency(100));
        assert_eq!(
            graph.topological_order(),
            Err(TopoError::Cyclic { from: 104, to: 101 })
        );
    }

    #[test]
    fn isolated_nodes_are_ordered() {
        let rows = vec![
            (Node::new('x', 3), vec![0, 0, 0]),
            (Node::new('y', 2), vec![0, 0, -1]),
            (Node::new('z', 1), vec![0, 1, 0]),
        ];
        let graph = Graph::<char, i32>::new(rows, Default::default()).unwrap();
        let order = graph.topological_order().unwrap();

        assert_eq!(order.len(), 3);
        assert_eq!(order.order().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
