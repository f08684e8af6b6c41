use std::collections::VecDeque;

use derive_more::Display;

use super::Marks;
use crate::graph::{Graph, GraphError, Uuid};
use crate::num_traits::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    BreadthFirst,
    DepthFirst,
}

/// An edge along which a traversal discovered a new node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "{}-{}", from, to)]
pub struct TraversalEdge {
    pub from: Uuid,
    pub to: Uuid,
}

impl From<(Uuid, Uuid)> for TraversalEdge {
    fn from((from, to): (Uuid, Uuid)) -> Self {
        TraversalEdge { from, to }
    }
}

impl<T, W: Weight> Graph<T, W> {
    pub fn traverse(&self, traversal: Traversal) -> Vec<TraversalEdge> {
        match traversal {
            Traversal::BreadthFirst => self.breadth_first_search(),
            Traversal::DepthFirst => self.depth_first_search(),
        }
    }

    /// Level order traversal from the first node, following positive cells.
    ///
    /// Nodes are marked when enqueued, so each reachable node appears exactly
    /// once as the target of a returned edge.
    pub fn breadth_first_search(&self) -> Vec<TraversalEdge> {
        match self.uuids().next() {
            Some(start) => self.bfs(start),
            None => Vec::new(),
        }
    }

    pub fn breadth_first_search_from(
        &self,
        start: Uuid,
    ) -> Result<Vec<TraversalEdge>, GraphError> {
        self.require(start)?;
        Ok(self.bfs(start))
    }

    fn bfs(&self, start: Uuid) -> Vec<TraversalEdge> {
        let mut marks = Marks::new(self.uuids());
        let mut queue = VecDeque::from([start]);
        let mut edges = Vec::new();
        marks.open(start);

        while let Some(from) = queue.pop_front() {
            for (to, _) in self.out_edges(from) {
                if !marks.is_visited(to) {
                    marks.open(to);
                    queue.push_back(to);
                    edges.push(TraversalEdge { from, to });
                }
            }
        }
        edges
    }

    /// Preorder depth-first traversal, restarted from every unvisited node in
    /// insertion order so that all components are covered.
    pub fn depth_first_search(&self) -> Vec<TraversalEdge> {
        let mut marks = Marks::new(self.uuids());
        let mut edges = Vec::new();

        for root in self.uuids() {
            if marks.is_visited(root) {
                continue;
            }
            marks.open(root);
            let mut stack = vec![(root, self.out_edges(root))];

            while let Some((from, successors)) = stack.last_mut() {
                let from = *from;
                match successors.find(|(to, _)| !marks.is_visited(*to)) {
                    Some((to, _)) => {
                        marks.open(to);
                        edges.push(TraversalEdge { from, to });
                        stack.push((to, self.out_edges(to)));
                    }
                    None => {
                        marks.close(from);
                        stack.pop();
                    }
                }
            }
        }
        edges
    }
}
