use std::fmt::{self, Display};

use ahash::AHashSet;

use super::{unordered, Mark, Marks};
use crate::graph::{Graph, Uuid};
use crate::num_traits::Weight;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CycleKind {
    /// Any non-zero cell joins its two nodes.
    Undirected,
    /// Only positive cells are followed.
    #[default]
    Directed,
}

/// An edge that closes a cycle when added to the depth-first forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CycleEdge {
    pub from: Uuid,
    pub to: Uuid,
    pub kind: CycleKind,
}

impl Display for CycleEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CycleKind::Undirected => write!(f, "{}-{}", self.from, self.to),
            CycleKind::Directed => write!(f, "({},{})", self.from, self.to),
        }
    }
}

impl<T, W: Weight> Graph<T, W> {
    /// Cycle-closing edges in discovery order, restarting the search from
    /// every unvisited node.
    ///
    /// For [`CycleKind::Undirected`] every unordered pair is examined once,
    /// so the number of edges returned is the cyclomatic number
    /// `edges - nodes + components`. For [`CycleKind::Directed`] the back
    /// edges are returned: the graph is acyclic iff the result is empty.
    pub fn find_cycles(&self, kind: CycleKind) -> Vec<CycleEdge> {
        let cycles = match kind {
            CycleKind::Undirected => self.undirected_cycles(),
            CycleKind::Directed => self.directed_cycles(),
        };
        tracing::debug!(?kind, n_cycles = cycles.len(), "cycle detection done");
        cycles
    }

    fn undirected_cycles(&self) -> Vec<CycleEdge> {
        let mut marks = Marks::new(self.uuids());
        let mut examined = AHashSet::new();
        let mut cycles = Vec::new();

        for root in self.uuids() {
            if marks.is_visited(root) {
                continue;
            }
            marks.open(root);
            let mut stack = vec![(root, self.row_cells(root))];

            while let Some((from, neighbours)) = stack.last_mut() {
                let from = *from;
                let next = neighbours.find(|(to, _)| examined.insert(unordered(from, *to)));
                match next {
                    Some((to, _)) if marks.is_visited(to) => cycles.push(CycleEdge {
                        from,
                        to,
                        kind: CycleKind::Undirected,
                    }),
                    Some((to, _)) => {
                        marks.open(to);
                        stack.push((to, self.row_cells(to)));
                    }
                    None => {
                        marks.close(from);
                        stack.pop();
                    }
                }
            }
        }
        cycles
    }

    fn directed_cycles(&self) -> Vec<CycleEdge> {
        let mut marks = Marks::new(self.uuids());
        let mut cycles = Vec::new();

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
                        Mark::Open(_) => cycles.push(CycleEdge {
                            from,
                            to,
                            kind: CycleKind::Directed,
                        }),
                        Mark::Closed(_) => {}
                    },
                    None => {
                        marks.close(from);
                        stack.pop();
                    }
                }
            }
        }
        cycles
    }
}
