//! Sample graphs: the seven node digraph used by the command line driver, in
//! a variant with cycles and one without, and seeded random matrices.
//!
//! ```text
//!      a   b   c   d   e   f   g        (with cycle)
//!  a   0   2  -3  -4   0   0   0        a-->b, a<--c, a<--d
//!  b  -2   0  -3   1  -3   4   5        b-->d, b-->f, b-->g
//!  c   3   3   0  -2   0   3  -2        c-->a, c-->b, c-->f
//!  d   4  -1   2   0   8   1   4        d-->a, d-->c, d-->e, d-->f, d-->g
//!  e   0   3   0  -8   0   3  -6        e-->b, e-->f
//!  f   0  -4  -3  -1  -3   0   4        f-->g
//!  g   0  -5   2  -4   6  -4   0        g-->c, g-->e
//! ```

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{AdjacencyMatrix, MatrixError, MatrixRow, Node, Uuid};

const CYCLIC: [[i32; 7]; 7] = [
    [0, 2, -3, -4, 0, 0, 0],
    [-2, 0, -3, 1, -3, 4, 5],
    [3, 3, 0, -2, 0, 3, -2],
    [4, -1, 2, 0, 8, 1, 4],
    [0, 3, 0, -8, 0, 3, -6],
    [0, -4, -3, -1, -3, 0, 4],
    [0, -5, 2, -4, 6, -4, 0],
];

const ACYCLIC: [[i32; 7]; 7] = [
    [0, 0, 3, 4, 0, 0, 0],
    [0, 0, 0, -1, 3, 0, 0],
    [-3, 0, 0, 2, 0, 3, 0],
    [-4, 1, -2, 0, 8, 1, 0],
    [0, -3, 0, -8, 0, 0, 6],
    [0, 0, -3, -1, 0, 0, 0],
    [0, 0, 0, 0, -6, 0, 0],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sample {
    /// Contains the directed cycles `a -> b -> d -> a` and more.
    Cyclic,
    /// The same nodes with a subset of the edges, forming a DAG.
    Acyclic,
}

impl Sample {
    pub fn weights(self) -> [[i32; 7]; 7] {
        match self {
            Sample::Cyclic => CYCLIC,
            Sample::Acyclic => ACYCLIC,
        }
    }

    /// Rows of the sample, node `i` (1-based) carrying payload `i` and uuid
    /// `offset + i`.
    pub fn rows(self, offset: Uuid) -> Vec<MatrixRow<i32, i32>> {
        self.weights()
            .into_iter()
            .zip(1..)
            .map(|(weights, i)| MatrixRow {
                node: Node::new(i, offset + Uuid::from(i)),
                weights: weights.to_vec(),
            })
            .collect()
    }

    pub fn adjacency(self, offset: Uuid) -> AdjacencyMatrix<i32, i32> {
        AdjacencyMatrix::new_unchecked(self.rows(offset))
    }
}

/// A random adjacency matrix following the sign convention.
///
/// Each pair of nodes is joined with probability `density`, with a weight in
/// `1..=max_weight`. Directed graphs get a random orientation per edge,
/// undirected ones a symmetric pair of cells. UUIDs are sparse on purpose.
pub fn random_adjacency(
    n_nodes: usize,
    density: f64,
    max_weight: i32,
    directed: bool,
    seed: u64,
) -> Result<AdjacencyMatrix<usize, i32>, MatrixError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut weights = vec![vec![0; n_nodes]; n_nodes];

    for i in 0..n_nodes {
        for j in i + 1..n_nodes {
            if !rng.gen_bool(density.clamp(0.0, 1.0)) {
                continue;
            }
            let w = rng.gen_range(1..=max_weight.max(1));
            if !directed {
                weights[i][j] = w;
                weights[j][i] = w;
            } else if rng.gen_bool(0.5) {
                weights[i][j] = w;
                weights[j][i] = -w;
            } else {
                weights[i][j] = -w;
                weights[j][i] = w;
            }
        }
    }

    AdjacencyMatrix::new(
        weights
            .into_iter()
            .enumerate()
            .map(|(i, row)| (Node::new(i, 11 + 3 * i as Uuid), row)),
    )
}
