//! Seeded random graph generator.
//!
//! Three shapes are supported:
//!
//! - [`GraphShape::Dag`]: only `i -> j` with `i < j`, each pair kept with
//!   probability `density`, capped at `floor(n(n-1)/2 · density)` edges.
//! - [`GraphShape::Cyclic`]: a DAG at `0.7 · density` plus
//!   `floor(n · density · 0.3)` attempts at a random extra edge. An attempt
//!   that would add a self-loop or repeat an existing pair is dropped.
//! - [`GraphShape::MultiScc`]: 2 or 3 contiguous clusters with edges in both
//!   directions inside each cluster (probability `density`), plus forward
//!   edges from each cluster into the next (probability `0.3 · density`).
//!
//! Weights are uniform in `[1, 11)`. One generator draws every dataset
//! from the same stream, so the output of a sequence of calls depends on
//! the seed and the call order.

use std::collections::HashSet;

use anyhow::{Result, ensure};
use dagpath_core::graph::Vertex;
use dagpath_core::model::{EdgeData, GraphData};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_WEIGHT: f64 = 1.0;
const MAX_WEIGHT: f64 = 11.0;
const CYCLIC_BASE_FACTOR: f64 = 0.7;
const BACK_EDGE_FACTOR: f64 = 0.3;
const INTER_CLUSTER_FACTOR: f64 = 0.3;

/// Structure of a generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphShape {
    Dag,
    Cyclic,
    MultiScc,
}

impl GraphShape {
    /// Resolve the `cyclic` / `multiple SCC` flag pair. Multiple SCCs win
    /// when both are set.
    #[must_use]
    pub const fn from_flags(cyclic: bool, multiple_scc: bool) -> Self {
        if multiple_scc {
            Self::MultiScc
        } else if cyclic {
            Self::Cyclic
        } else {
            Self::Dag
        }
    }
}

/// Parameters for one generated graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub vertices: usize,
    /// Edge probability in `[0, 1]`.
    pub density: f64,
    pub shape: GraphShape,
    /// Source vertex recorded in the output.
    pub source: Vertex,
}

impl GeneratorConfig {
    #[must_use]
    pub const fn new(vertices: usize, density: f64, shape: GraphShape, source: Vertex) -> Self {
        Self {
            vertices,
            density,
            shape,
            source,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.density),
            "density {} is outside [0, 1]",
            self.density
        );
        ensure!(
            self.vertices == 0 || self.source < self.vertices,
            "source {} is outside 0..{}",
            self.source,
            self.vertices
        );
        Ok(())
    }
}

/// Random graph generator over a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    rng: StdRng,
}

impl DatasetGenerator {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate one graph.
    ///
    /// # Errors
    ///
    /// Returns an error if `density` is outside `[0, 1]` or `source` is not
    /// a vertex of a non-empty graph.
    pub fn generate(&mut self, config: &GeneratorConfig) -> Result<GraphData> {
        config.validate()?;

        let mut edges = EdgeSet::default();
        let n = config.vertices;
        match config.shape {
            GraphShape::Dag => self.dag(n, config.density, &mut edges),
            GraphShape::Cyclic => self.cyclic(n, config.density, &mut edges),
            GraphShape::MultiScc => self.multi_scc(n, config.density, &mut edges),
        }

        debug!(
            vertices = n,
            edges = edges.list.len(),
            shape = ?config.shape,
            "generated graph"
        );
        Ok(GraphData::directed(n, edges.list, config.source))
    }

    fn weight(&mut self) -> f64 {
        self.rng.gen_range(MIN_WEIGHT..MAX_WEIGHT)
    }

    fn add(&mut self, edges: &mut EdgeSet, u: Vertex, v: Vertex) -> bool {
        if edges.contains(u, v) {
            return false;
        }
        let w = self.weight();
        edges.insert(u, v, w);
        true
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn dag(&mut self, n: usize, density: f64, edges: &mut EdgeSet) {
        let pairs = n * n.saturating_sub(1) / 2;
        let max_edges = (pairs as f64 * density) as usize;
        let mut generated = 0;

        'outer: for i in 0..n {
            for j in i + 1..n {
                if generated >= max_edges {
                    break 'outer;
                }
                if self.rng.gen_bool(density) && self.add(edges, i, j) {
                    generated += 1;
                }
            }
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn cyclic(&mut self, n: usize, density: f64, edges: &mut EdgeSet) {
        self.dag(n, density * CYCLIC_BASE_FACTOR, edges);
        if n == 0 {
            return;
        }

        let attempts = (n as f64 * density * BACK_EDGE_FACTOR) as usize;
        for _ in 0..attempts {
            let from = self.rng.gen_range(0..n);
            let to = self.rng.gen_range(0..n);
            if from != to {
                self.add(edges, from, to);
            }
        }
    }

    fn multi_scc(&mut self, n: usize, density: f64, edges: &mut EdgeSet) {
        let clusters = self.rng.gen_range(2..=3);
        let bounds = cluster_bounds(n, clusters);

        for &(start, end) in &bounds {
            for i in start..end {
                for j in start..end {
                    if i != j && self.rng.gen_bool(density) {
                        self.add(edges, i, j);
                    }
                }
            }
        }

        let forward = density * INTER_CLUSTER_FACTOR;
        for pair in bounds.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            for i in from.0..from.1 {
                for j in to.0..to.1 {
                    if self.rng.gen_bool(forward) {
                        self.add(edges, i, j);
                    }
                }
            }
        }
    }
}

/// Split `0..n` into `clusters` contiguous ranges; the last one absorbs
/// the remainder.
fn cluster_bounds(n: usize, clusters: usize) -> Vec<(Vertex, Vertex)> {
    let per_cluster = n / clusters;
    (0..clusters)
        .map(|c| {
            let start = c * per_cluster;
            let end = if c + 1 == clusters {
                n
            } else {
                (c + 1) * per_cluster
            };
            (start, end)
        })
        .collect()
}

/// Insertion-ordered edge list with a duplicate-pair index.
#[derive(Default)]
struct EdgeSet {
    list: Vec<EdgeData>,
    pairs: HashSet<(Vertex, Vertex)>,
}

impl EdgeSet {
    fn contains(&self, u: Vertex, v: Vertex) -> bool {
        self.pairs.contains(&(u, v))
    }

    fn insert(&mut self, u: Vertex, v: Vertex, w: f64) {
        self.pairs.insert((u, v));
        self.list.push(EdgeData::new(u, v, w));
    }
}
