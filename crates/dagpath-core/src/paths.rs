//! Single-source shortest and longest (critical) paths over a vertex order.
//!
//! # Algorithm
//!
//! All operations share one forward pass:
//!
//! 1. Every distance starts at the sentinel of the requested
//!    [`PathSense`] (`+∞` for shortest, `-∞` for longest); the source
//!    starts at `0`.
//! 2. Walk `order`. Entries before the first occurrence of the source are
//!    skipped; propagation only runs forward from the source's position.
//! 3. For each vertex that is no longer at the sentinel, relax every
//!    outgoing edge with `min` (shortest) or `max` (longest), remembering
//!    the predecessor that produced each improvement.
//!
//! One pass is exact when `order` is a topological order of `graph`.
//!
//! # Cyclic inputs
//!
//! Running on the *original* graph with a vertex order expanded from the
//! component order is exact only when every component reachable from the
//! source is a singleton. Inside a larger component some edges point
//! backwards in the order: their effect is either skipped or applied after
//! the target was already propagated. Such runs still terminate and return
//! a distance for every vertex, but that distance is not guaranteed to be
//! the true optimum. Nothing here detects the situation.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use serde::{Serialize, Serializer};

use crate::error::GraphError;
use crate::graph::{GraphView, Vertex};
use crate::metrics::{Metrics, NoopMetrics};

/// Which optimum a distance computation tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSense {
    Shortest,
    Longest,
}

impl PathSense {
    /// Distance value meaning "not reached from the source".
    #[must_use]
    pub const fn unreached(self) -> f64 {
        match self {
            Self::Shortest => f64::INFINITY,
            Self::Longest => f64::NEG_INFINITY,
        }
    }

    fn improves(self, current: f64, candidate: f64) -> bool {
        match self {
            Self::Shortest => candidate < current,
            Self::Longest => candidate > current,
        }
    }
}

/// Per-vertex distances from one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceVector {
    sense: PathSense,
    source: Vertex,
    #[serde(serialize_with = "finite_or_null")]
    distances: Vec<f64>,
}

impl DistanceVector {
    #[must_use]
    pub const fn sense(&self) -> PathSense {
        self.sense
    }

    #[must_use]
    pub const fn source(&self) -> Vertex {
        self.source
    }

    /// Raw distances; unreached vertices hold [`PathSense::unreached`].
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.distances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Distance of `v`, or `None` when unreached or out of range.
    #[must_use]
    pub fn get(&self, v: Vertex) -> Option<f64> {
        let unreached = self.sense.unreached();
        self.distances.get(v).copied().filter(|&d| d != unreached)
    }

    /// Return `true` if `v` was reached from the source.
    #[must_use]
    pub fn is_reachable(&self, v: Vertex) -> bool {
        self.get(v).is_some()
    }

    /// Reached vertices with their distances, ascending by vertex.
    pub fn reachable(&self) -> impl Iterator<Item = (Vertex, f64)> + '_ {
        let unreached = self.sense.unreached();
        self.distances
            .iter()
            .copied()
            .enumerate()
            .filter(move |&(_, d)| d != unreached)
    }

    /// Number of reached vertices (the source included).
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.reachable().count()
    }
}

/// Longest path from the source to the farthest reachable vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPathResult {
    /// Vertices from the source to [`Self::target`], source first.
    pub path: Vec<Vertex>,
    /// Total weight of the path.
    pub length: f64,
    /// Farthest vertex under the longest-path metric.
    pub target: Vertex,
}

impl CriticalPathResult {
    /// Number of edges on the path.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Shortest distances from `source`, propagated along `order`.
///
/// # Errors
///
/// Returns [`GraphError::VertexOutOfRange`] if `source` or any entry of
/// `order` is not a vertex of `graph`.
pub fn shortest_paths(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
) -> Result<DistanceVector, GraphError> {
    shortest_paths_with(graph, order, source, &mut NoopMetrics)
}

/// [`shortest_paths`], reporting `relaxations` to `metrics`.
///
/// # Errors
///
/// See [`shortest_paths`].
pub fn shortest_paths_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    metrics: &mut M,
) -> Result<DistanceVector, GraphError> {
    distances_with(graph, order, source, PathSense::Shortest, metrics)
}

/// Longest distances from `source`, propagated along `order`.
///
/// # Errors
///
/// Returns [`GraphError::VertexOutOfRange`] if `source` or any entry of
/// `order` is not a vertex of `graph`.
pub fn longest_paths(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
) -> Result<DistanceVector, GraphError> {
    longest_paths_with(graph, order, source, &mut NoopMetrics)
}

/// [`longest_paths`], reporting `relaxations` to `metrics`.
///
/// # Errors
///
/// See [`longest_paths`].
pub fn longest_paths_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    metrics: &mut M,
) -> Result<DistanceVector, GraphError> {
    distances_with(graph, order, source, PathSense::Longest, metrics)
}

/// Find the critical (longest) path starting at `source`.
///
/// The target is the vertex with the greatest finite longest-path distance.
/// The scan starts from the source itself and moves through vertices in
/// index order, switching only on a strictly greater distance, so ties keep
/// the earlier candidate.
///
/// # Errors
///
/// See [`longest_paths`].
pub fn find_critical_path(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
) -> Result<CriticalPathResult, GraphError> {
    find_critical_path_with(graph, order, source, &mut NoopMetrics)
}

/// [`find_critical_path`], reporting `relaxations` to `metrics`.
///
/// # Errors
///
/// See [`longest_paths`].
pub fn find_critical_path_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    metrics: &mut M,
) -> Result<CriticalPathResult, GraphError> {
    metrics.start();
    let result = relax_forward(graph, order, source, PathSense::Longest, metrics);
    metrics.stop();
    let pass = result?;

    let mut target = source;
    let mut length = pass.distances[source];
    for (v, &d) in pass.distances.iter().enumerate() {
        if d.is_finite() && d > length {
            target = v;
            length = d;
        }
    }

    let path = pass.walk_back(source, target);
    Ok(CriticalPathResult {
        path,
        length,
        target,
    })
}

/// Rebuild the `sense`-optimal path from `source` to `target`.
///
/// Re-runs the forward pass, then follows recorded predecessors back from
/// `target`. Returns an empty path when `target` is unreached; otherwise
/// the path starts with `source`.
///
/// # Errors
///
/// Returns [`GraphError::VertexOutOfRange`] if `source`, `target`, or any
/// entry of `order` is not a vertex of `graph`.
pub fn reconstruct_path(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    target: Vertex,
    sense: PathSense,
) -> Result<Vec<Vertex>, GraphError> {
    graph.check_vertex(target)?;
    let pass = relax_forward(graph, order, source, sense, &mut NoopMetrics)?;

    if pass.distances[target] == sense.unreached() {
        return Ok(Vec::new());
    }
    Ok(pass.walk_back(source, target))
}

// ---------------------------------------------------------------------------
// Forward relaxation
// ---------------------------------------------------------------------------

struct ForwardPass {
    distances: Vec<f64>,
    parent: Vec<Option<Vertex>>,
}

impl ForwardPass {
    /// Follow predecessors from `target` to `source`; source first.
    ///
    /// A predecessor chain can only revisit a vertex when the order was not
    /// topological for this graph. The walk stops at the first repeat and
    /// closes the path at `source`.
    fn walk_back(&self, source: Vertex, target: Vertex) -> Vec<Vertex> {
        let mut path = Vec::new();
        let mut seen = FixedBitSet::with_capacity(self.distances.len());
        let mut current = target;

        while current != source {
            if seen.put(current) {
                break;
            }
            path.push(current);
            match self.parent[current] {
                Some(prev) => current = prev,
                None => break,
            }
        }

        path.push(source);
        path.reverse();
        path
    }
}

fn distances_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    sense: PathSense,
    metrics: &mut M,
) -> Result<DistanceVector, GraphError> {
    metrics.start();
    let result = relax_forward(graph, order, source, sense, metrics);
    metrics.stop();

    let pass = result?;
    Ok(DistanceVector {
        sense,
        source,
        distances: pass.distances,
    })
}

fn relax_forward<M: Metrics + ?Sized>(
    graph: &GraphView,
    order: &[Vertex],
    source: Vertex,
    sense: PathSense,
    metrics: &mut M,
) -> Result<ForwardPass, GraphError> {
    graph.check_vertex(source)?;
    for &v in order {
        graph.check_vertex(v)?;
    }

    let n = graph.vertex_count();
    let mut distances = vec![sense.unreached(); n];
    let mut parent: Vec<Option<Vertex>> = vec![None; n];
    distances[source] = 0.0;

    let start = order.iter().position(|&v| v == source).unwrap_or(order.len());
    for &u in &order[start..] {
        let du = distances[u];
        if du == sense.unreached() {
            continue;
        }

        for &(v, w) in graph.successors(u) {
            metrics.increment("relaxations");
            let candidate = du + w;
            if sense.improves(distances[v], candidate) {
                distances[v] = candidate;
                parent[v] = Some(u);
            }
        }
    }

    Ok(ForwardPass { distances, parent })
}

fn finite_or_null<S: Serializer>(distances: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(distances.iter().map(|d| d.is_finite().then_some(*d)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SimpleMetrics;

    const EPS: f64 = 1e-9;

    fn graph(n: usize, edges: &[(Vertex, Vertex, f64)]) -> GraphView {
        GraphView::from_edges(n, edges.iter().copied()).expect("valid graph")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    /// 0 -> 1 (5), 1 -> 2 (3), 0 -> 2 (10)
    fn triangle() -> GraphView {
        graph(3, &[(0, 1, 5.0), (0, 2, 10.0), (1, 2, 3.0)])
    }

    /// 0 -> 1 (2), 0 -> 2 (3), 1 -> 3 (4), 2 -> 3 (5)
    fn diamond() -> GraphView {
        graph(4, &[(0, 1, 2.0), (0, 2, 3.0), (1, 3, 4.0), (2, 3, 5.0)])
    }

    // -----------------------------------------------------------------------
    // Distances
    // -----------------------------------------------------------------------

    #[test]
    fn shortest_paths_on_triangle() {
        let dist = shortest_paths(&triangle(), &[0, 1, 2], 0).expect("valid input");
        assert_eq!(dist.sense(), PathSense::Shortest);
        assert_close(dist.as_slice()[0], 0.0);
        assert_close(dist.as_slice()[1], 5.0);
        assert_close(dist.as_slice()[2], 8.0);
    }

    #[test]
    fn longest_paths_on_triangle() {
        let dist = longest_paths(&triangle(), &[0, 1, 2], 0).expect("valid input");
        assert_eq!(dist.sense(), PathSense::Longest);
        assert_close(dist.as_slice()[0], 0.0);
        assert_close(dist.as_slice()[1], 5.0);
        assert_close(dist.as_slice()[2], 10.0);
    }

    #[test]
    fn unreached_vertices_keep_sentinels() {
        // 0 -> 1, vertex 2 isolated
        let g = graph(3, &[(0, 1, 1.0)]);
        let short = shortest_paths(&g, &[0, 1, 2], 0).expect("valid input");
        let long = longest_paths(&g, &[0, 1, 2], 0).expect("valid input");

        assert_eq!(short.as_slice()[2], f64::INFINITY);
        assert_eq!(long.as_slice()[2], f64::NEG_INFINITY);
        assert_eq!(short.get(2), None);
        assert!(!long.is_reachable(2));
        assert_eq!(short.reachable_count(), 2);
    }

    #[test]
    fn longest_overflow_to_infinity_still_counts_as_reached() {
        // 0 -> 1 -> 2 sums past f64::MAX, 2 -> 3 must still be relaxed
        let g = graph(4, &[(0, 1, f64::MAX), (1, 2, f64::MAX), (2, 3, 1.0)]);
        let order = [0, 1, 2, 3];
        let long = longest_paths(&g, &order, 0).expect("valid input");

        assert_eq!(long.as_slice()[2], f64::INFINITY);
        assert_eq!(long.as_slice()[3], f64::INFINITY);
        assert!(long.is_reachable(3));
        assert_eq!(long.reachable_count(), 4);

        let path = reconstruct_path(&g, &order, 0, 3, PathSense::Longest).expect("valid input");
        assert_eq!(path, vec![0, 1, 2, 3]);
    }

    #[test]
    fn vertices_before_source_are_not_propagated() {
        // Order puts 0 before the source 1; 0's edge is never relaxed.
        let g = graph(3, &[(0, 2, 1.0), (1, 2, 7.0)]);
        let dist = shortest_paths(&g, &[0, 1, 2], 1).expect("valid input");
        assert_eq!(dist.get(0), None);
        assert_eq!(dist.get(1), Some(0.0));
        assert_eq!(dist.get(2), Some(7.0));
    }

    #[test]
    fn source_missing_from_order_reaches_nothing_else() {
        let g = graph(2, &[(0, 1, 1.0)]);
        let dist = shortest_paths(&g, &[1], 0).expect("valid input");
        assert_eq!(dist.get(0), Some(0.0));
        assert_eq!(dist.get(1), None);
    }

    #[test]
    fn negative_weights_are_relaxed() {
        let g = graph(3, &[(0, 1, -2.0), (1, 2, -3.0), (0, 2, 1.0)]);
        let dist = shortest_paths(&g, &[0, 1, 2], 0).expect("valid input");
        assert_eq!(dist.get(2), Some(-5.0));
    }

    #[test]
    fn parallel_edges_pick_the_better_weight() {
        let g = graph(2, &[(0, 1, 4.0), (0, 1, 1.0)]);
        assert_eq!(
            shortest_paths(&g, &[0, 1], 0).expect("valid").get(1),
            Some(1.0)
        );
        assert_eq!(
            longest_paths(&g, &[0, 1], 0).expect("valid").get(1),
            Some(4.0)
        );
    }

    #[test]
    fn out_of_range_source_is_rejected() {
        let err = shortest_paths(&triangle(), &[0, 1, 2], 3).expect_err("source 3");
        assert_eq!(err, GraphError::VertexOutOfRange { vertex: 3, n: 3 });
    }

    #[test]
    fn out_of_range_order_entry_is_rejected() {
        let err = longest_paths(&triangle(), &[0, 9, 2], 0).expect_err("order entry 9");
        assert_eq!(err, GraphError::VertexOutOfRange { vertex: 9, n: 3 });
    }

    #[test]
    fn relaxations_are_counted() {
        let mut metrics = SimpleMetrics::new();
        shortest_paths_with(&diamond(), &[0, 1, 2, 3], 0, &mut metrics).expect("valid");
        assert_eq!(metrics.counter("relaxations"), 4);
    }

    // -----------------------------------------------------------------------
    // Critical path
    // -----------------------------------------------------------------------

    #[test]
    fn critical_path_on_diamond() {
        let result = find_critical_path(&diamond(), &[0, 1, 2, 3], 0).expect("valid input");
        assert_close(result.length, 8.0);
        assert_eq!(result.path, vec![0, 2, 3]);
        assert_eq!(result.target, 3);
        assert_eq!(result.hop_count(), 2);
    }

    #[test]
    fn critical_path_from_isolated_source_is_just_the_source() {
        let g = graph(3, &[(0, 1, 1.0)]);
        let result = find_critical_path(&g, &[0, 1, 2], 2).expect("valid input");
        assert_eq!(result.path, vec![2]);
        assert_close(result.length, 0.0);
        assert_eq!(result.target, 2);
    }

    #[test]
    fn critical_path_ties_keep_lowest_index() {
        // 0 -> 1 (3), 0 -> 2 (3)
        let g = graph(3, &[(0, 1, 3.0), (0, 2, 3.0)]);
        let result = find_critical_path(&g, &[0, 1, 2], 0).expect("valid input");
        assert_eq!(result.target, 1);
        assert_eq!(result.path, vec![0, 1]);
    }

    #[test]
    fn critical_path_with_only_negative_weights_stays_at_source() {
        let g = graph(2, &[(0, 1, -1.0)]);
        let result = find_critical_path(&g, &[0, 1], 0).expect("valid input");
        assert_eq!(result.target, 0);
        assert_eq!(result.path, vec![0]);
    }

    // -----------------------------------------------------------------------
    // Reconstruction
    // -----------------------------------------------------------------------

    #[test]
    fn reconstruct_shortest_and_longest() {
        let g = triangle();
        let order = [0, 1, 2];
        assert_eq!(
            reconstruct_path(&g, &order, 0, 2, PathSense::Shortest).expect("valid"),
            vec![0, 1, 2]
        );
        assert_eq!(
            reconstruct_path(&g, &order, 0, 2, PathSense::Longest).expect("valid"),
            vec![0, 2]
        );
    }

    #[test]
    fn reconstruct_to_source_is_single_vertex() {
        let path = reconstruct_path(&triangle(), &[0, 1, 2], 0, 0, PathSense::Shortest)
            .expect("valid input");
        assert_eq!(path, vec![0]);
    }

    #[test]
    fn reconstruct_unreached_target_is_empty() {
        let g = graph(3, &[(0, 1, 1.0)]);
        let path = reconstruct_path(&g, &[0, 1, 2], 0, 2, PathSense::Longest).expect("valid");
        assert!(path.is_empty());
    }

    #[test]
    fn reconstruct_rejects_unknown_target() {
        let err = reconstruct_path(&triangle(), &[0, 1, 2], 0, 5, PathSense::Shortest)
            .expect_err("target 5");
        assert_eq!(err, GraphError::VertexOutOfRange { vertex: 5, n: 3 });
    }

    #[test]
    fn reconstruct_terminates_when_order_is_not_topological() {
        // 0 -> 1 -> 2 -> 1 with positive weights: longest-path parents of 1
        // and 2 point at each other after one forward pass.
        let g = graph(3, &[(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0)]);
        let path = reconstruct_path(&g, &[0, 1, 2], 0, 1, PathSense::Longest).expect("valid");
        assert_eq!(path.first(), Some(&0));
        assert!(path.len() <= 3);
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn unreached_distances_serialize_as_null() {
        let g = graph(2, &[]);
        let dist = shortest_paths(&g, &[0, 1], 0).expect("valid input");
        let json = serde_json::to_value(&dist).expect("serializable");
        assert_eq!(json["sense"], "shortest");
        assert_eq!(json["distances"], serde_json::json!([0.0, null]));
    }
}
