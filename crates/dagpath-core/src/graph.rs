//! Immutable weighted adjacency view shared by every pipeline stage.
//!
//! # Overview
//!
//! A [`GraphView`] holds `n` vertices (`0..n`) and, per vertex, the ordered
//! list of outgoing `(target, weight)` pairs. Parallel edges between the
//! same ordered pair are kept as-is; only the condensation stage merges them.
//!
//! Construction validates every endpoint and weight, so downstream stages
//! can index adjacency lists without re-checking bounds.
//!
//! ## Fingerprint
//!
//! [`GraphView::content_hash`] is a BLAKE3 digest over `n` and the edges in
//! adjacency order: grouped by source vertex, insertion order within each
//! source. Two edge lists that build the same view share a fingerprint. Reports print it so two runs over the same dataset
//! can be matched up.

#![allow(clippy::module_name_repetitions)]

use std::ops::Range;

use crate::error::GraphError;

/// Vertex identifier in `0..n`.
pub type Vertex = usize;

/// A weighted directed edge `u -> v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub u: Vertex,
    pub v: Vertex,
    pub w: f64,
}

impl Edge {
    #[must_use]
    pub const fn new(u: Vertex, v: Vertex, w: f64) -> Self {
        Self { u, v, w }
    }
}

impl From<(Vertex, Vertex, f64)> for Edge {
    fn from((u, v, w): (Vertex, Vertex, f64)) -> Self {
        Self { u, v, w }
    }
}

/// Read-only adjacency representation of a weighted directed graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphView {
    adjacency: Vec<Vec<(Vertex, f64)>>,
    edge_count: usize,
}

impl GraphView {
    /// A graph with `n` vertices and no edges.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            edge_count: 0,
        }
    }

    /// Build a graph from `n` and an edge list.
    ///
    /// Edges keep their relative order inside each vertex's successor list.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EdgeOutOfRange`] when an endpoint is not in
    /// `0..n` and [`GraphError::NonFiniteWeight`] for NaN or infinite weights.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (Vertex, Vertex, f64)>,
    {
        let mut graph = Self::empty(n);

        for (u, v, w) in edges {
            if u >= n || v >= n {
                return Err(GraphError::EdgeOutOfRange { u, v, n });
            }
            if !w.is_finite() {
                return Err(GraphError::NonFiniteWeight { u, v, w });
            }
            graph.adjacency[u].push((v, w));
            graph.edge_count += 1;
        }

        Ok(graph)
    }

    /// Build a graph whose edges are already known to be in range.
    pub(crate) fn from_adjacency(adjacency: Vec<Vec<(Vertex, f64)>>) -> Self {
        let edge_count = adjacency.iter().map(Vec::len).sum();
        Self {
            adjacency,
            edge_count,
        }
    }

    /// Number of vertices `n`.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges, counting parallel edges separately.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Return `true` when the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// The vertex range `0..n`.
    #[must_use]
    pub fn vertices(&self) -> Range<Vertex> {
        0..self.adjacency.len()
    }

    /// Return `true` if `v` is a vertex of this graph.
    #[must_use]
    pub fn contains(&self, v: Vertex) -> bool {
        v < self.adjacency.len()
    }

    /// Outgoing `(target, weight)` pairs of `v`, in insertion order.
    ///
    /// Out-of-range vertices have no successors.
    #[must_use]
    pub fn successors(&self, v: Vertex) -> &[(Vertex, f64)] {
        self.adjacency.get(v).map_or(&[], Vec::as_slice)
    }

    /// Return `true` if at least one edge `u -> v` exists.
    #[must_use]
    pub fn has_edge(&self, u: Vertex, v: Vertex) -> bool {
        self.successors(u).iter().any(|&(t, _)| t == v)
    }

    /// All edges, grouped by source vertex.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, out)| out.iter().map(move |&(v, w)| Edge { u, v, w }))
    }

    /// Check that `v` is a vertex, naming it in the error otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::VertexOutOfRange`] if `v >= n`.
    pub fn check_vertex(&self, v: Vertex) -> Result<(), GraphError> {
        if self.contains(v) {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex: v,
                n: self.vertex_count(),
            })
        }
    }

    /// BLAKE3 fingerprint of `n` and the edges in [`Self::edges`] order.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.vertex_count() as u64).to_le_bytes());
        for edge in self.edges() {
            hasher.update(&(edge.u as u64).to_le_bytes());
            hasher.update(&(edge.v as u64).to_le_bytes());
            hasher.update(&edge.w.to_bits().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_no_vertices() {
        let g = GraphView::empty(0);
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.vertices().count(), 0);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let g = GraphView::from_edges(2, [(0, 1, 1.0), (0, 1, 2.0)]).expect("valid graph");
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.successors(0), &[(1, 1.0), (1, 2.0)]);
        assert!(g.has_edge(0, 1));
        assert!(!g.has_edge(1, 0));
    }

    #[test]
    fn out_of_range_endpoint_is_rejected() {
        let err = GraphView::from_edges(2, [(0, 2, 1.0)]).expect_err("endpoint 2 is invalid");
        assert_eq!(err, GraphError::EdgeOutOfRange { u: 0, v: 2, n: 2 });
    }

    #[test]
    fn nan_weight_is_rejected() {
        let err = GraphView::from_edges(2, [(0, 1, f64::NAN)]).expect_err("NaN weight");
        assert!(matches!(err, GraphError::NonFiniteWeight { u: 0, v: 1, .. }));
    }

    #[test]
    fn successors_of_unknown_vertex_is_empty() {
        let g = GraphView::empty(1);
        assert!(g.successors(7).is_empty());
        assert!(g.check_vertex(0).is_ok());
        assert_eq!(
            g.check_vertex(7),
            Err(GraphError::VertexOutOfRange { vertex: 7, n: 1 })
        );
    }

    #[test]
    fn edges_iterates_in_source_order() {
        let g = GraphView::from_edges(3, [(2, 0, 1.0), (0, 1, 2.0), (0, 2, 3.0)])
            .expect("valid graph");
        let edges: Vec<_> = g.edges().map(|e| (e.u, e.v)).collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (2, 0)]);
    }

    #[test]
    fn content_hash_tracks_edges_and_weights() {
        let a = GraphView::from_edges(2, [(0, 1, 1.0)]).expect("valid graph");
        let b = GraphView::from_edges(2, [(0, 1, 1.0)]).expect("valid graph");
        let c = GraphView::from_edges(2, [(0, 1, 1.5)]).expect("valid graph");
        let d = GraphView::from_edges(3, [(0, 1, 1.0)]).expect("valid graph");

        assert!(a.content_hash().starts_with("blake3:"));
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
        assert_ne!(a.content_hash(), d.content_hash());
    }

    #[test]
    fn content_hash_follows_adjacency_order() {
        let base = GraphView::from_edges(3, [(0, 1, 1.0), (0, 2, 2.0), (2, 0, 3.0)])
            .expect("valid graph");
        let across_sources = GraphView::from_edges(3, [(2, 0, 3.0), (0, 1, 1.0), (0, 2, 2.0)])
            .expect("valid graph");
        let within_source = GraphView::from_edges(3, [(0, 2, 2.0), (0, 1, 1.0), (2, 0, 3.0)])
            .expect("valid graph");

        assert_eq!(base.content_hash(), across_sources.content_hash());
        assert_ne!(base.content_hash(), within_source.content_hash());
    }
}
