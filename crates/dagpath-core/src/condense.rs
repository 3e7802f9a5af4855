//! Collapse strongly connected components into a condensation DAG.
//!
//! # Overview
//!
//! Each component becomes one node, numbered by its position in the
//! component list. Every original edge is scanned once:
//!
//! - both endpoints in the same component → dropped (no self-loops);
//! - endpoints in different components → one edge between the two
//!   component nodes, added the first time that ordered pair is seen.
//!
//! The result is acyclic because two distinct SCCs can never lie on a common
//! cycle. [`CondensationGraph::is_acyclic`] re-checks it for tests.
//!
//! A condensation edge carries the weight of the first original edge that
//! produced it.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use crate::error::{GraphError, PartitionProblem};
use crate::graph::{GraphView, Vertex};
use crate::metrics::{Metrics, NoopMetrics};
use crate::scc::Component;
use crate::topo::topological_sort;

/// The condensation of a graph plus the vertex → component mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensationGraph {
    /// DAG over component indices `0..k`.
    pub graph: GraphView,
    /// `vertex_to_component[v]` is the index of the component holding `v`.
    pub vertex_to_component: Vec<usize>,
}

impl CondensationGraph {
    /// Number of component nodes.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Number of deduplicated inter-component edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Component index of an original vertex.
    #[must_use]
    pub fn component_of(&self, v: Vertex) -> Option<usize> {
        self.vertex_to_component.get(v).copied()
    }

    /// Return `true` if the condensation admits a topological order.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        topological_sort(&self.graph).is_ok()
    }
}

/// Build the condensation of `graph` from its component partition.
///
/// # Errors
///
/// Returns [`GraphError::InvalidPartition`] when `components` is not a
/// partition of `graph`'s vertices.
pub fn build_condensation(
    graph: &GraphView,
    components: &[Component],
) -> Result<CondensationGraph, GraphError> {
    build_condensation_with(graph, components, &mut NoopMetrics)
}

/// [`build_condensation`], reporting `condensation_edges` to `metrics`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidPartition`] when `components` is not a
/// partition of `graph`'s vertices.
pub fn build_condensation_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    components: &[Component],
    metrics: &mut M,
) -> Result<CondensationGraph, GraphError> {
    metrics.start();

    let vertex_to_component = match component_map(graph.vertex_count(), components) {
        Ok(map) => map,
        Err(err) => {
            metrics.stop();
            return Err(err);
        }
    };

    let mut adjacency: Vec<Vec<(Vertex, f64)>> = vec![Vec::new(); components.len()];
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for edge in graph.edges() {
        let from = vertex_to_component[edge.u];
        let to = vertex_to_component[edge.v];
        if from != to && seen.insert((from, to)) {
            adjacency[from].push((to, edge.w));
            metrics.increment("condensation_edges");
        }
    }

    metrics.stop();
    Ok(CondensationGraph {
        graph: GraphView::from_adjacency(adjacency),
        vertex_to_component,
    })
}

/// Map each vertex to its component, verifying the partition.
fn component_map(n: usize, components: &[Component]) -> Result<Vec<usize>, GraphError> {
    let mut map: Vec<Option<usize>> = vec![None; n];

    for (idx, component) in components.iter().enumerate() {
        if component.is_empty() {
            return Err(GraphError::InvalidPartition {
                vertex: idx,
                problem: PartitionProblem::EmptyComponent,
            });
        }
        for v in component.iter() {
            let Some(slot) = map.get_mut(v) else {
                return Err(GraphError::InvalidPartition {
                    vertex: v,
                    problem: PartitionProblem::OutOfRange,
                });
            };
            if slot.is_some() {
                return Err(GraphError::InvalidPartition {
                    vertex: v,
                    problem: PartitionProblem::Duplicated,
                });
            }
            *slot = Some(idx);
        }
    }

    map.into_iter()
        .enumerate()
        .map(|(v, slot)| {
            slot.ok_or(GraphError::InvalidPartition {
                vertex: v,
                problem: PartitionProblem::Missing,
            })
        })
        .collect()
}
