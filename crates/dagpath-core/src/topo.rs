//! Topological ordering with Kahn's algorithm.
//!
//! Zero in-degree vertices seed a FIFO queue in ascending index order;
//! successors join the queue in the order they reach zero. The resulting
//! order is therefore deterministic for a given graph.
//!
//! A graph with a cycle leaves some vertices with positive in-degree
//! forever. That is reported as [`GraphError::CycleDetected`], the only
//! failure mode, and the caller is expected to recover from it.

use std::collections::VecDeque;

use tracing::warn;

use crate::error::GraphError;
use crate::graph::{GraphView, Vertex};
use crate::metrics::{Metrics, NoopMetrics};
use crate::scc::Component;

/// Order every vertex of `graph` so that all edges point forward.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] listing the vertices that could not
/// be ordered when `graph` is cyclic.
pub fn topological_sort(graph: &GraphView) -> Result<Vec<Vertex>, GraphError> {
    topological_sort_with(graph, &mut NoopMetrics)
}

/// [`topological_sort`], reporting `queue_pushes` and `queue_pops` to `metrics`.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] when `graph` is cyclic.
pub fn topological_sort_with<M: Metrics + ?Sized>(
    graph: &GraphView,
    metrics: &mut M,
) -> Result<Vec<Vertex>, GraphError> {
    metrics.start();

    let n = graph.vertex_count();
    let mut in_degree = vec![0_usize; n];
    for edge in graph.edges() {
        in_degree[edge.v] += 1;
    }

    let mut queue: VecDeque<Vertex> = VecDeque::new();
    for v in graph.vertices() {
        if in_degree[v] == 0 {
            queue.push_back(v);
            metrics.increment("queue_pushes");
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some(u) = queue.pop_front() {
        metrics.increment("queue_pops");
        order.push(u);

        for &(v, _) in graph.successors(u) {
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push_back(v);
                metrics.increment("queue_pushes");
            }
        }
    }

    metrics.stop();

    if order.len() == n {
        Ok(order)
    } else {
        let remaining = graph.vertices().filter(|&v| in_degree[v] > 0).collect();
        Err(GraphError::CycleDetected { remaining })
    }
}

/// Expand a component order into a vertex order.
///
/// Concatenates the members of each component, in the component's own
/// member order. Indices with no matching component are skipped.
#[must_use]
pub fn expand_order(component_order: &[usize], components: &[Component]) -> Vec<Vertex> {
    let total = components.iter().map(Component::len).sum();
    let mut vertices = Vec::with_capacity(total);

    for &idx in component_order {
        match components.get(idx) {
            Some(component) => vertices.extend(component.iter()),
            None => warn!(component = idx, "component order references unknown component"),
        }
    }

    vertices
}

/// Return `true` if every edge `u -> v` of `graph` has `u` strictly before
/// `v` in `order`, and `order` is a permutation of the vertices.
#[must_use]
pub fn is_topological_order(graph: &GraphView, order: &[Vertex]) -> bool {
    let n = graph.vertex_count();
    if order.len() != n {
        return false;
    }

    let mut position: Vec<Option<usize>> = vec![None; n];
    for (pos, &v) in order.iter().enumerate() {
        let Some(slot) = position.get_mut(v) else {
            return false;
        };
        if slot.replace(pos).is_some() {
            return false;
        }
    }

    graph
        .edges()
        .all(|edge| position[edge.u] < position[edge.v])
}
