//! End-to-end analysis: SCC → condensation → order → paths.
//!
//! [`analyze`] runs every stage with its own [`SimpleMetrics`] and collects
//! the results a report needs. The topological order of the condensation
//! is expanded back to original vertices, and the path stages run on the
//! original graph along that order. See [`crate::paths`] for what that
//! means when a component reachable from the source has more than one
//! vertex.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::condense::{CondensationGraph, build_condensation_with};
use crate::error::GraphError;
use crate::graph::{GraphView, Vertex};
use crate::metrics::{Metrics, SimpleMetrics};
use crate::paths::{
    CriticalPathResult, DistanceVector, find_critical_path, longest_paths_with,
    shortest_paths_with,
};
use crate::scc::{Component, find_sccs_with};
use crate::topo::{expand_order, topological_sort_with};

/// Stage names in execution order, as they appear in reports and timing.
pub const STAGES: [&str; 5] = ["scc", "condense", "topo", "shortest", "longest"];

/// Metrics captured for one pipeline stage.
#[derive(Debug, Clone)]
pub struct StageMetrics {
    pub name: &'static str,
    pub metrics: SimpleMetrics,
}

/// Path results from the source. Absent for an empty graph or when the
/// condensation could not be ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResults {
    pub shortest: DistanceVector,
    pub longest: DistanceVector,
    pub critical_path: CriticalPathResult,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub source: Vertex,
    /// BLAKE3 fingerprint of the input graph.
    pub fingerprint: String,
    pub components: Vec<Component>,
    pub condensation: CondensationGraph,
    /// Topological order of component indices, or why there is none.
    pub component_order: Result<Vec<usize>, GraphError>,
    /// `component_order` expanded to original vertices.
    pub vertex_order: Vec<Vertex>,
    pub paths: Option<PathResults>,
    pub stages: Vec<StageMetrics>,
}

impl Analysis {
    /// Number of components with more than one vertex.
    #[must_use]
    pub fn cyclic_component_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_cycle()).count()
    }

    /// Size of the largest component (zero for an empty graph).
    #[must_use]
    pub fn largest_component(&self) -> usize {
        self.components.iter().map(Component::len).max().unwrap_or(0)
    }

    /// Metrics recorded for the stage called `name`.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&SimpleMetrics> {
        self.stages
            .iter()
            .find(|stage| stage.name == name)
            .map(|stage| &stage.metrics)
    }

    /// `(stage, elapsed)` pairs for a timing report.
    pub fn timing_samples(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.stages
            .iter()
            .map(|stage| (stage.name, stage.metrics.elapsed()))
    }
}

/// Run the full pipeline on `graph` from `source`.
///
/// # Errors
///
/// Returns [`GraphError::VertexOutOfRange`] when `graph` is non-empty and
/// `source` is not one of its vertices. A cyclic condensation is not an
/// error: it is recorded in [`Analysis::component_order`] and the path
/// stages are skipped.
#[instrument(skip(graph), fields(n = graph.vertex_count(), m = graph.edge_count()))]
pub fn analyze(graph: &GraphView, source: Vertex) -> Result<Analysis, GraphError> {
    if !graph.is_empty() {
        graph.check_vertex(source)?;
    }

    let mut stages = Vec::with_capacity(STAGES.len());

    let mut scc_metrics = SimpleMetrics::new();
    let components = find_sccs_with(graph, &mut scc_metrics);
    debug!(components = components.len(), "scc stage done");
    stages.push(StageMetrics {
        name: "scc",
        metrics: scc_metrics,
    });

    let mut condense_metrics = SimpleMetrics::new();
    let condensation = build_condensation_with(graph, &components, &mut condense_metrics)?;
    debug!(
        nodes = condensation.component_count(),
        edges = condensation.edge_count(),
        "condense stage done"
    );
    stages.push(StageMetrics {
        name: "condense",
        metrics: condense_metrics,
    });

    let mut topo_metrics = SimpleMetrics::new();
    let component_order = topological_sort_with(&condensation.graph, &mut topo_metrics);
    stages.push(StageMetrics {
        name: "topo",
        metrics: topo_metrics,
    });

    let vertex_order = match &component_order {
        Ok(order) => {
            debug!(components = order.len(), "topo stage done");
            expand_order(order, &components)
        }
        Err(err) => {
            warn!(error = %err, "condensation could not be ordered; skipping path stages");
            Vec::new()
        }
    };

    let paths = if component_order.is_ok() && !graph.is_empty() {
        let mut shortest_metrics = SimpleMetrics::new();
        let shortest = shortest_paths_with(graph, &vertex_order, source, &mut shortest_metrics)?;
        stages.push(StageMetrics {
            name: "shortest",
            metrics: shortest_metrics,
        });

        let mut longest_metrics = SimpleMetrics::new();
        let longest = longest_paths_with(graph, &vertex_order, source, &mut longest_metrics)?;
        stages.push(StageMetrics {
            name: "longest",
            metrics: longest_metrics,
        });

        let critical_path = find_critical_path(graph, &vertex_order, source)?;
        debug!(
            reachable = shortest.reachable_count(),
            critical_length = critical_path.length,
            "path stages done"
        );

        Some(PathResults {
            shortest,
            longest,
            critical_path,
        })
    } else {
        None
    };

    Ok(Analysis {
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        source,
        fingerprint: graph.content_hash(),
        components,
        condensation,
        component_order,
        vertex_order,
        paths,
        stages,
    })
}
