//! Text and JSON rendering of one analyzed dataset.

use std::io::{self, Write};

use dagpath_core::Analysis;
use dagpath_core::metrics::Metrics;
use serde::Serialize;
use serde_json::{Value, json};

use crate::output::{pretty_kv, pretty_section};

/// One dataset plus its analysis, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub dataset: &'a str,
    pub weight_model: &'a str,
    pub analysis: &'a Analysis,
}

/// One-line result for `dagpath run`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub dataset: String,
    pub vertices: usize,
    pub edges: usize,
    pub components: usize,
    pub cyclic_components: usize,
    pub reachable: Option<usize>,
    pub critical_length: Option<f64>,
    pub critical_path: Option<Vec<usize>>,
}

impl Report<'_> {
    pub fn summary(&self) -> Summary {
        let a = self.analysis;
        Summary {
            dataset: self.dataset.to_string(),
            vertices: a.vertex_count,
            edges: a.edge_count,
            components: a.components.len(),
            cyclic_components: a.cyclic_component_count(),
            reachable: a.paths.as_ref().map(|p| p.shortest.reachable_count()),
            critical_length: a.paths.as_ref().map(|p| p.critical_path.length),
            critical_path: a.paths.as_ref().map(|p| p.critical_path.path.clone()),
        }
    }

    /// Render the full text report.
    pub fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        let a = self.analysis;

        pretty_kv(w, "Dataset", self.dataset)?;
        pretty_kv(w, "Vertices", a.vertex_count.to_string())?;
        pretty_kv(w, "Edges", a.edge_count.to_string())?;
        pretty_kv(w, "Source", a.source.to_string())?;
        pretty_kv(w, "Weight Model", self.weight_model)?;
        pretty_kv(w, "Fingerprint", &a.fingerprint)?;

        writeln!(w)?;
        pretty_section(w, "SCC Results")?;
        pretty_kv(w, "Components", a.components.len().to_string())?;
        pretty_kv(w, "Cyclic components", a.cyclic_component_count().to_string())?;
        pretty_kv(w, "Largest component", a.largest_component().to_string())?;
        for (idx, component) in a.components.iter().enumerate() {
            writeln!(
                w,
                "  SCC {idx}: {} (size: {})",
                join(component.iter(), ", "),
                component.len()
            )?;
        }

        writeln!(w)?;
        pretty_section(w, "Condensation")?;
        pretty_kv(w, "Nodes", a.condensation.component_count().to_string())?;
        pretty_kv(w, "Edges", a.condensation.edge_count().to_string())?;
        for edge in a.condensation.graph.edges() {
            writeln!(w, "  C{} -> C{} (w={:.2})", edge.u, edge.v, edge.w)?;
        }

        writeln!(w)?;
        pretty_section(w, "Topological Order")?;
        match &a.component_order {
            Ok(order) => {
                pretty_kv(w, "Component order", join(order.iter(), " "))?;
                pretty_kv(w, "Vertex order", join(a.vertex_order.iter(), " "))?;
            }
            Err(err) => pretty_kv(w, "Not available", err.to_string())?,
        }

        writeln!(w)?;
        pretty_section(w, "Shortest Paths")?;
        match &a.paths {
            Some(paths) => {
                for (v, d) in paths.shortest.as_slice().iter().enumerate() {
                    if d.is_finite() {
                        writeln!(w, "  Vertex {v}: {d:.2}")?;
                    } else {
                        writeln!(w, "  Vertex {v}: unreachable")?;
                    }
                }
                pretty_kv(
                    w,
                    "Reachable",
                    format!("{}/{}", paths.shortest.reachable_count(), paths.shortest.len()),
                )?;
            }
            None => writeln!(w, "  (skipped)")?,
        }

        writeln!(w)?;
        pretty_section(w, "Critical Path")?;
        match &a.paths {
            Some(paths) => {
                let critical = &paths.critical_path;
                pretty_kv(w, "Target", critical.target.to_string())?;
                pretty_kv(w, "Length", format!("{:.2}", critical.length))?;
                pretty_kv(w, "Path", join(critical.path.iter(), " -> "))?;
            }
            None => writeln!(w, "  (skipped)")?,
        }

        writeln!(w)?;
        pretty_section(w, "Metrics")?;
        for stage in &a.stages {
            writeln!(w, "[{}]", stage.name)?;
            write!(w, "{}", stage.metrics.summary())?;
        }

        Ok(())
    }

    /// Render the report as JSON. Unreached distances are `null`.
    pub fn to_json(&self) -> Value {
        let a = self.analysis;

        let condensation_edges: Vec<Value> = a
            .condensation
            .graph
            .edges()
            .map(|e| json!({ "from": e.u, "to": e.v, "w": e.w }))
            .collect();

        let order = match &a.component_order {
            Ok(order) => json!({ "components": order, "vertices": a.vertex_order, "error": null }),
            Err(err) => json!({ "components": null, "vertices": [], "error": err.to_string() }),
        };

        let metrics: serde_json::Map<String, Value> = a
            .stages
            .iter()
            .map(|stage| (stage.name.to_string(), stage.metrics.to_json()))
            .collect();

        json!({
            "dataset": self.dataset,
            "vertices": a.vertex_count,
            "edges": a.edge_count,
            "source": a.source,
            "weight_model": self.weight_model,
            "fingerprint": a.fingerprint,
            "scc": {
                "count": a.components.len(),
                "cyclic": a.cyclic_component_count(),
                "largest": a.largest_component(),
                "components": a.components,
            },
            "condensation": {
                "nodes": a.condensation.component_count(),
                "edges": condensation_edges,
            },
            "topological_order": order,
            "shortest_paths": a.paths.as_ref().map(|p| &p.shortest),
            "longest_paths": a.paths.as_ref().map(|p| &p.longest),
            "critical_path": a.paths.as_ref().map(|p| &p.critical_path),
            "metrics": metrics,
        })
    }
}

/// Render a summary line for `dagpath run`.
pub fn write_summary_line(summary: &Summary, w: &mut dyn Write) -> io::Result<()> {
    write!(
        w,
        "{}: n={} m={} sccs={} cyclic={}",
        summary.dataset,
        summary.vertices,
        summary.edges,
        summary.components,
        summary.cyclic_components
    )?;
    match (&summary.critical_length, &summary.critical_path) {
        (Some(length), Some(path)) => {
            writeln!(w, " critical={length:.2} path={}", join(path.iter(), "->"))
        }
        _ => writeln!(w, " paths=skipped"),
    }
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}
