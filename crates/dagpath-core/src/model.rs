//! On-disk graph format.
//!
//! A graph file is a single JSON object:
//!
//! ```json
//! { "directed": true, "n": 4, "source": 0, "weight_model": "edge",
//!   "edges": [{ "u": 0, "v": 1, "w": 2.5 }] }
//! ```
//!
//! Edge objects also accept the legacy field names `from`, `to`, and
//! `weight`. Legacy files that hold only a bare edge array go through
//! [`convert_legacy`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GraphError;
use crate::graph::{GraphView, Vertex};

/// Weight model written by the converter and the generator.
pub const EDGE_WEIGHT_MODEL: &str = "edge";

/// One serialized edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(alias = "from")]
    pub u: Vertex,
    #[serde(alias = "to")]
    pub v: Vertex,
    #[serde(alias = "weight")]
    pub w: f64,
}

impl EdgeData {
    #[must_use]
    pub const fn new(u: Vertex, v: Vertex, w: f64) -> Self {
        Self { u, v, w }
    }
}

/// A serialized graph plus its analysis source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default = "default_directed")]
    pub directed: bool,
    pub n: usize,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    #[serde(default)]
    pub source: Vertex,
    #[serde(default = "default_weight_model")]
    pub weight_model: String,
}

impl GraphData {
    /// A directed graph with the `edge` weight model.
    #[must_use]
    pub fn directed(n: usize, edges: Vec<EdgeData>, source: Vertex) -> Self {
        Self {
            directed: true,
            n,
            edges,
            source,
            weight_model: EDGE_WEIGHT_MODEL.to_string(),
        }
    }

    /// Validate and build the in-memory adjacency view.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Undirected`] when `directed` is false.
    /// - [`GraphError::EdgeOutOfRange`] / [`GraphError::NonFiniteWeight`]
    ///   for a bad edge.
    /// - [`GraphError::VertexOutOfRange`] when `n > 0` and `source >= n`.
    pub fn to_view(&self) -> Result<GraphView, GraphError> {
        if !self.directed {
            return Err(GraphError::Undirected);
        }
        let view = GraphView::from_edges(self.n, self.edges.iter().map(|e| (e.u, e.v, e.w)))?;
        if self.n > 0 {
            view.check_vertex(self.source)?;
        }
        Ok(view)
    }
}

/// Read a graph file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a graph object.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_graph(path: &Path) -> Result<GraphData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file {}", path.display()))?;
    let data: GraphData = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse graph file {}", path.display()))?;
    debug!(n = data.n, edges = data.edges.len(), "loaded graph");
    Ok(data)
}

/// Write a graph file as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn save_graph(data: &GraphData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize graph")?;
    fs::write(path, json).with_context(|| format!("Failed to write graph file {}", path.display()))
}

/// Convert a bare legacy edge array into the current graph format.
///
/// The vertex count is one more than the largest endpoint. The converted
/// graph is written to `output` and returned.
///
/// # Errors
///
/// Returns an error if `input` cannot be read, holds no edges, does not
/// validate (e.g. `source` outside the inferred vertex range), or `output`
/// cannot be written. Nothing is written for an invalid graph.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn convert_legacy(input: &Path, output: &Path, source: Vertex) -> Result<GraphData> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read legacy file {}", input.display()))?;
    let edges: Vec<EdgeData> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse legacy edge array {}", input.display()))?;

    let Some(max_vertex) = edges.iter().map(|e| e.u.max(e.v)).max() else {
        bail!("Legacy file {} holds no edges", input.display());
    };

    let data = GraphData::directed(max_vertex + 1, edges, source);
    data.to_view()
        .with_context(|| format!("Legacy file {} is not a valid graph", input.display()))?;
    save_graph(&data, output)?;
    debug!(n = data.n, edges = data.edges.len(), "converted legacy graph");
    Ok(data)
}

const fn default_directed() -> bool {
    true
}

fn default_weight_model() -> String {
    EDGE_WEIGHT_MODEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_format() {
        let json = r#"{"directed":true,"n":3,"edges":[{"u":0,"v":1,"w":2.0},{"u":1,"v":2,"w":1.5}],"source":0,"weight_model":"edge"}"#;
        let data: GraphData = serde_json::from_str(json).expect("parse");
        assert_eq!(data.n, 3);
        assert_eq!(data.edges[1], EdgeData::new(1, 2, 1.5));

        let view = data.to_view().expect("valid");
        assert_eq!(view.edge_count(), 2);
    }

    #[test]
    fn legacy_edge_names_are_accepted() {
        let json = r#"{"n":2,"edges":[{"from":0,"to":1,"weight":4}]}"#;
        let data: GraphData = serde_json::from_str(json).expect("parse");
        assert!(data.directed);
        assert_eq!(data.weight_model, "edge");
        assert_eq!(data.edges, vec![EdgeData::new(0, 1, 4.0)]);
    }

    #[test]
    fn undirected_input_is_rejected() {
        let mut data = GraphData::directed(2, vec![EdgeData::new(0, 1, 1.0)], 0);
        data.directed = false;
        assert_eq!(data.to_view(), Err(GraphError::Undirected));
    }

    #[test]
    fn source_must_be_in_range_for_non_empty_graphs() {
        let data = GraphData::directed(2, vec![], 2);
        assert_eq!(
            data.to_view(),
            Err(GraphError::VertexOutOfRange { vertex: 2, n: 2 })
        );

        let empty = GraphData::directed(0, vec![], 0);
        assert!(empty.to_view().expect("empty is valid").is_empty());
    }

    #[test]
    fn edge_out_of_range_is_rejected() {
        let data = GraphData::directed(2, vec![EdgeData::new(0, 5, 1.0)], 0);
        assert_eq!(
            data.to_view(),
            Err(GraphError::EdgeOutOfRange { u: 0, v: 5, n: 2 })
        );
    }

    #[test]
    fn save_then_load_preserves_graph() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/graph.json");
        let data = GraphData::directed(3, vec![EdgeData::new(0, 2, 7.25)], 1);

        save_graph(&data, &path).expect("save");
        assert_eq!(load_graph(&path).expect("load"), data);
    }

    #[test]
    fn load_reports_the_path_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");
        let err = load_graph(&path).expect_err("missing file");
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn convert_legacy_infers_vertex_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("old.json");
        let output = dir.path().join("new.json");
        fs::write(
            &input,
            r#"[{"from":0,"to":3,"weight":1.0},{"from":3,"to":1,"weight":2.0}]"#,
        )
        .expect("write");

        let data = convert_legacy(&input, &output, 0).expect("convert");
        assert_eq!(data.n, 4);
        assert_eq!(data.weight_model, "edge");
        assert_eq!(load_graph(&output).expect("load"), data);
    }

    #[test]
    fn convert_legacy_rejects_empty_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("old.json");
        fs::write(&input, "[]").expect("write");

        let err = convert_legacy(&input, &dir.path().join("new.json"), 0).expect_err("empty");
        assert!(err.to_string().contains("no edges"));
    }

    #[test]
    fn convert_legacy_rejects_source_beyond_inferred_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("old.json");
        let output = dir.path().join("new.json");
        fs::write(&input, r#"[{"from":0,"to":2,"weight":1.0}]"#).expect("write");

        let err = convert_legacy(&input, &output, 3).expect_err("source out of range");
        let graph_err = err.chain().find_map(|e| e.downcast_ref::<GraphError>());
        assert_eq!(
            graph_err,
            Some(&GraphError::VertexOutOfRange { vertex: 3, n: 3 })
        );
        assert!(!output.exists());
    }
}
