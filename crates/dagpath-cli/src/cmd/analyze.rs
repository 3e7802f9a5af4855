//! `dagpath analyze`: run the pipeline on one graph file.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dagpath_core::error::ErrorCode;
use dagpath_core::graph::Vertex;
use dagpath_core::model::load_graph;

use crate::cmd::analyze_graph;
use crate::output::OutputMode;
use crate::report::Report;

/// Arguments for `dagpath analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Graph file in dagpath JSON format.
    pub file: PathBuf,

    /// Source vertex; defaults to the one stored in the file.
    #[arg(long)]
    pub source: Option<Vertex>,
}

/// Execute `dagpath analyze`.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode) -> Result<()> {
    let mut data = load_graph(&args.file).context(ErrorCode::GraphLoadFailed)?;
    if let Some(source) = args.source {
        data.source = source;
    }

    let name = args
        .file
        .file_stem()
        .map_or_else(|| "graph".to_string(), |s| s.to_string_lossy().into_owned());
    let analysis = analyze_graph(&name, &data)?;

    let report = Report {
        dataset: &name,
        weight_model: &data.weight_model,
        analysis: &analysis,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if output.is_json() {
        serde_json::to_writer_pretty(&mut out, &report.to_json())?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AnalyzeArgs,
    }

    #[test]
    fn analyze_args_parse_file_and_source() {
        let parsed = Wrapper::parse_from(["test", "graph.json", "--source", "3"]);
        assert_eq!(parsed.args.file, PathBuf::from("graph.json"));
        assert_eq!(parsed.args.source, Some(3));
    }

    #[test]
    fn analyze_args_source_is_optional() {
        let parsed = Wrapper::parse_from(["test", "graph.json"]);
        assert!(parsed.args.source.is_none());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let args = AnalyzeArgs {
            file: PathBuf::from("/nonexistent/graph.json"),
            source: None,
        };
        let err = run_analyze(&args, OutputMode::Text).expect_err("missing");
        assert_eq!(err.downcast_ref::<ErrorCode>(), Some(&ErrorCode::GraphLoadFailed));
    }
}
