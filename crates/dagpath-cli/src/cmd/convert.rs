//! `dagpath convert`: turn a legacy edge array into the current format.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dagpath_core::error::ErrorCode;
use dagpath_core::graph::Vertex;
use dagpath_core::model::convert_legacy;
use serde::Serialize;

use crate::output::{OutputMode, render};

/// Arguments for `dagpath convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Legacy JSON file: an array of `{from, to, weight}` objects.
    pub input: PathBuf,

    /// Where to write the converted graph.
    pub output: PathBuf,

    /// Source vertex to record in the converted graph.
    #[arg(long, default_value_t = 0)]
    pub source: Vertex,
}

#[derive(Debug, Serialize)]
struct Converted {
    input: String,
    output: String,
    n: usize,
    edges: usize,
    source: Vertex,
}

/// Execute `dagpath convert`.
pub fn run_convert(args: &ConvertArgs, output: OutputMode) -> Result<()> {
    let data = convert_legacy(&args.input, &args.output, args.source)
        .context(ErrorCode::GraphLoadFailed)?;

    let converted = Converted {
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        n: data.n,
        edges: data.edges.len(),
        source: data.source,
    };

    render(output, &converted, |c, w| {
        writeln!(
            w,
            "Converted {} -> {} (n={}, edges={})",
            c.input, c.output, c.n, c.edges
        )?;
        Ok::<(), io::Error>(())
    })
}
