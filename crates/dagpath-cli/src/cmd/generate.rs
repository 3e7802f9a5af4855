//! `dagpath generate`: write the standard dataset catalog.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dagpath_core::config::Config;
use dagpath_core::error::ErrorCode;
use dagpath_sim::generate_catalog;
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render};

/// Arguments for `dagpath generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Directory to write datasets into (default: `run.data_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Generator seed (default: `generator.seed`).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Generated {
    seed: u64,
    directory: String,
    files: Vec<String>,
}

/// Execute `dagpath generate`.
pub fn run_generate(args: &GenerateArgs, config: &Config, output: OutputMode) -> Result<()> {
    let dir = args.out.clone().unwrap_or_else(|| config.run.data_dir.clone());
    let seed = args.seed.unwrap_or(config.generator.seed);

    let files = generate_catalog(&dir, seed).context(ErrorCode::DatasetGenerateFailed)?;

    let generated = Generated {
        seed,
        directory: dir.display().to_string(),
        files: files.iter().map(|p| p.display().to_string()).collect(),
    };

    render(output, &generated, |g, w| {
        if output.is_pretty() {
            pretty_section(w, "Generated datasets")?;
            pretty_kv(w, "Directory", &g.directory)?;
            pretty_kv(w, "Seed", g.seed.to_string())?;
        }
        for file in &g.files {
            writeln!(w, "{file}")?;
        }
        Ok::<(), io::Error>(())
    })
}
