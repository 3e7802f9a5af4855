//! `dagpath run`: analyze every configured dataset and write reports.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use dagpath_core::config::Config;
use dagpath_core::error::ErrorCode;
use dagpath_core::model::load_graph;
use dagpath_sim::generate_missing;
use tracing::{info, warn};

use crate::cmd::{analyze_graph, write_file};
use crate::output::{CliError, OutputMode, pretty_section, render, render_error};
use crate::report::{Report, Summary, write_summary_line};

/// Arguments for `dagpath run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only process this dataset; repeatable (default: `run.datasets`).
    #[arg(long = "dataset", value_name = "NAME")]
    pub datasets: Vec<String>,

    /// Directory holding `<name>.json` datasets (default: `run.data_dir`).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for reports (default: `run.output_dir`).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Execute `dagpath run`.
///
/// A failing dataset is reported and skipped; the command fails after the
/// remaining datasets have been processed.
pub fn run_run(args: &RunArgs, config: &Config, output: OutputMode) -> Result<()> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.run.data_dir.clone());
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.run.output_dir.clone());
    let datasets = if args.datasets.is_empty() {
        config.run.datasets.clone()
    } else {
        args.datasets.clone()
    };

    if config.run.generate_missing {
        let written = generate_missing(&data_dir, config.generator.seed, &datasets)
            .context(ErrorCode::DatasetGenerateFailed)?;
        if !written.is_empty() {
            info!(
                dir = %data_dir.display(),
                seed = config.generator.seed,
                count = written.len(),
                "generated missing datasets"
            );
        }
    }

    let mut summaries = Vec::with_capacity(datasets.len());
    let mut failed = 0usize;
    for name in &datasets {
        match process_dataset(name, &data_dir, &output_dir, output) {
            Ok(summary) => summaries.push(summary),
            Err(err) => {
                failed += 1;
                warn!(dataset = %name, error = %err, "dataset failed");
                render_error(output, &CliError::from_anyhow(&err))?;
            }
        }
    }

    render(output, &summaries, |summaries, w| {
        if output.is_pretty() {
            pretty_section(w, "Processed datasets")?;
        }
        for summary in summaries {
            write_summary_line(summary, w)?;
        }
        Ok::<(), io::Error>(())
    })?;

    if failed > 0 {
        bail!("{failed} of {} datasets failed", datasets.len());
    }
    Ok(())
}

fn dataset_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

fn process_dataset(
    name: &str,
    data_dir: &Path,
    output_dir: &Path,
    output: OutputMode,
) -> Result<Summary> {
    let data = load_graph(&dataset_path(data_dir, name)).context(ErrorCode::GraphLoadFailed)?;
    let analysis = analyze_graph(name, &data)?;

    let report = Report {
        dataset: name,
        weight_model: &data.weight_model,
        analysis: &analysis,
    };

    let mut text = Vec::new();
    report.write_text(&mut text)?;
    write_file(&output_dir.join(format!("{name}.txt")), &text)?;

    if output.is_json() {
        let json = serde_json::to_vec_pretty(&report.to_json())?;
        write_file(&output_dir.join(format!("{name}.json")), &json)?;
    }

    let summary = report.summary();
    info!(
        dataset = name,
        components = summary.components,
        cyclic = summary.cyclic_components,
        "dataset analyzed"
    );
    Ok(summary)
}
