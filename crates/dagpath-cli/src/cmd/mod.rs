pub mod analyze;
pub mod convert;
pub mod generate;
pub mod run;

use anyhow::{Context, Result};
use dagpath_core::error::ErrorCode;
use dagpath_core::model::GraphData;
use dagpath_core::{Analysis, analyze};

use crate::timing;

/// Validate `data` and run the pipeline, recording stage timings.
pub fn analyze_graph(name: &str, data: &GraphData) -> Result<Analysis> {
    let view = data
        .to_view()
        .with_context(|| format!("Dataset {name} is not a valid graph"))?;
    let analysis = analyze(&view, data.source)
        .with_context(|| format!("Failed to analyze dataset {name}"))?;

    for (stage, elapsed) in analysis.timing_samples() {
        timing::record_sample(&format!("stage.{stage}"), elapsed);
    }
    Ok(analysis)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))
            .context(ErrorCode::ReportWriteFailed)?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
        .context(ErrorCode::ReportWriteFailed)
}
