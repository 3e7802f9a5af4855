//! The standard nine-dataset catalog.

use std::path::{Path, PathBuf};

use anyhow::Result;
use dagpath_core::model::{GraphData, save_graph};
use tracing::{debug, info};

use crate::generator::{DatasetGenerator, GeneratorConfig, GraphShape};

/// One named catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub config: GeneratorConfig,
}

impl DatasetSpec {
    const fn new(
        name: &'static str,
        vertices: usize,
        density: f64,
        shape: GraphShape,
        source: usize,
    ) -> Self {
        Self {
            name,
            config: GeneratorConfig::new(vertices, density, shape, source),
        }
    }

    /// `<dir>/<name>.json`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", self.name))
    }
}

/// Small (6-10 vertices), medium (10-20), and large (20-50) datasets, three
/// of each, in generation order.
#[must_use]
pub fn standard_catalog() -> Vec<DatasetSpec> {
    use GraphShape::{Cyclic, Dag, MultiScc};

    vec![
        DatasetSpec::new("small_1", 8, 0.3, Dag, 0),
        DatasetSpec::new("small_2", 10, 0.4, Cyclic, 0),
        DatasetSpec::new("small_3", 7, 0.35, MultiScc, 0),
        DatasetSpec::new("medium_1", 15, 0.25, Dag, 0),
        DatasetSpec::new("medium_2", 18, 0.3, MultiScc, 2),
        DatasetSpec::new("medium_3", 12, 0.35, Cyclic, 1),
        DatasetSpec::new("large_1", 30, 0.2, Dag, 0),
        DatasetSpec::new("large_2", 40, 0.25, MultiScc, 5),
        DatasetSpec::new("large_3", 25, 0.3, Cyclic, 3),
    ]
}

/// Generate every catalog dataset from one seeded stream.
///
/// # Errors
///
/// Returns an error if a catalog entry is invalid.
pub fn build_catalog(seed: u64) -> Result<Vec<(&'static str, GraphData)>> {
    let mut generator = DatasetGenerator::new(seed);
    standard_catalog()
        .into_iter()
        .map(|spec| Ok((spec.name, generator.generate(&spec.config)?)))
        .collect()
}

/// Generate the catalog and write each dataset to `<dir>/<name>.json`.
/// Returns the written paths in catalog order.
///
/// # Errors
///
/// Returns an error if a dataset cannot be generated or written.
pub fn generate_catalog(dir: &Path, seed: u64) -> Result<Vec<PathBuf>> {
    write_datasets(dir, seed, |_, _| true)
}

/// Write only the catalog datasets named in `names` whose file is absent.
///
/// Existing files are left untouched and names outside the catalog are
/// skipped. Datasets come from the same seeded stream as
/// [`generate_catalog`], so a partially generated directory matches a full
/// one. Returns the written paths in catalog order.
///
/// # Errors
///
/// Returns an error if a dataset cannot be generated or written.
pub fn generate_missing(dir: &Path, seed: u64, names: &[String]) -> Result<Vec<PathBuf>> {
    write_datasets(dir, seed, |spec, path| {
        names.iter().any(|name| name == spec.name) && !path.exists()
    })
}

fn write_datasets(
    dir: &Path,
    seed: u64,
    mut wanted: impl FnMut(&DatasetSpec, &Path) -> bool,
) -> Result<Vec<PathBuf>> {
    let specs = standard_catalog();
    let datasets = build_catalog(seed)?;

    let mut written = Vec::new();
    for (spec, (_, data)) in specs.iter().zip(datasets) {
        let path = spec.path_in(dir);
        if !wanted(spec, &path) {
            debug!(dataset = spec.name, path = %path.display(), "skipping dataset");
            continue;
        }
        save_graph(&data, &path)?;
        info!(
            dataset = spec.name,
            vertices = data.n,
            edges = data.edges.len(),
            path = %path.display(),
            "wrote dataset"
        );
        written.push(path);
    }
    Ok(written)
}
