use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::metrics::is_truthy;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "dagpath.toml";

/// Seed used by the dataset generator when nothing else is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Names of the standard dataset catalog, in processing order.
pub const STANDARD_DATASETS: [&str; 9] = [
    "small_1", "small_2", "small_3", "medium_1", "medium_2", "medium_3", "large_1", "large_2",
    "large_3",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub generator: GeneratorSection,
    /// Preferred output mode (`pretty`, `text`, `json`).
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_datasets")]
    pub datasets: Vec<String>,
    #[serde(default = "default_true")]
    pub generate_missing: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            datasets: default_datasets(),
            generate_missing: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Load `dagpath.toml`.
///
/// With `explicit = None` the file is looked up in the working directory and
/// a missing file yields the defaults. An explicit path must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_config_file(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<Config>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the output mode: `--json` flag, then `FORMAT` env, then config,
/// then `pretty` on a terminal and `text` otherwise.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    config_output: Option<&str>,
    env_format: Option<&str>,
) -> &'static str {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = config_output.and_then(normalize_output_mode) {
        return mode;
    }

    if std::io::stdout().is_terminal() {
        "pretty"
    } else {
        "text"
    }
}

/// Timing is on when `--timing` was passed or `DAGPATH_TIMING` is truthy.
#[must_use]
pub fn timing_enabled(cli_flag: bool, env_value: Option<&str>) -> bool {
    cli_flag || env_value.is_some_and(is_truthy)
}

const fn default_true() -> bool {
    true
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_datasets() -> Vec<String> {
    STANDARD_DATASETS.iter().map(ToString::to_string).collect()
}
