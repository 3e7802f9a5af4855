#![forbid(unsafe_code)]
//! dagpath-sim library.
//!
//! Seeded random graph datasets for exercising the analysis pipeline.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod catalog;
pub mod generator;

pub use catalog::{DatasetSpec, build_catalog, generate_catalog, generate_missing, standard_catalog};
pub use generator::{DatasetGenerator, GeneratorConfig, GraphShape};
