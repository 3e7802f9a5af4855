#![forbid(unsafe_code)]
//! dagpath-core library.
//!
//! Directed-graph analysis in four stages: strongly connected components
//! ([`scc`]), condensation ([`condense`]), topological ordering ([`topo`]),
//! and single-source shortest/longest paths over that order ([`paths`]).
//! [`pipeline::analyze`] chains them.
//!
//! # Conventions
//!
//! - **Errors**: [`error::GraphError`] (`thiserror`) for rejected graph
//!   input; `anyhow::Result` for file and config I/O.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Metrics**: every stage has a `*_with` variant taking a
//!   [`metrics::Metrics`] observer.

pub mod condense;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod paths;
pub mod pipeline;
pub mod scc;
pub mod topo;

pub use condense::{CondensationGraph, build_condensation};
pub use error::GraphError;
pub use graph::{Edge, GraphView, Vertex};
pub use paths::{
    CriticalPathResult, DistanceVector, PathSense, find_critical_path, longest_paths,
    reconstruct_path, shortest_paths,
};
pub use pipeline::{Analysis, analyze};
pub use scc::{Component, find_sccs};
pub use topo::{expand_order, topological_sort};
