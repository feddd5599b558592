#![forbid(unsafe_code)]
//! sccdag-analysis library.
//!
//! Strongly connected components, condensation, topological ordering and
//! DAG path analysis over [`sccdag_core::Graph`], plus the staged
//! [`pipeline::analyze`] driver that runs them in sequence.
//!
//! # Conventions
//!
//! - **Errors**: stage functions return [`sccdag_core::GraphError`]; the
//!   driver wraps them in [`pipeline::AnalysisError`].
//! - **Logging**: every stage runs in a `tracing` span and reports its
//!   counts at `debug`.

pub mod condense;
pub mod paths;
pub mod pipeline;
pub mod scc;
pub mod stats;
pub mod topo;

pub use condense::{Condensation, condense};
pub use paths::{CriticalPath, ShortestPaths, critical_path, shortest_paths};
pub use pipeline::{Analysis, AnalysisError, PipelineOptions, Stage, analyze};
pub use scc::{SccPartition, find_sccs};
pub use stats::GraphStats;
pub use topo::{TopologicalOrder, topological_sort};
