#![forbid(unsafe_code)]
//! sccdag-core library.
//!
//! The immutable [`Graph`] model every analysis stage reads, the per-stage
//! [`Metrics`] recorder, the error taxonomy, and the typed JSON document
//! loader that turns dataset files into graphs.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums; every error maps to an [`ErrorCode`].
//! - **Logging**: `tracing` macros only; subscribers are installed by binaries.

pub mod document;
pub mod error;
pub mod graph;
pub mod metrics;

pub use document::{GraphDocument, LoadError, LoadedGraph, load_graph};
pub use error::{ErrorCode, GraphError};
pub use graph::{Edge, Graph, GraphBuilder, Node, WeightModel};
pub use metrics::{Metrics, MetricsRecorder, Operation};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn graph_is_shareable_across_threads() {
        assert_send_sync::<Graph>();
        assert_send_sync::<Metrics>();
    }
}
