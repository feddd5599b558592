//! Typed JSON graph documents and the file loader built on them.
//!
//! # Accepted shapes
//!
//! Index-based datasets:
//!
//! ```json
//! { "directed": true, "n": 3,
//!   "edges": [ { "u": 0, "v": 1, "w": 2 }, { "u": 1, "v": 2, "w": 1 } ],
//!   "source": 0, "weight_model": "edge" }
//! ```
//!
//! Id-based datasets:
//!
//! ```json
//! { "nodes": [ { "id": "A", "duration": 5 }, { "id": "B", "duration": 3 } ],
//!   "edges": [ { "from": "A", "to": "B", "weight": 2 } ],
//!   "weight_model": "node" }
//! ```
//!
//! `u`/`v`/`w` are aliases of `from`/`to`/`weight`. Node references may be
//! integers or strings and are resolved by id; when `nodes` is omitted, `n`
//! nodes with ids `"0"..` and zero duration are synthesized. When
//! `directed` is `false`, every edge is inserted in both directions.

#![allow(clippy::module_name_repetitions)]

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ErrorCode, GraphError};
use crate::graph::{Graph, GraphBuilder, WeightModel};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// A node reference as written in a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Index(u64),
    Id(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub id: NodeRef,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRecord {
    #[serde(alias = "u")]
    pub from: NodeRef,
    #[serde(alias = "v")]
    pub to: NodeRef,
    #[serde(default, alias = "w")]
    pub weight: f64,
}

/// The parsed, not yet validated, form of a graph file.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub nodes: Option<Vec<NodeRecord>>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub source: Option<NodeRef>,
    #[serde(default)]
    pub weight_model: WeightModel,
}

const fn default_directed() -> bool {
    true
}

/// A validated graph plus the source node its document named, if any.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub source: Option<usize>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A document that parsed but does not describe a valid graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("document declares n = {declared} but lists {listed} nodes")]
    NodeCountMismatch { declared: usize, listed: usize },
}

/// Failure to turn a file into a [`LoadedGraph`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid graph in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

impl LoadError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::DatasetUnreadable,
            Self::Parse { .. } => ErrorCode::DatasetParseError,
            Self::Invalid {
                source: DocumentError::Graph(err),
                ..
            } => err.code(),
            Self::Invalid { .. } => ErrorCode::DatasetParseError,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl GraphDocument {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, missing edge
    /// endpoints, or an unknown `weight_model`.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Validate the document and build its [`Graph`].
    ///
    /// # Errors
    ///
    /// - [`DocumentError::NodeCountMismatch`] if `n` and `nodes` disagree.
    /// - [`DocumentError::Graph`] for duplicate ids, unknown references,
    ///   non-finite weights or invalid durations.
    pub fn into_graph(self) -> Result<LoadedGraph, DocumentError> {
        let node_total = self
            .nodes
            .as_ref()
            .map_or(self.n.unwrap_or(0), Vec::len);
        let mut builder = GraphBuilder::with_capacity(self.weight_model, node_total);

        match (self.nodes, self.n) {
            (Some(nodes), Some(declared)) if nodes.len() != declared => {
                return Err(DocumentError::NodeCountMismatch {
                    declared,
                    listed: nodes.len(),
                });
            }
            (Some(nodes), _) => {
                for record in nodes {
                    builder.add_labeled_node(record.id.to_string(), record.label, record.duration)?;
                }
            }
            (None, Some(n)) => {
                for i in 0..n {
                    builder.add_node(i.to_string(), 0.0)?;
                }
            }
            (None, None) => {}
        }

        for edge in &self.edges {
            let u = resolve(&builder, &edge.from)?;
            let v = resolve(&builder, &edge.to)?;
            builder.add_edge(u, v, edge.weight)?;
            if !self.directed && u != v {
                builder.add_edge(v, u, edge.weight)?;
            }
        }

        let source = self
            .source
            .as_ref()
            .map(|r| resolve(&builder, r))
            .transpose()?;

        Ok(LoadedGraph {
            graph: builder.build(),
            source,
        })
    }
}

fn resolve(builder: &GraphBuilder, node: &NodeRef) -> Result<usize, GraphError> {
    let key = node.to_string();
    builder
        .index_of(&key)
        .ok_or(GraphError::UnknownNodeId(key))
}

/// Read, parse and validate the graph file at `path`.
///
/// # Errors
///
/// Returns a [`LoadError`] naming `path` for I/O, parse or validation
/// failures.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_graph(path: &Path) -> Result<LoadedGraph, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = GraphDocument::from_json_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded = document.into_graph().map_err(|source| LoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        nodes = loaded.graph.node_count(),
        edges = loaded.graph.edge_count(),
        weight_model = %loaded.graph.weight_model(),
        "loaded graph document"
    );
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(text: &str) -> Result<LoadedGraph, DocumentError> {
        GraphDocument::from_json_str(text)
            .expect("valid json")
            .into_graph()
    }

    #[test]
    fn index_format_synthesizes_nodes() {
        let loaded = load_str(
            r#"{"directed": true, "n": 4,
                "edges": [{"u": 0, "v": 1, "w": 3}, {"u": 2, "v": 3, "w": 1.5}],
                "source": 2, "weight_model": "edge"}"#,
        )
        .expect("valid graph");

        let g = &loaded.graph;
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.weight_model(), WeightModel::Edge);
        assert_eq!(g.node(3).map(|n| n.id.as_str()), Some("3"));
        assert!((g.edges(2)[0].weight - 1.5).abs() < f64::EPSILON);
        assert_eq!(loaded.source, Some(2));
    }

    #[test]
    fn id_format_resolves_string_references() {
        let loaded = load_str(
            r#"{"nodes": [{"id": "A", "duration": 5}, {"id": "B", "duration": 3, "label": "build"}],
                "edges": [{"from": "A", "to": "B", "weight": 2}],
                "weight_model": "node"}"#,
        )
        .expect("valid graph");

        let g = &loaded.graph;
        assert_eq!(g.weight_model(), WeightModel::Node);
        assert_eq!(g.index_of("B"), Some(1));
        assert_eq!(g.node(1).map(|n| n.display_name()), Some("build"));
        assert_eq!(g.edges(0)[0].to, 1);
        assert_eq!(loaded.source, None);
    }

    #[test]
    fn integer_node_ids_match_integer_edge_references() {
        let loaded = load_str(
            r#"{"nodes": [{"id": 10, "duration": 1}, {"id": 20, "duration": 2}],
                "edges": [{"u": 20, "v": 10, "w": 4}]}"#,
        )
        .expect("valid graph");

        assert_eq!(loaded.graph.edges(1)[0].to, 0);
        assert_eq!(loaded.graph.weight_model(), WeightModel::Edge);
    }

    #[test]
    fn undirected_documents_mirror_edges() {
        let loaded = load_str(
            r#"{"directed": false, "n": 2, "edges": [{"u": 0, "v": 1, "w": 1}]}"#,
        )
        .expect("valid graph");

        assert_eq!(loaded.graph.edge_count(), 2);
        assert_eq!(loaded.graph.edges(1)[0].to, 0);
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let err = load_str(r#"{"n": 2, "edges": [{"u": 0, "v": 7, "w": 1}]}"#)
            .expect_err("dangling edge");
        assert_eq!(
            err,
            DocumentError::Graph(GraphError::UnknownNodeId("7".to_string()))
        );

        let err = load_str(r#"{"n": 2, "edges": [], "source": 5}"#).expect_err("bad source");
        assert!(matches!(err, DocumentError::Graph(GraphError::UnknownNodeId(_))));
    }

    #[test]
    fn node_count_mismatch_is_rejected() {
        let err = load_str(r#"{"n": 3, "nodes": [{"id": "A"}], "edges": []}"#)
            .expect_err("mismatch");
        assert_eq!(
            err,
            DocumentError::NodeCountMismatch {
                declared: 3,
                listed: 1
            }
        );
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = load_str(r#"{"nodes": [{"id": "A", "duration": -2}], "edges": []}"#)
            .expect_err("negative duration");
        assert!(matches!(
            err,
            DocumentError::Graph(GraphError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn unknown_weight_model_fails_to_parse() {
        let err = GraphDocument::from_json_str(r#"{"n": 1, "weight_model": "both"}"#)
            .expect_err("bad weight model");
        assert!(err.to_string().contains("unknown weight model"));
    }

    #[test]
    fn empty_document_is_an_empty_graph() {
        let loaded = load_str("{}").expect("empty graph");
        assert!(loaded.graph.is_empty());
        assert_eq!(loaded.source, None);
    }

    #[test]
    fn load_graph_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = load_graph(&path).expect_err("parse failure");
        assert_eq!(err.code(), ErrorCode::DatasetParseError);
        assert!(err.to_string().contains("broken.json"));

        let missing = dir.path().join("missing.json");
        let err = load_graph(&missing).expect_err("io failure");
        assert_eq!(err.code(), ErrorCode::DatasetUnreadable);
    }
}
