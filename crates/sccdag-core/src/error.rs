use std::fmt;

/// Machine-readable error codes for scripted consumers of analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DatasetUnreadable,
    DatasetParseError,
    ConfigParseError,
    InvalidReference,
    DuplicateNode,
    InvalidWeight,
    UnknownWeightModel,
    CycleDetected,
    OrderMismatch,
    BudgetExceeded,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DatasetUnreadable => "E1001",
            Self::DatasetParseError => "E1002",
            Self::ConfigParseError => "E1003",
            Self::InvalidReference => "E2001",
            Self::DuplicateNode => "E2002",
            Self::InvalidWeight => "E2003",
            Self::UnknownWeightModel => "E2004",
            Self::CycleDetected => "E2005",
            Self::OrderMismatch => "E2006",
            Self::BudgetExceeded => "E3001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DatasetUnreadable => "Dataset file could not be read",
            Self::DatasetParseError => "Dataset is not a valid graph document",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidReference => "Invalid node reference",
            Self::DuplicateNode => "Duplicate node id",
            Self::InvalidWeight => "Invalid weight or duration",
            Self::UnknownWeightModel => "Unknown weight model",
            Self::CycleDetected => "Graph contains a cycle",
            Self::OrderMismatch => "Order is not a topological order of the graph",
            Self::BudgetExceeded => "Analysis time budget exceeded",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DatasetUnreadable => Some("Check the path and read permissions."),
            Self::DatasetParseError => {
                Some("Expected an object with `nodes`/`n`, `edges` and `weight_model`.")
            }
            Self::ConfigParseError => Some("Fix syntax in sccdag.toml and retry."),
            Self::InvalidReference => Some("Every edge endpoint and source must name a node."),
            Self::DuplicateNode => Some("Give every node a unique `id`."),
            Self::InvalidWeight => Some("Weights must be finite; durations finite and >= 0."),
            Self::UnknownWeightModel => Some("Use `\"edge\"` or `\"node\"`."),
            Self::CycleDetected => Some("Sort the condensation graph instead of the raw graph."),
            Self::OrderMismatch => Some("Pass the topological order computed for this same graph."),
            Self::BudgetExceeded => Some("Raise `budget_ms` or analyze a smaller graph."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while building or analyzing a [`crate::graph::Graph`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node index outside `[0, node_count)`.
    #[error("invalid node reference {index} (graph has {node_count} nodes)")]
    InvalidNode { index: usize, node_count: usize },

    /// A node id that does not name any node in the graph.
    #[error("unknown node id: {0}")]
    UnknownNodeId(String),

    /// Two nodes were added with the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// An edge weight that is NaN or infinite.
    #[error("edge {from} -> {to} has non-finite weight {weight}")]
    InvalidWeight { from: usize, to: usize, weight: f64 },

    /// A node duration that is negative, NaN or infinite.
    #[error("node {id} has invalid duration {duration}")]
    InvalidDuration { id: String, duration: f64 },

    /// A weight model string other than `edge` or `node`.
    #[error("unknown weight model: {0:?}")]
    UnknownWeightModel(String),

    /// Kahn's algorithm could not order every node.
    #[error("graph contains a cycle: ordered {ordered} of {total} nodes")]
    CycleDetected { ordered: usize, total: usize },

    /// A precomputed order whose length does not match the graph.
    #[error("order covers {actual} nodes but graph has {expected}")]
    OrderMismatch { expected: usize, actual: usize },

    /// A permutation that places an edge's target before its source.
    #[error("order is not topological: edge {from} -> {to} points backwards")]
    NotTopological { from: usize, to: usize },
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidNode { .. } | Self::UnknownNodeId(_) => ErrorCode::InvalidReference,
            Self::DuplicateNodeId(_) => ErrorCode::DuplicateNode,
            Self::InvalidWeight { .. } | Self::InvalidDuration { .. } => ErrorCode::InvalidWeight,
            Self::UnknownWeightModel(_) => ErrorCode::UnknownWeightModel,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::OrderMismatch { .. } | Self::NotTopological { .. } => ErrorCode::OrderMismatch,
        }
    }
}
