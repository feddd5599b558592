//! Staged analysis driver.
//!
//! ```text
//! Graph
//!   ↓  scc::find_sccs
//! SccPartition
//!   ↓  condense::condense
//! Condensation (DAG)
//!   ↓  topo::topological_sort
//! TopologicalOrder
//!   ↓  paths::shortest_paths / paths::critical_path
//! ShortestPaths + CriticalPath
//! ```
//!
//! Every stage owns its own [`Metrics`]; the driver only sequences them and
//! checks the optional wall-clock budget between stages. A stage that has
//! started always runs to completion.

#![allow(clippy::module_name_repetitions)]

use std::fmt;
use std::time::{Duration, Instant};

use sccdag_core::{ErrorCode, Graph, GraphError, Metrics};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::condense::{Condensation, condense};
use crate::paths::{CriticalPath, ShortestPaths, critical_path, shortest_paths};
use crate::scc::{SccPartition, find_sccs};
use crate::stats::GraphStats;
use crate::topo::{TopologicalOrder, topological_sort};

// ---------------------------------------------------------------------------
// Stages and errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scc,
    Condense,
    Topo,
    ShortestPaths,
    CriticalPath,
}

impl Stage {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scc => "scc",
            Self::Condense => "condense",
            Self::Topo => "topo",
            Self::ShortestPaths => "shortest_paths",
            Self::CriticalPath => "critical_path",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("time budget of {budget:?} exceeded after the {stage} stage ({elapsed:?} elapsed)")]
    BudgetExceeded {
        stage: Stage,
        elapsed: Duration,
        budget: Duration,
    },
}

impl AnalysisError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(err) => err.code(),
            Self::BudgetExceeded { .. } => ErrorCode::BudgetExceeded,
        }
    }
}

// ---------------------------------------------------------------------------
// Options and result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Shortest-path source as an index into the ORIGINAL graph. When
    /// `None`, condensation node 0 is used.
    pub source: Option<usize>,
    /// Wall-clock budget for the whole analysis, checked between stages.
    pub budget: Option<Duration>,
}

/// Everything the pipeline computed for one graph.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub partition: SccPartition,
    pub condensation: Condensation,
    pub order: TopologicalOrder,
    /// `None` only for an empty graph.
    pub shortest: Option<ShortestPaths>,
    /// Over the condensation; node indices are component indices.
    pub critical: CriticalPath,
    pub stats: GraphStats,
}

impl Analysis {
    /// Condensation node used as the shortest-path source.
    #[must_use]
    pub fn source_component(&self) -> Option<usize> {
        self.shortest.as_ref().map(|sp| sp.source)
    }

    /// Metrics of every stage that ran, in pipeline order.
    #[must_use]
    pub fn stage_metrics(&self) -> Vec<(Stage, &Metrics)> {
        let mut stages = vec![
            (Stage::Scc, &self.partition.metrics),
            (Stage::Condense, &self.condensation.metrics),
            (Stage::Topo, &self.order.metrics),
        ];
        if let Some(sp) = &self.shortest {
            stages.push((Stage::ShortestPaths, &sp.metrics));
        }
        stages.push((Stage::CriticalPath, &self.critical.metrics));
        stages
    }

    /// Sum of per-stage elapsed times.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.stage_metrics().iter().map(|(_, m)| m.elapsed()).sum()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Budget {
    started: Instant,
    limit: Option<Duration>,
}

impl Budget {
    fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn check(&self, stage: Stage) -> Result<(), AnalysisError> {
        let Some(budget) = self.limit else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed > budget {
            return Err(AnalysisError::BudgetExceeded {
                stage,
                elapsed,
                budget,
            });
        }
        Ok(())
    }
}

/// Run every stage on `graph`.
///
/// # Errors
///
/// - [`AnalysisError::Graph`] with [`GraphError::InvalidNode`] if
///   `options.source` is not a node of `graph`.
/// - [`AnalysisError::BudgetExceeded`] if the budget ran out between stages.
/// - [`AnalysisError::Graph`] for any stage failure. None is expected since
///   the condensation is acyclic, but each is propagated rather than masked.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count(), model = %graph.weight_model()))]
pub fn analyze(graph: &Graph, options: &PipelineOptions) -> Result<Analysis, AnalysisError> {
    if let Some(source) = options.source {
        graph.check_node(source)?;
    }
    let budget = Budget::start(options.budget);

    let partition = find_sccs(graph);
    budget.check(Stage::Scc)?;

    let condensation = condense(graph, &partition)?;
    budget.check(Stage::Condense)?;

    let order = topological_sort(&condensation.graph)?;
    budget.check(Stage::Topo)?;

    let source = match options.source {
        Some(node) => condensation.node_for(node),
        None if condensation.graph.is_empty() => None,
        None => Some(0),
    };
    let shortest = source
        .map(|s| shortest_paths(&condensation.graph, &order.order, s))
        .transpose()?;
    budget.check(Stage::ShortestPaths)?;

    let critical = critical_path(&condensation.graph, &order.order)?;
    budget.check(Stage::CriticalPath)?;

    let stats = GraphStats::compute(graph, &partition, &condensation);

    let analysis = Analysis {
        partition,
        condensation,
        order,
        shortest,
        critical,
        stats,
    };
    debug!(
        sccs = analysis.partition.len(),
        critical_length = analysis.critical.length,
        elapsed = ?analysis.total_elapsed(),
        "analysis complete"
    );
    Ok(analysis)
}
