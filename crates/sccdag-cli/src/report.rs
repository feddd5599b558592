//! CSV results sink: one row per successfully analyzed dataset.

use std::path::Path;

use anyhow::{Context, Result};
use sccdag_analysis::Analysis;
use sccdag_core::{Graph, Metrics};
use serde::Serialize;

pub const HEADERS: [&str; 17] = [
    "Dataset",
    "Nodes",
    "Edges",
    "WeightModel",
    "SCCs",
    "SCC_Time(ns)",
    "SCC_Operations",
    "Condense_Time(ns)",
    "Condense_Operations",
    "Topo_Time(ns)",
    "Topo_Operations",
    "SP_Time(ns)",
    "SP_Operations",
    "CP_Time(ns)",
    "CP_Operations",
    "CriticalPath_Length",
    "Source_Node",
];

/// Field order must match [`HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub dataset: String,
    pub nodes: usize,
    pub edges: usize,
    pub weight_model: String,
    pub sccs: usize,
    pub scc_time_ns: u64,
    pub scc_operations: String,
    pub condense_time_ns: u64,
    pub condense_operations: String,
    pub topo_time_ns: u64,
    pub topo_operations: String,
    pub sp_time_ns: u64,
    pub sp_operations: String,
    pub cp_time_ns: u64,
    pub cp_operations: String,
    pub critical_path_length: f64,
    /// Condensation node used as shortest-path source; empty when none.
    pub source_node: Option<usize>,
}

impl ResultRow {
    pub fn from_analysis(dataset: &str, graph: &Graph, analysis: &Analysis) -> Self {
        let empty = Metrics::default();
        let sp = analysis.shortest.as_ref().map_or(&empty, |sp| &sp.metrics);

        Self {
            dataset: dataset.to_string(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            weight_model: graph.weight_model().to_string(),
            sccs: analysis.partition.len(),
            scc_time_ns: analysis.partition.metrics.elapsed_nanos(),
            scc_operations: analysis.partition.metrics.summary(),
            condense_time_ns: analysis.condensation.metrics.elapsed_nanos(),
            condense_operations: analysis.condensation.metrics.summary(),
            topo_time_ns: analysis.order.metrics.elapsed_nanos(),
            topo_operations: analysis.order.metrics.summary(),
            sp_time_ns: sp.elapsed_nanos(),
            sp_operations: sp.summary(),
            cp_time_ns: analysis.critical.metrics.elapsed_nanos(),
            cp_operations: analysis.critical.metrics.summary(),
            critical_path_length: analysis.critical.length,
            source_node: analysis.source_component(),
        }
    }
}

/// Write `rows` to `path`, creating parent directories. The header is
/// always written, even for an empty batch.
pub fn write_results(path: &Path, rows: &[ResultRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
