//! Summary statistics for an analyzed graph.
//!
//! # Statistics Provided
//!
//! - **density**: `edge_count / (node_count * (node_count - 1))`, 0.0 for
//!   graphs with fewer than two nodes. Parallel edges and self-loops count,
//!   so the value can exceed 1.0.
//! - **trivial / nontrivial SCCs**: single-node components versus
//!   components with more than one member (cycles).
//! - **weakly_connected_component_count**: components when edge direction is
//!   ignored, computed by petgraph.
//! - **isolated_node_count**: nodes with no incoming and no outgoing edges.
//! - **condensed_node_count / condensed_edge_count**: size of the
//!   condensation after first-seen deduplication.

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use sccdag_core::Graph;
use serde::Serialize;

use crate::condense::Condensation;
use crate::scc::SccPartition;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub scc_count: usize,
    pub trivial_scc_count: usize,
    pub nontrivial_scc_count: usize,
    pub largest_scc_size: usize,
    pub weakly_connected_component_count: usize,
    pub isolated_node_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub condensed_node_count: usize,
    pub condensed_edge_count: usize,
}

impl GraphStats {
    /// Compute statistics for `graph` given its SCC partition and condensation.
    #[must_use]
    pub fn compute(graph: &Graph, partition: &SccPartition, condensation: &Condensation) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let in_degrees = graph.in_degrees();
        let max_in_degree = in_degrees.iter().copied().max().unwrap_or(0);
        let max_out_degree = (0..node_count)
            .map(|u| graph.out_degree(u))
            .max()
            .unwrap_or(0);
        let isolated_node_count = in_degrees
            .iter()
            .enumerate()
            .filter(|&(u, &d)| d == 0 && graph.out_degree(u) == 0)
            .count();

        let nontrivial_scc_count = partition.nontrivial_count();

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            scc_count: partition.len(),
            trivial_scc_count: partition.len() - nontrivial_scc_count,
            nontrivial_scc_count,
            largest_scc_size: partition.largest_size(),
            weakly_connected_component_count: connected_components(&to_petgraph(graph)),
            isolated_node_count,
            max_in_degree,
            max_out_degree,
            condensed_node_count: condensation.graph.node_count(),
            condensed_edge_count: condensation.graph.edge_count(),
        }
    }
}

/// Copy `graph` into a petgraph `DiGraph` with identical node indices.
///
/// Node weights are the original indices and edge weights the original
/// weights, so petgraph's algorithms can be run against the same graph.
#[must_use]
pub fn to_petgraph(graph: &Graph) -> DiGraph<usize, f64> {
    let mut pg = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    for i in 0..graph.node_count() {
        pg.add_node(i);
    }
    for edge in graph.all_edges() {
        pg.add_edge(NodeIndex::new(edge.from), NodeIndex::new(edge.to), edge.weight);
    }
    pg
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let n = node_count as f64;
    edge_count as f64 / (n * (n - 1.0))
}
