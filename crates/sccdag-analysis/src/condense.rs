//! Condensation: contract every SCC to a single node.
//!
//! Condensation node `i` stands for component `i` of the partition, with id
//! `C{i}` and a duration equal to the largest member duration. For each
//! original edge whose endpoints sit in different components, the first edge
//! seen for that ordered component pair is kept with its own weight and
//! later ones are dropped. Intra-component edges, self-loops included, never
//! reach the condensation. The result is acyclic by construction.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use sccdag_core::{Graph, GraphBuilder, GraphError, Metrics, MetricsRecorder, Operation};
use tracing::{debug, instrument};

use crate::scc::SccPartition;

/// A condensation graph plus the node-to-component map it was built from.
#[derive(Debug, Clone)]
pub struct Condensation {
    /// One node per component; weight model inherited from the original.
    pub graph: Graph,
    /// Condensation node of every original node.
    pub component_of: Vec<usize>,
    pub metrics: Metrics,
}

impl Condensation {
    /// Condensation node holding original node `node`.
    #[must_use]
    pub fn node_for(&self, node: usize) -> Option<usize> {
        self.component_of.get(node).copied()
    }
}

/// Build the condensation of `graph` under `partition`.
///
/// Edges are scanned by source node, then adjacency order, so "first seen"
/// is deterministic for a given graph.
///
/// # Errors
///
/// Returns [`GraphError::OrderMismatch`] when `partition` was computed for a
/// graph with a different node count.
#[instrument(skip_all, fields(nodes = graph.node_count(), components = partition.len()))]
pub fn condense(graph: &Graph, partition: &SccPartition) -> Result<Condensation, GraphError> {
    if partition.node_count() != graph.node_count() {
        return Err(GraphError::OrderMismatch {
            expected: graph.node_count(),
            actual: partition.node_count(),
        });
    }

    let mut recorder = MetricsRecorder::start();
    let mut builder = GraphBuilder::with_capacity(graph.weight_model(), partition.len());

    for (c, members) in partition.components.iter().enumerate() {
        let duration = members
            .iter()
            .filter_map(|&m| graph.node(m))
            .map(|node| node.duration)
            .fold(0.0_f64, f64::max);
        builder.add_node(format!("C{c}"), duration)?;
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for edge in graph.all_edges() {
        recorder.incr(Operation::EdgeTraversal);
        let cu = partition.component_of[edge.from];
        let cv = partition.component_of[edge.to];
        if cu != cv && seen.insert((cu, cv)) {
            builder.add_edge(cu, cv, edge.weight)?;
            recorder.incr(Operation::CondensedEdge);
        }
    }

    let condensation = Condensation {
        graph: builder.build(),
        component_of: partition.component_of.clone(),
        metrics: recorder.finish(),
    };
    debug!(
        condensed_nodes = condensation.graph.node_count(),
        condensed_edges = condensation.graph.edge_count(),
        elapsed_ns = condensation.metrics.elapsed_nanos(),
        "built condensation"
    );
    Ok(condensation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scc::find_sccs;
    use sccdag_core::WeightModel;

    fn make_graph(durations: &[f64], edges: &[(usize, usize, f64)]) -> Graph {
        let mut b = GraphBuilder::new(WeightModel::Node);
        for (i, &d) in durations.iter().enumerate() {
            b.add_node(format!("n{i}"), d).expect("add node");
        }
        for &(u, v, w) in edges {
            b.add_edge(u, v, w).expect("add edge");
        }
        b.build()
    }

    #[test]
    fn cycle_condenses_to_single_node_without_edges() {
        let g = make_graph(&[1.0, 1.0, 1.0], &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
        let c = condense(&g, &find_sccs(&g)).expect("condense");

        assert_eq!(c.graph.node_count(), 1);
        assert_eq!(c.graph.edge_count(), 0);
        assert_eq!(c.graph.node(0).map(|n| n.id.as_str()), Some("C0"));
        assert_eq!(c.metrics.count(Operation::EdgeTraversal), 3);
        assert_eq!(c.metrics.count(Operation::CondensedEdge), 0);
    }

    #[test]
    fn duration_is_the_member_maximum() {
        let g = make_graph(&[2.0, 7.0, 3.0], &[(0, 1, 0.0), (1, 0, 0.0), (1, 2, 0.0)]);
        let p = find_sccs(&g);
        let c = condense(&g, &p).expect("condense");

        let cycle = c.node_for(0).expect("component of 0");
        let tail = c.node_for(2).expect("component of 2");
        assert!((c.graph.nodes()[cycle].duration - 7.0).abs() < f64::EPSILON);
        assert!((c.graph.nodes()[tail].duration - 3.0).abs() < f64::EPSILON);
        assert_eq!(c.graph.weight_model(), WeightModel::Node);
    }

    #[test]
    fn first_seen_weight_wins_for_parallel_component_edges() {
        // {0,1} -> 2 twice, through different members and weights.
        let g = make_graph(
            &[0.0, 0.0, 0.0],
            &[(0, 1, 1.0), (1, 0, 1.0), (0, 2, 9.0), (1, 2, 4.0), (0, 2, 2.0)],
        );
        let c = condense(&g, &find_sccs(&g)).expect("condense");

        assert_eq!(c.graph.edge_count(), 1);
        let edge = c.graph.all_edges().next().expect("one edge");
        assert!((edge.weight - 9.0).abs() < f64::EPSILON);
        assert_eq!(c.metrics.count(Operation::CondensedEdge), 1);
    }

    #[test]
    fn self_loops_are_dropped() {
        let g = make_graph(&[0.0, 0.0], &[(0, 0, 5.0), (0, 1, 1.0), (1, 1, 2.0)]);
        let c = condense(&g, &find_sccs(&g)).expect("condense");

        assert_eq!(c.graph.node_count(), 2);
        assert_eq!(c.graph.edge_count(), 1);
    }

    #[test]
    fn empty_graph_condenses_to_empty() {
        let g = make_graph(&[], &[]);
        let c = condense(&g, &find_sccs(&g)).expect("condense");
        assert!(c.graph.is_empty());
    }

    #[test]
    fn partition_for_another_graph_is_rejected() {
        let small = make_graph(&[0.0], &[]);
        let large = make_graph(&[0.0, 0.0], &[]);
        let err = condense(&large, &find_sccs(&small)).expect_err("mismatch");
        assert_eq!(
            err,
            GraphError::OrderMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
