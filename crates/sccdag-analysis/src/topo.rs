//! Kahn's topological sort.

use std::collections::VecDeque;

use sccdag_core::{Graph, GraphError, Metrics, MetricsRecorder, Operation};
use tracing::{debug, instrument, warn};

/// A topological order plus the metrics of the sort that produced it.
#[derive(Debug, Clone)]
pub struct TopologicalOrder {
    /// Node indices such that every edge `u -> v` has `u` before `v`.
    pub order: Vec<usize>,
    pub metrics: Metrics,
}

impl TopologicalOrder {
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of every node in the order, indexed by node.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.order.len()];
        for (i, &node) in self.order.iter().enumerate() {
            pos[node] = i;
        }
        pos
    }
}

/// Order the nodes of `graph` so every edge points forward.
///
/// Zero in-degree nodes seed a FIFO queue in index order; a node is enqueued
/// the moment its last incoming edge is removed. The result is therefore
/// deterministic for a given graph.
///
/// Counts one `degree_calculation` per edge scanned for in-degrees, one
/// `edge_traversal` per in-degree decrement, and every `queue_push` and
/// `queue_pop`.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] when fewer than `node_count` nodes
/// could be ordered. The partial order is never returned.
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn topological_sort(graph: &Graph) -> Result<TopologicalOrder, GraphError> {
    let n = graph.node_count();
    let mut recorder = MetricsRecorder::start();

    let mut in_degree = vec![0_usize; n];
    for edge in graph.all_edges() {
        recorder.incr(Operation::DegreeCalculation);
        in_degree[edge.to] += 1;
    }

    let mut queue = VecDeque::new();
    for (node, _) in in_degree.iter().enumerate().filter(|(_, d)| **d == 0) {
        queue.push_back(node);
        recorder.incr(Operation::QueuePush);
    }

    let mut order = Vec::with_capacity(n);
    while let Some(u) = queue.pop_front() {
        recorder.incr(Operation::QueuePop);
        order.push(u);
        for edge in graph.edges(u) {
            recorder.incr(Operation::EdgeTraversal);
            let v = edge.to;
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push_back(v);
                recorder.incr(Operation::QueuePush);
            }
        }
    }

    if order.len() < n {
        warn!(ordered = order.len(), total = n, "cycle detected during topological sort");
        return Err(GraphError::CycleDetected {
            ordered: order.len(),
            total: n,
        });
    }

    let sorted = TopologicalOrder {
        order,
        metrics: recorder.finish(),
    };
    debug!(elapsed_ns = sorted.metrics.elapsed_nanos(), "topological sort complete");
    Ok(sorted)
}
