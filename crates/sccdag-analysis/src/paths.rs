//! Single-source shortest paths and the critical path over a DAG.
//!
//! Both computations walk a precomputed topological order once, so each is
//! `O(V + E)`. They are kept as separate operations because they start
//! differently:
//!
//! | | start | relaxation |
//! |---|---|---|
//! | [`shortest_paths`] | source at 0, everything else `+inf` | `dist[u] + edge` on strict decrease |
//! | [`critical_path`] | every node at its own node contribution | `longest[u] + edge + node(v)` on strict increase |
//!
//! Edge and node contributions come from the graph's
//! [`WeightModel`](sccdag_core::WeightModel).

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use sccdag_core::{Graph, GraphError, Metrics, MetricsRecorder, Operation};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Distances and predecessors from a single source.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    pub source: usize,
    /// `f64::INFINITY` for nodes the source cannot reach.
    pub distances: Vec<f64>,
    /// `None` for the source and for unreachable nodes.
    pub predecessors: Vec<Option<usize>>,
    pub metrics: Metrics,
}

impl ShortestPaths {
    /// Distance to `node`, or `None` when unreachable or out of range.
    #[must_use]
    pub fn distance(&self, node: usize) -> Option<f64> {
        self.distances.get(node).copied().filter(|d| d.is_finite())
    }

    #[must_use]
    pub fn is_reachable(&self, node: usize) -> bool {
        self.distance(node).is_some()
    }

    /// Number of nodes reachable from the source, the source included.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_finite()).count()
    }

    /// Nodes from the source to `node`, or `None` when unreachable.
    #[must_use]
    pub fn path_to(&self, node: usize) -> Option<Vec<usize>> {
        self.distance(node)?;
        let mut path = vec![node];
        let mut current = node;
        while let Some(prev) = self.predecessors[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// The heaviest path through a DAG.
#[derive(Debug, Clone)]
pub struct CriticalPath {
    /// Node indices from start to end. Empty only for an empty graph.
    pub path: Vec<usize>,
    /// Sum of node contributions and edge contributions along `path`.
    pub length: f64,
    pub metrics: Metrics,
}

impl CriticalPath {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Start node, if any.
    #[must_use]
    pub fn start(&self) -> Option<usize> {
        self.path.first().copied()
    }

    /// End node, if any.
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.path.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Order validation
// ---------------------------------------------------------------------------

/// Reject an order that is not a topological order of `graph`.
///
/// The order must be a permutation of the nodes, and every edge must point
/// from an earlier position to a later one. Self-loops therefore fail.
fn check_order(graph: &Graph, order: &[usize]) -> Result<(), GraphError> {
    let n = graph.node_count();
    if order.len() != n {
        return Err(GraphError::OrderMismatch {
            expected: n,
            actual: order.len(),
        });
    }

    let mut seen = FixedBitSet::with_capacity(n);
    let mut position = vec![0_usize; n];
    for (i, &node) in order.iter().enumerate() {
        graph.check_node(node)?;
        seen.insert(node);
        position[node] = i;
    }
    let distinct = seen.count_ones(..);
    if distinct != n {
        return Err(GraphError::OrderMismatch {
            expected: n,
            actual: distinct,
        });
    }

    if let Some(edge) = graph
        .all_edges()
        .find(|e| position[e.from] >= position[e.to])
    {
        return Err(GraphError::NotTopological {
            from: edge.from,
            to: edge.to,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

/// Shortest distances from `source` following `order`.
///
/// Only nodes with a finite distance relax their outgoing edges. Distances
/// and predecessors change only on strict improvement.
///
/// # Errors
///
/// - [`GraphError::InvalidNode`] if `source` is not a node of `graph`.
/// - [`GraphError::OrderMismatch`] / [`GraphError::InvalidNode`] if `order`
///   is not a permutation of the graph's nodes.
/// - [`GraphError::NotTopological`] if some edge points backwards in `order`.
#[instrument(skip(graph, order), fields(nodes = graph.node_count()))]
pub fn shortest_paths(
    graph: &Graph,
    order: &[usize],
    source: usize,
) -> Result<ShortestPaths, GraphError> {
    graph.check_node(source)?;
    check_order(graph, order)?;

    let n = graph.node_count();
    let mut recorder = MetricsRecorder::start();
    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors = vec![None; n];
    distances[source] = 0.0;

    for &u in order {
        recorder.incr(Operation::RelaxationPass);
        let base = distances[u];
        if !base.is_finite() {
            continue;
        }
        for edge in graph.edges(u) {
            recorder.incr(Operation::EdgeTraversal);
            let candidate = base + graph.edge_contribution(edge);
            if candidate < distances[edge.to] {
                distances[edge.to] = candidate;
                predecessors[edge.to] = Some(u);
                recorder.incr(Operation::Relaxation);
            }
        }
    }

    let result = ShortestPaths {
        source,
        distances,
        predecessors,
        metrics: recorder.finish(),
    };
    debug!(
        reachable = result.reachable_count(),
        elapsed_ns = result.metrics.elapsed_nanos(),
        "shortest paths computed"
    );
    Ok(result)
}

// ---------------------------------------------------------------------------
// Critical path
// ---------------------------------------------------------------------------

/// Longest path ending anywhere in `graph`, following `order`.
///
/// Every node starts at its own node contribution, so any node may begin
/// the path. The endpoint is the first node (by index) holding the maximum
/// length.
///
/// Only the active weight model contributes: under [`WeightModel::Edge`]
/// node durations count 0, under [`WeightModel::Node`] edge weights count 0.
/// Durations and weights are never mixed, so the weighted diamond
/// (durations 5,3,2,4; path `0->1->3` with weights 2,3) scores 5 under the
/// edge model rather than the mixed sum 17, and a lone node scores 0 rather
/// than its duration.
///
/// [`WeightModel::Edge`]: sccdag_core::WeightModel::Edge
/// [`WeightModel::Node`]: sccdag_core::WeightModel::Node
///
/// # Errors
///
/// - [`GraphError::OrderMismatch`] / [`GraphError::InvalidNode`] if `order`
///   is not a permutation of the graph's nodes.
/// - [`GraphError::NotTopological`] if some edge points backwards in `order`.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn critical_path(graph: &Graph, order: &[usize]) -> Result<CriticalPath, GraphError> {
    check_order(graph, order)?;

    let n = graph.node_count();
    let mut recorder = MetricsRecorder::start();
    let mut longest: Vec<f64> = (0..n).map(|i| graph.node_contribution(i)).collect();
    let mut predecessors: Vec<Option<usize>> = vec![None; n];

    for &u in order {
        recorder.incr(Operation::RelaxationPass);
        for edge in graph.edges(u) {
            recorder.incr(Operation::EdgeTraversal);
            let v = edge.to;
            let candidate =
                longest[u] + graph.edge_contribution(edge) + graph.node_contribution(v);
            if candidate > longest[v] {
                longest[v] = candidate;
                predecessors[v] = Some(u);
                recorder.incr(Operation::Relaxation);
            }
        }
    }

    let Some(end) = first_max(&longest) else {
        return Ok(CriticalPath {
            path: Vec::new(),
            length: 0.0,
            metrics: recorder.finish(),
        });
    };

    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = predecessors[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();

    let result = CriticalPath {
        path,
        length: longest[end],
        metrics: recorder.finish(),
    };
    debug!(
        length = result.length,
        hops = result.path.len(),
        elapsed_ns = result.metrics.elapsed_nanos(),
        "critical path computed"
    );
    Ok(result)
}

/// Index of the first maximum, scanning in index order.
fn first_max(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some(b) if value <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
