//! Strongly connected components via Tarjan's algorithm.
//!
//! # Algorithm
//!
//! One depth-first pass assigns every node a discovery `index` and a
//! `lowlink`, the smallest index reachable through the DFS tree plus edges to
//! nodes still on the component stack. A node whose `lowlink` equals its
//! `index` roots a component: everything above it on the stack, down to and
//! including itself, is popped as one SCC.
//!
//! The search never recurses. Each simulated call is a [`Frame`] holding the
//! node and the position of the next adjacency entry to examine, so a chain
//! of a million nodes needs a million small heap frames, not a million host
//! stack frames.
//!
//! # Ordering
//!
//! - Roots are tried in ascending node index.
//! - Components are emitted in closing order, which is a reverse topological
//!   order of the condensation.
//! - Members inside a component appear in stack-pop (LIFO) order.

#![allow(clippy::module_name_repetitions)]

use fixedbitset::FixedBitSet;
use sccdag_core::{Graph, Metrics, MetricsRecorder, Operation};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Partition of a graph's nodes into strongly connected components.
#[derive(Debug, Clone)]
pub struct SccPartition {
    /// Components in closing order; each holds original node indices.
    pub components: Vec<Vec<usize>>,
    /// Component index of every original node.
    pub component_of: Vec<usize>,
    /// Counters and timing of the search.
    pub metrics: Metrics,
}

impl SccPartition {
    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of nodes the partition covers.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.component_of.len()
    }

    /// Component holding `node`, if `node` is in range.
    #[must_use]
    pub fn component_of(&self, node: usize) -> Option<usize> {
        self.component_of.get(node).copied()
    }

    /// Size of every component, in component order.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.components.iter().map(Vec::len).collect()
    }

    /// Size of the largest component (0 for an empty graph).
    #[must_use]
    pub fn largest_size(&self) -> usize {
        self.components.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Components with more than one member.
    #[must_use]
    pub fn nontrivial_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() > 1).count()
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

const UNVISITED: usize = usize::MAX;

/// One simulated recursive call.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    next_edge: usize,
}

struct Tarjan<'g> {
    graph: &'g Graph,
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: FixedBitSet,
    stack: Vec<usize>,
    frames: Vec<Frame>,
    next_index: usize,
    components: Vec<Vec<usize>>,
    recorder: MetricsRecorder,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g Graph) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            index: vec![UNVISITED; n],
            lowlink: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::new(),
            frames: Vec::new(),
            next_index: 0,
            components: Vec::new(),
            recorder: MetricsRecorder::start(),
        }
    }

    fn enter(&mut self, v: usize) {
        self.recorder.incr(Operation::DfsVisit);
        self.index[v] = self.next_index;
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
        self.frames.push(Frame {
            node: v,
            next_edge: 0,
        });
    }

    fn search_from(&mut self, root: usize) {
        self.enter(root);

        while let Some(frame) = self.frames.last_mut() {
            let u = frame.node;

            if let Some(edge) = self.graph.edges(u).get(frame.next_edge) {
                frame.next_edge += 1;
                self.recorder.incr(Operation::EdgeTraversal);

                let v = edge.to;
                if self.index[v] == UNVISITED {
                    self.enter(v);
                } else if self.on_stack.contains(v) {
                    self.lowlink[u] = self.lowlink[u].min(self.index[v]);
                }
                continue;
            }

            // Every edge of `u` examined: return to the caller.
            self.frames.pop();
            if let Some(parent) = self.frames.last() {
                let p = parent.node;
                self.lowlink[p] = self.lowlink[p].min(self.lowlink[u]);
            }
            if self.lowlink[u] == self.index[u] {
                self.close_component(u);
            }
        }
    }

    fn close_component(&mut self, root: usize) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack.set(w, false);
            component.push(w);
            if w == root {
                break;
            }
        }
        self.recorder.incr(Operation::ComponentEmitted);
        self.components.push(component);
    }

    fn finish(self) -> SccPartition {
        let mut component_of = vec![0; self.graph.node_count()];
        for (c, members) in self.components.iter().enumerate() {
            for &node in members {
                component_of[node] = c;
            }
        }

        SccPartition {
            components: self.components,
            component_of,
            metrics: self.recorder.finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Partition `graph` into strongly connected components.
///
/// Runs in `O(V + E)` with heap-allocated DFS frames. Counts one
/// `dfs_visit` per node entered, one `edge_traversal` per adjacency entry
/// examined and one `component_emitted` per component closed.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn find_sccs(graph: &Graph) -> SccPartition {
    let mut tarjan = Tarjan::new(graph);
    for root in 0..graph.node_count() {
        if tarjan.index[root] == UNVISITED {
            tarjan.search_from(root);
        }
    }

    let partition = tarjan.finish();
    debug!(
        components = partition.len(),
        largest = partition.largest_size(),
        elapsed_ns = partition.metrics.elapsed_nanos(),
        "found strongly connected components"
    );
    partition
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
