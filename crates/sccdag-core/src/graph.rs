//! Immutable directed weighted graph.
//!
//! # Overview
//!
//! A [`Graph`] is a fixed node list plus an adjacency list of outgoing
//! [`Edge`]s per node, tagged with a [`WeightModel`] that decides whether
//! path lengths accrue from edge weights or from node durations.
//!
//! Graphs are assembled by a [`GraphBuilder`] (the only phase in which edges
//! may be inserted) and are read-only afterwards, so a built graph can be
//! shared freely between threads.
//!
//! ## Invariants
//!
//! - Every edge endpoint is a valid index in `[0, node_count)`.
//! - Node ids are unique within a graph.
//! - Edge weights are finite; node durations are finite and non-negative.
//! - `edges(u)` yields `u`'s outgoing edges in insertion order. Parallel
//!   edges between the same ordered pair are all retained.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// WeightModel
// ---------------------------------------------------------------------------

/// Selects which quantity contributes to path length.
///
/// Decided once when the graph is built; algorithms dispatch on the tag via
/// [`WeightModel::edge_contribution`] and [`WeightModel::node_contribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum WeightModel {
    /// Path length is the sum of edge weights.
    #[default]
    Edge,
    /// Path length is the sum of node durations.
    Node,
}

impl WeightModel {
    /// Canonical lowercase name (`"edge"` or `"node"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Node => "node",
        }
    }

    /// Length contributed by traversing `edge`.
    #[must_use]
    pub const fn edge_contribution(self, edge: &Edge) -> f64 {
        match self {
            Self::Edge => edge.weight,
            Self::Node => 0.0,
        }
    }

    /// Length contributed by visiting `node`.
    #[must_use]
    pub const fn node_contribution(self, node: &Node) -> f64 {
        match self {
            Self::Edge => 0.0,
            Self::Node => node.duration,
        }
    }
}

impl fmt::Display for WeightModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightModel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("edge") {
            Ok(Self::Edge)
        } else if trimmed.eq_ignore_ascii_case("node") {
            Ok(Self::Node)
        } else {
            Err(GraphError::UnknownWeightModel(s.to_string()))
        }
    }
}

impl TryFrom<String> for WeightModel {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Node / Edge
// ---------------------------------------------------------------------------

/// A graph node. Its index is its position in [`Graph::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Unique id within the graph.
    pub id: String,
    /// Optional display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Non-negative duration; only counts under [`WeightModel::Node`].
    pub duration: f64,
}

impl Node {
    /// Label if present, otherwise the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A directed edge `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Finite weight; only counts under [`WeightModel::Edge`].
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// An immutable directed weighted graph.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    id_index: HashMap<String, usize>,
    edge_count: usize,
    weight_model: WeightModel,
}

impl Graph {
    /// Number of nodes `n`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, counting parallel edges individually.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub const fn weight_model(&self) -> WeightModel {
        self.weight_model
    }

    /// All nodes, in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node at `index`, if any.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Resolve a node id to its index.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Return `Ok(())` if `index` names a node, else [`GraphError::InvalidNode`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidNode`] when `index >= node_count()`.
    pub fn check_node(&self, index: usize) -> Result<(), GraphError> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::InvalidNode {
                index,
                node_count: self.nodes.len(),
            })
        }
    }

    /// Outgoing edges of `u` in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `u >= node_count()`. Algorithms iterate `0..node_count()`
    /// and edge targets are validated at build time; use
    /// [`Graph::check_node`] for caller-supplied indices.
    #[must_use]
    pub fn edges(&self, u: usize) -> &[Edge] {
        &self.adjacency[u]
    }

    /// Every edge, grouped by source in node order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }

    /// Number of outgoing edges of `u`, or 0 for an invalid index.
    #[must_use]
    pub fn out_degree(&self, u: usize) -> usize {
        self.adjacency.get(u).map_or(0, Vec::len)
    }

    /// In-degree of every node, indexed by node.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.nodes.len()];
        for edge in self.all_edges() {
            degrees[edge.to] += 1;
        }
        degrees
    }

    /// Length contributed by traversing `edge` under this graph's model.
    #[must_use]
    pub const fn edge_contribution(&self, edge: &Edge) -> f64 {
        self.weight_model.edge_contribution(edge)
    }

    /// Length contributed by visiting node `index` under this graph's model.
    ///
    /// Returns 0 for an invalid index.
    #[must_use]
    pub fn node_contribution(&self, index: usize) -> f64 {
        self.nodes
            .get(index)
            .map_or(0.0, |node| self.weight_model.node_contribution(node))
    }

    /// A new graph with every edge reversed, same nodes and weight model.
    ///
    /// Reversed edges are appended by ascending original source, so each
    /// transposed adjacency list is ordered by original source index.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); self.nodes.len()];
        for edge in self.all_edges() {
            adjacency[edge.to].push(Edge {
                from: edge.to,
                to: edge.from,
                weight: edge.weight,
            });
        }

        Self {
            nodes: self.nodes.clone(),
            adjacency,
            id_index: self.id_index.clone(),
            edge_count: self.edge_count,
            weight_model: self.weight_model,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// The single build phase of a [`Graph`].
///
/// Every insertion is validated immediately, so a built graph always
/// satisfies the module invariants.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    id_index: HashMap<String, usize>,
    edge_count: usize,
    weight_model: WeightModel,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(weight_model: WeightModel) -> Self {
        Self::with_capacity(weight_model, 0)
    }

    #[must_use]
    pub fn with_capacity(weight_model: WeightModel, nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            adjacency: Vec::with_capacity(nodes),
            id_index: HashMap::with_capacity(nodes),
            edge_count: 0,
            weight_model,
        }
    }

    /// Number of nodes added so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve an id added so far to its index.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Add a node and return its index.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateNodeId`] if `id` was already added.
    /// - [`GraphError::InvalidDuration`] if `duration` is negative or not finite.
    pub fn add_node(&mut self, id: impl Into<String>, duration: f64) -> Result<usize, GraphError> {
        self.add_labeled_node(id, None, duration)
    }

    /// Add a node with a display label and return its index.
    ///
    /// # Errors
    ///
    /// Same as [`GraphBuilder::add_node`].
    pub fn add_labeled_node(
        &mut self,
        id: impl Into<String>,
        label: Option<String>,
        duration: f64,
    ) -> Result<usize, GraphError> {
        let id = id.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(GraphError::InvalidDuration { id, duration });
        }
        if self.id_index.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }

        let index = self.nodes.len();
        self.id_index.insert(id.clone(), index);
        self.nodes.push(Node {
            id,
            label,
            duration,
        });
        self.adjacency.push(Vec::new());
        Ok(index)
    }

    /// Append `u -> v` to `u`'s adjacency list.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidNode`] if either endpoint is out of range.
    /// - [`GraphError::InvalidWeight`] if `weight` is not finite.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<(), GraphError> {
        let node_count = self.nodes.len();
        for index in [u, v] {
            if index >= node_count {
                return Err(GraphError::InvalidNode { index, node_count });
            }
        }
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight {
                from: u,
                to: v,
                weight,
            });
        }

        self.adjacency[u].push(Edge {
            from: u,
            to: v,
            weight,
        });
        self.edge_count += 1;
        Ok(())
    }

    /// Freeze the builder into an immutable [`Graph`].
    #[must_use]
    pub fn build(self) -> Graph {
        Graph {
            nodes: self.nodes,
            adjacency: self.adjacency,
            id_index: self.id_index,
            edge_count: self.edge_count,
            weight_model: self.weight_model,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
