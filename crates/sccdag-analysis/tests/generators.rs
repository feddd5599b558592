//! Shared proptest strategies for analysis tests.

#![allow(dead_code)]

use proptest::prelude::*;
use sccdag_core::{Graph, GraphBuilder, WeightModel};

/// A raw graph description: durations per node and `(u, v, w)` edges.
#[derive(Debug, Clone)]
pub struct GraphSpec {
    pub model: WeightModel,
    pub durations: Vec<u8>,
    pub edges: Vec<(usize, usize, i16)>,
}

impl GraphSpec {
    pub fn build(&self) -> Graph {
        let mut b = GraphBuilder::new(self.model);
        for (i, &d) in self.durations.iter().enumerate() {
            b.add_node(format!("n{i}"), f64::from(d)).expect("add node");
        }
        for &(u, v, w) in &self.edges {
            b.add_edge(u, v, f64::from(w)).expect("add edge");
        }
        b.build()
    }
}

pub fn arb_model() -> impl Strategy<Value = WeightModel> {
    prop_oneof![Just(WeightModel::Edge), Just(WeightModel::Node)]
}

/// Arbitrary directed graphs, cycles and parallel edges included.
pub fn arb_graph() -> impl Strategy<Value = GraphSpec> {
    (arb_model(), 0usize..24).prop_flat_map(|(model, n)| {
        let edges = if n == 0 {
            Just(Vec::new()).boxed()
        } else {
            prop::collection::vec((0..n, 0..n, -10i16..50), 0..n * 3).boxed()
        };
        (
            Just(model),
            prop::collection::vec(0u8..20, n),
            edges,
        )
            .prop_map(|(model, durations, edges)| GraphSpec {
                model,
                durations,
                edges,
            })
    })
}

/// Arbitrary DAGs: every edge points from a lower to a higher index.
pub fn arb_dag() -> impl Strategy<Value = GraphSpec> {
    arb_graph().prop_map(|mut spec| {
        spec.edges = spec
            .edges
            .into_iter()
            .filter(|(u, v, _)| u != v)
            .map(|(u, v, w)| (u.min(v), u.max(v), w))
            .collect();
        spec
    })
}
