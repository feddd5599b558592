//! `sccdag inspect`: detailed report for one graph file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use sccdag_analysis::{Analysis, GraphStats, PipelineOptions, Stage, analyze};
use sccdag_core::metrics::format_duration;
use sccdag_core::{Graph, GraphError, load_graph};
use serde::Serialize;

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Graph document to analyze.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Node id to use as shortest-path source (overrides the document).
    #[arg(long, value_name = "ID")]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
struct ComponentView {
    id: String,
    duration: f64,
    members: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DistanceView {
    component: String,
    /// `None` when unreachable.
    distance: Option<f64>,
}

#[derive(Debug, Serialize)]
struct StageView {
    stage: Stage,
    elapsed_ns: u64,
    operations: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Serialize)]
struct InspectOutput {
    file: String,
    weight_model: String,
    stats: GraphStats,
    components: Vec<ComponentView>,
    topological_order: Vec<String>,
    source_component: Option<String>,
    distances: Vec<DistanceView>,
    critical_path: Vec<String>,
    critical_path_length: f64,
    stages: Vec<StageView>,
}

/// Execute `sccdag inspect`.
pub fn run_inspect(args: &InspectArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let path = project_root.join(&args.file);
    let loaded = match load_graph(&path) {
        Ok(loaded) => loaded,
        Err(err) => {
            render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
            return Err(err.into());
        }
    };

    let source = match &args.source {
        Some(id) => match loaded.graph.index_of(id) {
            Some(index) => Some(index),
            None => {
                let err = GraphError::UnknownNodeId(id.clone());
                render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
                return Err(err.into());
            }
        },
        None => loaded.source,
    };

    let options = PipelineOptions {
        source,
        budget: None,
    };
    let analysis = match analyze(&loaded.graph, &options) {
        Ok(analysis) => analysis,
        Err(err) => {
            render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
            return Err(err.into());
        }
    };

    let payload = build_output(&path, &loaded.graph, &analysis);
    render_mode(output, &payload, render_inspect_text, render_inspect_pretty)
}

fn build_output(path: &Path, graph: &Graph, analysis: &Analysis) -> InspectOutput {
    let condensed = &analysis.condensation.graph;
    let component_id = |c: usize| {
        condensed
            .node(c)
            .map_or_else(|| format!("C{c}"), |n| n.id.clone())
    };
    let node_name = |v: usize| graph.node(v).map_or_else(|| v.to_string(), |n| n.display_name().to_string());

    let components = analysis
        .partition
        .components
        .iter()
        .enumerate()
        .map(|(c, members)| ComponentView {
            id: component_id(c),
            duration: condensed.node(c).map_or(0.0, |n| n.duration),
            members: members.iter().map(|&v| node_name(v)).collect(),
        })
        .collect();

    let distances = analysis
        .shortest
        .as_ref()
        .map(|sp| {
            analysis
                .order
                .order
                .iter()
                .map(|&c| DistanceView {
                    component: component_id(c),
                    distance: sp.distance(c),
                })
                .collect()
        })
        .unwrap_or_default();

    let stages = analysis
        .stage_metrics()
        .into_iter()
        .map(|(stage, metrics)| StageView {
            stage,
            elapsed_ns: metrics.elapsed_nanos(),
            operations: metrics.operations().map(|(op, n)| (op.name(), n)).collect(),
        })
        .collect();

    InspectOutput {
        file: path.display().to_string(),
        weight_model: graph.weight_model().to_string(),
        stats: analysis.stats.clone(),
        components,
        topological_order: analysis.order.order.iter().map(|&c| component_id(c)).collect(),
        source_component: analysis.source_component().map(component_id),
        distances,
        critical_path: analysis.critical.path.iter().map(|&c| component_id(c)).collect(),
        critical_path_length: analysis.critical.length,
        stages,
    }
}

fn format_distance(d: Option<f64>) -> String {
    d.map_or_else(|| "unreachable".to_string(), |d| d.to_string())
}

fn render_inspect_text(payload: &InspectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &payload.stats;
    writeln!(
        w,
        "graph nodes={} edges={} model={} sccs={} density={:.4}",
        s.node_count, s.edge_count, payload.weight_model, s.scc_count, s.density
    )?;
    for c in &payload.components {
        writeln!(w, "scc {} size={} members={}", c.id, c.members.len(), c.members.join(","))?;
    }
    writeln!(w, "order {}", payload.topological_order.join(","))?;
    for d in &payload.distances {
        writeln!(w, "dist {} {}", d.component, format_distance(d.distance))?;
    }
    writeln!(
        w,
        "critical {} length={}",
        payload.critical_path.join(","),
        payload.critical_path_length
    )?;
    for st in &payload.stages {
        let ops: Vec<String> = st.operations.iter().map(|(k, v)| format!("{k}:{v}")).collect();
        writeln!(w, "stage {} ns={} {}", st.stage, st.elapsed_ns, ops.join(";"))?;
    }
    Ok(())
}

fn render_inspect_pretty(payload: &InspectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let s = &payload.stats;
    pretty_section(w, &format!("Graph {}", payload.file))?;
    pretty_kv(w, "nodes", s.node_count.to_string())?;
    pretty_kv(w, "edges", s.edge_count.to_string())?;
    pretty_kv(w, "weight model", &payload.weight_model)?;
    pretty_kv(w, "density", format!("{:.4}", s.density))?;
    pretty_kv(w, "weak comps", s.weakly_connected_component_count.to_string())?;
    pretty_kv(w, "isolated", s.isolated_node_count.to_string())?;
    pretty_kv(
        w,
        "max degree",
        format!("in {} / out {}", s.max_in_degree, s.max_out_degree),
    )?;
    writeln!(w)?;

    pretty_section(
        w,
        &format!(
            "Strongly connected components ({}, {} non-trivial, largest {})",
            s.scc_count, s.nontrivial_scc_count, s.largest_scc_size
        ),
    )?;
    for c in &payload.components {
        writeln!(w, "  {:<6} size {:<4} {}", c.id, c.members.len(), c.members.join(", "))?;
    }
    writeln!(w)?;

    pretty_section(
        w,
        &format!(
            "Condensation ({} nodes, {} edges)",
            s.condensed_node_count, s.condensed_edge_count
        ),
    )?;
    pretty_kv(w, "order", payload.topological_order.join(" -> "))?;
    writeln!(w)?;

    if let Some(source) = &payload.source_component {
        pretty_section(w, &format!("Shortest paths from {source}"))?;
        for d in &payload.distances {
            writeln!(w, "  {:<6} {}", d.component, format_distance(d.distance))?;
        }
        writeln!(w)?;
    }

    pretty_section(w, "Critical path")?;
    pretty_kv(w, "path", payload.critical_path.join(" -> "))?;
    pretty_kv(w, "length", payload.critical_path_length.to_string())?;
    writeln!(w)?;

    pretty_section(w, "Stage metrics")?;
    for st in &payload.stages {
        let elapsed = format_duration(std::time::Duration::from_nanos(st.elapsed_ns));
        writeln!(w, "  {:<16} {elapsed}", st.stage.name())?;
        for (op, n) in &st.operations {
            writeln!(w, "    {op:<20} {n:>10}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sccdag_core::{GraphBuilder, WeightModel};

    fn diamond() -> Graph {
        let mut b = GraphBuilder::new(WeightModel::Node);
        for (id, d) in [("A", 5.0), ("B", 3.0), ("C", 2.0), ("D", 4.0)] {
            b.add_node(id, d).expect("add node");
        }
        for (u, v, w) in [(0, 1, 2.0), (0, 2, 1.0), (1, 3, 3.0), (2, 3, 2.0)] {
            b.add_edge(u, v, w).expect("add edge");
        }
        b.build()
    }

    #[test]
    fn output_uses_node_ids_and_component_ids() {
        let g = diamond();
        let options = PipelineOptions {
            source: g.index_of("A"),
            budget: None,
        };
        let a = analyze(&g, &options).expect("analysis");
        let out = build_output(Path::new("diamond.json"), &g, &a);

        assert_eq!(out.components.len(), 4);
        // Tarjan closes D first.
        assert_eq!(out.components[0].members, vec!["D"]);
        assert_eq!(out.source_component.as_deref(), Some("C3"));
        assert_eq!(out.critical_path, vec!["C3", "C1", "C0"]);
        assert!((out.critical_path_length - 12.0).abs() < f64::EPSILON);
        assert_eq!(out.distances.len(), 4);
        assert_eq!(out.stages.len(), 5);
    }

    #[test]
    fn text_render_marks_unreachable() {
        let mut b = GraphBuilder::new(WeightModel::Edge);
        b.add_node("x", 0.0).expect("add x");
        b.add_node("y", 0.0).expect("add y");
        let g = b.build();
        let a = analyze(&g, &PipelineOptions::default()).expect("analysis");
        let out = build_output(Path::new("pair.json"), &g, &a);

        let mut buf = Vec::new();
        render_inspect_text(&out, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("unreachable"));
        assert!(text.starts_with("graph nodes=2 edges=0 model=edge sccs=2"));
    }

    #[test]
    fn pretty_render_has_every_section() {
        let g = diamond();
        let a = analyze(&g, &PipelineOptions::default()).expect("analysis");
        let out = build_output(Path::new("diamond.json"), &g, &a);

        let mut buf = Vec::new();
        render_inspect_pretty(&out, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        for heading in ["Graph", "Strongly connected components", "Condensation", "Critical path", "Stage metrics"] {
            assert!(text.contains(heading), "missing {heading}");
        }
    }
}
