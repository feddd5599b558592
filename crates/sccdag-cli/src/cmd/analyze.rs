//! `sccdag analyze`: batch analysis of every dataset in a directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use sccdag_analysis::{PipelineOptions, analyze};
use sccdag_core::{ErrorCode, load_graph};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::load_config;
use crate::dataset::{Dataset, list_datasets};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use crate::report::{ResultRow, write_results};

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Directory holding `*.json` graph files (default from sccdag.toml).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// CSV file to write results to.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Wall-clock budget per dataset, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub budget_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct DatasetSummary {
    dataset: String,
    nodes: usize,
    edges: usize,
    weight_model: String,
    scc_count: usize,
    scc_sizes: Vec<usize>,
    condensed_nodes: usize,
    condensed_edges: usize,
    source_component: Option<String>,
    critical_path: Vec<String>,
    critical_path_length: f64,
    elapsed_ns: u64,
}

#[derive(Debug, Serialize)]
struct DatasetFailure {
    dataset: String,
    error_code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    data_dir: String,
    results_file: String,
    analyzed: Vec<DatasetSummary>,
    failed: Vec<DatasetFailure>,
}

/// Execute `sccdag analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let config = match load_config(project_root) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    let data_dir = project_root.join(args.data_dir.as_ref().unwrap_or(&config.data_dir));
    let results_path = project_root.join(args.output.clone().unwrap_or_else(|| config.results_path()));
    let budget = args
        .budget_ms
        .map(Duration::from_millis)
        .or_else(|| config.budget());

    let datasets = match list_datasets(&data_dir) {
        Ok(datasets) => datasets,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::DatasetUnreadable, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    info!(count = datasets.len(), dir = %data_dir.display(), "analyzing datasets");

    let mut rows = Vec::with_capacity(datasets.len());
    let mut payload = AnalyzeOutput {
        data_dir: data_dir.display().to_string(),
        results_file: results_path.display().to_string(),
        analyzed: Vec::new(),
        failed: Vec::new(),
    };

    for dataset in &datasets {
        match analyze_dataset(dataset, budget) {
            Ok((row, summary)) => {
                rows.push(row);
                payload.analyzed.push(summary);
            }
            Err(failure) => {
                warn!(
                    dataset = %failure.dataset,
                    code = failure.error_code,
                    "skipping dataset: {}",
                    failure.message
                );
                payload.failed.push(failure);
            }
        }
    }

    write_results(&results_path, &rows)?;

    if !quiet || output.is_json() {
        render_mode(output, &payload, render_analyze_text, render_analyze_pretty)?;
    }

    if !datasets.is_empty() && rows.is_empty() {
        anyhow::bail!("all {} datasets failed", datasets.len());
    }
    Ok(())
}

fn analyze_dataset(
    dataset: &Dataset,
    budget: Option<Duration>,
) -> Result<(ResultRow, DatasetSummary), DatasetFailure> {
    let fail = |code: ErrorCode, message: String| DatasetFailure {
        dataset: dataset.name.clone(),
        error_code: code.code(),
        message,
    };

    let loaded = load_graph(&dataset.path).map_err(|e| fail(e.code(), e.to_string()))?;
    let options = PipelineOptions {
        source: loaded.source,
        budget,
    };
    let analysis = analyze(&loaded.graph, &options).map_err(|e| fail(e.code(), e.to_string()))?;

    let graph = &loaded.graph;
    let condensed = &analysis.condensation.graph;
    let component_id = |c: usize| {
        condensed
            .node(c)
            .map_or_else(|| format!("C{c}"), |n| n.id.clone())
    };

    let summary = DatasetSummary {
        dataset: dataset.name.clone(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        weight_model: graph.weight_model().to_string(),
        scc_count: analysis.partition.len(),
        scc_sizes: analysis.partition.sizes(),
        condensed_nodes: condensed.node_count(),
        condensed_edges: condensed.edge_count(),
        source_component: analysis.source_component().map(component_id),
        critical_path: analysis.critical.path.iter().map(|&c| component_id(c)).collect(),
        critical_path_length: analysis.critical.length,
        elapsed_ns: u64::try_from(analysis.total_elapsed().as_nanos()).unwrap_or(u64::MAX),
    };
    let row = ResultRow::from_analysis(&dataset.name, graph, &analysis);
    Ok((row, summary))
}

fn render_analyze_text(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for s in &payload.analyzed {
        writeln!(
            w,
            "{}  nodes={} edges={} model={} sccs={} critical={}",
            s.dataset, s.nodes, s.edges, s.weight_model, s.scc_count, s.critical_path_length
        )?;
    }
    for f in &payload.failed {
        writeln!(w, "{}  error={} {}", f.dataset, f.error_code, f.message)?;
    }
    writeln!(w, "results: {}", payload.results_file)
}

fn render_analyze_pretty(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for s in &payload.analyzed {
        pretty_section(w, &format!("Dataset {}", s.dataset))?;
        pretty_kv(
            w,
            "graph",
            format!("{} nodes, {} edges, {} model", s.nodes, s.edges, s.weight_model),
        )?;
        let sizes: Vec<String> = s.scc_sizes.iter().map(ToString::to_string).collect();
        pretty_kv(w, "SCCs", format!("{} (sizes: {})", s.scc_count, sizes.join(", ")))?;
        pretty_kv(
            w,
            "condensation",
            format!("{} nodes, {} edges", s.condensed_nodes, s.condensed_edges),
        )?;
        pretty_kv(w, "source", s.source_component.as_deref().unwrap_or("-"))?;
        pretty_kv(
            w,
            "critical path",
            format!(
                "{} (length {})",
                s.critical_path.join(" -> "),
                s.critical_path_length
            ),
        )?;
        writeln!(w)?;
    }

    if !payload.failed.is_empty() {
        pretty_section(w, &format!("Skipped ({})", payload.failed.len()))?;
        for f in &payload.failed {
            writeln!(w, "  {} [{}] {}", f.dataset, f.error_code, f.message)?;
        }
        writeln!(w)?;
    }

    writeln!(
        w,
        "Analyzed {} of {} datasets; results written to {}",
        payload.analyzed.len(),
        payload.analyzed.len() + payload.failed.len(),
        payload.results_file
    )
}
