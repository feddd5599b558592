#![forbid(unsafe_code)]

mod cmd;
mod config;
mod dataset;
mod output;
mod report;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sccdag: strongly connected components and DAG path analysis",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (unless SCCDAG_LOG is set).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Analyze every dataset in a directory",
        long_about = "Run SCC decomposition, condensation, topological sort and path analysis on every *.json graph in the data directory, then write one CSV row per dataset.",
        after_help = "EXAMPLES:\n    # Analyze ./data and write results/analysis_results.csv\n    sccdag analyze\n\n    # Custom locations with a 500ms budget per dataset\n    sccdag analyze --data-dir graphs --output out.csv --budget-ms 500"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Show a detailed report for one graph",
        long_about = "Analyze a single graph document and print its components, topological order, shortest distances, critical path and stage metrics.",
        after_help = "EXAMPLES:\n    # Inspect a graph\n    sccdag inspect data/tasks.json\n\n    # Choose the shortest-path source by node id\n    sccdag inspect data/tasks.json --source A --format json"
    )]
    Inspect(cmd::inspect::InspectArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SCCDAG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "sccdag=debug,info"
        } else {
            "sccdag=info,warn"
        })
    });

    let format = env::var("SCCDAG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let output = resolve_output_mode(cli.format, cli.json);
    debug!(?output, "resolved output mode");

    match cli.command {
        Commands::Analyze(ref args) => {
            cmd::analyze::run_analyze(args, output, cli.quiet, &project_root)
        }
        Commands::Inspect(ref args) => cmd::inspect::run_inspect(args, output, &project_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["sccdag", "--json", "analyze"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["sccdag", "inspect", "g.json", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_takes_a_value() {
        let cli = Cli::parse_from(["sccdag", "--format", "text", "analyze"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn inspect_requires_a_file() {
        assert!(Cli::try_parse_from(["sccdag", "inspect"]).is_err());
        let cli = Cli::parse_from(["sccdag", "inspect", "g.json", "--source", "A"]);
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.file, std::path::PathBuf::from("g.json"));
                assert_eq!(args.source.as_deref(), Some("A"));
            }
            Commands::Analyze(_) => panic!("expected inspect"),
        }
    }

    #[test]
    fn quiet_and_verbose_are_global() {
        let cli = Cli::parse_from(["sccdag", "analyze", "-q", "-v"]);
        assert!(cli.quiet);
        assert!(cli.verbose);
    }
}
