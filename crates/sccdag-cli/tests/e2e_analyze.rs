//! E2E tests for `sccdag analyze` and `sccdag inspect`.
//!
//! Covers: batch CSV output, skipping bad datasets, exit status when every
//! dataset fails, config file defaults, and the inspect JSON schema.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn sccdag_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sccdag"));
    cmd.current_dir(dir);
    cmd.env("SCCDAG_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("SCCDAG_CONFIG");
    cmd
}

fn write(dir: &Path, rel: &str, body: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, body).expect("write");
}

const TASKS: &str = r#"{
  "directed": true, "n": 8,
  "edges": [
    {"u": 0, "v": 1, "w": 3}, {"u": 1, "v": 2, "w": 2}, {"u": 2, "v": 3, "w": 4},
    {"u": 3, "v": 1, "w": 1}, {"u": 4, "v": 5, "w": 2}, {"u": 5, "v": 6, "w": 5},
    {"u": 6, "v": 7, "w": 1}
  ],
  "source": 4, "weight_model": "edge"
}"#;

const PROJECT: &str = r#"{
  "nodes": [{"id": "A", "duration": 5}, {"id": "B", "duration": 3},
            {"id": "C", "duration": 2}, {"id": "D", "duration": 4}],
  "edges": [{"from": "A", "to": "B", "weight": 2}, {"from": "A", "to": "C", "weight": 1},
            {"from": "B", "to": "D", "weight": 3}, {"from": "C", "to": "D", "weight": 2}],
  "weight_model": "node"
}"#;

// ---------------------------------------------------------------------------
// sccdag analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_writes_one_row_per_dataset() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "data/tasks.json", TASKS);
    write(dir.path(), "data/project.json", PROJECT);

    sccdag_cmd(dir.path())
        .args(["analyze", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project.json"))
        .stdout(predicate::str::contains("tasks.json"));

    let csv = std::fs::read_to_string(dir.path().join("results/analysis_results.csv"))
        .expect("results csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Dataset,Nodes,Edges,WeightModel,SCCs,SCC_Time(ns)"));
    assert!(lines[0].ends_with("SP_Operations,CP_Time(ns),CP_Operations,CriticalPath_Length,Source_Node"));
    assert!(lines[1].starts_with("project.json,4,4,node,4,"));
    assert!(lines[1].ends_with(",12.0,0"));
    assert!(lines[2].starts_with("tasks.json,8,7,edge,6,"));
}

#[test]
fn analyze_skips_bad_datasets_and_succeeds() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "data/good.json", PROJECT);
    write(dir.path(), "data/broken.json", "{ nope");
    write(dir.path(), "data/dangling.json", r#"{"n": 1, "edges": [{"u": 0, "v": 4}]}"#);

    let output = sccdag_cmd(dir.path())
        .args(["analyze", "--json"])
        .output()
        .expect("analyze should not crash");
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["analyzed"].as_array().map(Vec::len), Some(1));
    let failed = json["failed"].as_array().expect("failed array");
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["dataset"], "broken.json");
    assert_eq!(failed[0]["error_code"], "E1002");
    assert_eq!(failed[1]["dataset"], "dangling.json");
    assert_eq!(failed[1]["error_code"], "E2001");

    let csv = std::fs::read_to_string(dir.path().join("results/analysis_results.csv"))
        .expect("results csv");
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn analyze_fails_when_every_dataset_fails() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "data/broken.json", "not json");

    sccdag_cmd(dir.path())
        .args(["analyze", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("all 1 datasets failed"));
}

#[test]
fn analyze_fails_on_missing_data_dir() {
    let dir = TempDir::new().expect("tempdir");

    sccdag_cmd(dir.path())
        .args(["analyze", "--json", "--data-dir", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn analyze_honours_config_and_flags() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "graphs/tasks.json", TASKS);
    write(
        dir.path(),
        "sccdag.toml",
        "data_dir = \"graphs\"\nresults_dir = \"out\"\nresults_file = \"r.csv\"\n",
    );

    sccdag_cmd(dir.path())
        .args(["analyze", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("out/r.csv").exists());

    sccdag_cmd(dir.path())
        .args(["analyze", "-q", "--output", "custom.csv"])
        .assert()
        .success();
    assert!(dir.path().join("custom.csv").exists());
}

#[test]
fn analyze_reports_malformed_config() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "data/tasks.json", TASKS);
    write(dir.path(), "sccdag.toml", "data_dir = [unclosed\n");

    sccdag_cmd(dir.path())
        .args(["analyze", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1003]"))
        .stderr(predicate::str::contains("sccdag.toml"));
    assert!(!dir.path().join("results/analysis_results.csv").exists());

    let output = sccdag_cmd(dir.path())
        .args(["analyze", "--json"])
        .output()
        .expect("analyze should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_end = stderr.find("\n}").map_or(stderr.len(), |i| i + 2);
    let json: Value = serde_json::from_str(&stderr[..json_end]).expect("JSON error on stderr");
    assert_eq!(json["error"]["error_code"], "E1003");
}

#[test]
fn analyze_empty_directory_writes_header_only() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir(dir.path().join("data")).expect("mkdir");

    sccdag_cmd(dir.path())
        .args(["analyze", "-q"])
        .assert()
        .success();

    let csv = std::fs::read_to_string(dir.path().join("results/analysis_results.csv"))
        .expect("results csv");
    assert_eq!(csv.lines().count(), 1);
}

// ---------------------------------------------------------------------------
// sccdag inspect
// ---------------------------------------------------------------------------

#[test]
fn inspect_json_reports_components_and_paths() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "tasks.json", TASKS);

    let output = sccdag_cmd(dir.path())
        .args(["inspect", "tasks.json", "--json"])
        .output()
        .expect("inspect should not crash");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["stats"]["node_count"], 8);
    assert_eq!(json["stats"]["scc_count"], 6);
    assert_eq!(json["stats"]["nontrivial_scc_count"], 1);
    assert_eq!(json["stats"]["weakly_connected_component_count"], 2);
    assert_eq!(json["weight_model"], "edge");

    // Source node 4 starts the chain 4 -> 5 -> 6 -> 7 (weights 2, 5, 1).
    let distances = json["distances"].as_array().expect("distances");
    let finite: Vec<f64> = distances
        .iter()
        .filter_map(|d| d["distance"].as_f64())
        .collect();
    assert_eq!(finite, vec![0.0, 2.0, 7.0, 8.0]);

    // 0 -> {1,2,3}: 3 + nothing beyond the cycle; 4 -> 5 -> 6 -> 7: 8.
    assert_eq!(json["critical_path_length"], 8.0);
    assert_eq!(json["stages"].as_array().map(Vec::len), Some(5));
}

#[test]
fn inspect_source_flag_selects_by_id() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "project.json", PROJECT);

    let output = sccdag_cmd(dir.path())
        .args(["inspect", "project.json", "--source", "C", "--json"])
        .output()
        .expect("inspect should not crash");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let reachable = json["distances"]
        .as_array()
        .expect("distances")
        .iter()
        .filter(|d| !d["distance"].is_null())
        .count();
    // C reaches only itself and D.
    assert_eq!(reachable, 2);
    assert_eq!(json["critical_path_length"], 12.0);
}

#[test]
fn inspect_unknown_source_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "project.json", PROJECT);

    sccdag_cmd(dir.path())
        .args(["inspect", "project.json", "--source", "Z", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn inspect_pretty_output_has_sections() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "project.json", PROJECT);

    sccdag_cmd(dir.path())
        .args(["inspect", "project.json", "--format", "pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strongly connected components"))
        .stdout(predicate::str::contains("Critical path"));
}
