//! `sccdag.toml` loading.
//!
//! Every field is optional; a missing file means all defaults. The
//! `SCCDAG_CONFIG` environment variable points at an explicit file, which
//! must then exist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "sccdag.toml";
pub const CONFIG_ENV: &str = "SCCDAG_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_results_file")]
    pub results_file: String,
    /// Wall-clock budget per dataset, in milliseconds.
    #[serde(default)]
    pub budget_ms: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            results_file: default_results_file(),
            budget_ms: None,
        }
    }
}

impl AnalysisConfig {
    /// `results_dir/results_file`, relative to the project root.
    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join(&self.results_file)
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget_ms.map(Duration::from_millis)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_results_file() -> String {
    "analysis_results.csv".to_string()
}

/// Load the configuration for `project_root`, honouring `SCCDAG_CONFIG`.
pub fn load_config(project_root: &Path) -> Result<AnalysisConfig> {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    load_config_inner(project_root, env_path.as_deref())
}

fn load_config_inner(project_root: &Path, explicit: Option<&Path>) -> Result<AnalysisConfig> {
    let path = match explicit {
        Some(path) => project_root.join(path),
        None => {
            let path = project_root.join(CONFIG_FILE);
            if !path.exists() {
                return Ok(AnalysisConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
