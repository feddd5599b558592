//! Dataset discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// File name, used as the dataset identifier in reports.
    pub name: String,
    pub path: PathBuf,
}

/// Every `*.json` file directly inside `dir`, sorted by file name.
pub fn list_datasets(dir: &Path) -> Result<Vec<Dataset>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory {}", dir.display()))?;

    let mut datasets = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json || !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        datasets.push(Dataset { name, path });
    }

    datasets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(datasets)
}
