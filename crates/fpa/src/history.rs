use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use fpa_core::trend::EstimateRecord;

const HISTORY_DIR: &str = ".fpa";
const HISTORY_FILE: &str = "history.ndjson";

/// Default history location for a project directory.
pub fn history_path(project_dir: &Path) -> PathBuf {
    project_dir.join(HISTORY_DIR).join(HISTORY_FILE)
}

/// Append an estimate record to `.fpa/history.ndjson`.
pub fn save_record(project_dir: &Path, record: &EstimateRecord) -> Result<PathBuf> {
    let dir = project_dir.join(HISTORY_DIR);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let line = serde_json::to_string(record).context("failed to serialize estimate record")?;

    let path = dir.join(HISTORY_FILE);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    writeln!(file, "{line}").context("failed to write estimate record")?;
    info!(path = %path.display(), "estimate record saved");

    Ok(path)
}

/// Load every record from an NDJSON history file, skipping malformed lines.
pub fn load_records(path: &Path) -> Result<Vec<EstimateRecord>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read line from history")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<EstimateRecord>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = number + 1, "skipping malformed history line: {e}"),
        }
    }

    Ok(records)
}

/// Keep only records for `project`; records without a project name always match.
pub fn filter_project(
    records: Vec<EstimateRecord>,
    project: Option<&str>,
) -> Vec<EstimateRecord> {
    match project {
        None => records,
        Some(name) => records
            .into_iter()
            .filter(|r| r.project.as_deref().map_or(true, |p| p == name))
            .collect(),
    }
}
