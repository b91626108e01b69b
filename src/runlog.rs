//! Append-only run log
//!
//! Each analysis run appends one JSON line under `.ctxsync/run.log` in the
//! project root. Logging is best-effort: a failure to record a run is
//! reported at warn level and never fails the run itself.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

const LOG_DIR: &str = ".ctxsync";
const LOG_FILE: &str = "run.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub timestamp: String,
    pub action: String,
    pub status: String,
    pub details: String,
}

impl RunLogEntry {
    pub fn new(action: &str, status: &str, details: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            status: status.to_string(),
            details: details.into(),
        }
    }
}

/// Append one entry to the run log under `root`, best-effort
pub fn append(root: &Path, entry: &RunLogEntry) {
    if let Err(e) = try_append(root, entry) {
        warn!(error = %e, "failed to append run log entry");
    }
}

fn try_append(root: &Path, entry: &RunLogEntry) -> std::io::Result<()> {
    let dir = root.join(LOG_DIR);
    std::fs::create_dir_all(&dir)?;
    let line = serde_json::to_string(entry)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    writeln!(file, "{line}")
}
