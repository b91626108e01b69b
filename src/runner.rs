//! Analysis orchestration
//!
//! Glues the pipeline together: scan the tree, build the dependency graph,
//! detect conflicts, then merge and write per-module descriptors followed by
//! the project descriptor. All computation happens before any write, so a
//! cancelled run leaves the tree untouched. Writes go through `fs_utils` and
//! are skipped when the rendered bytes match what is already on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::config::{ScanConfig, MODULE_DESCRIPTOR_FILE, PROJECT_DESCRIPTOR_FILE};
use crate::conflict::detect_conflicts;
use crate::descriptor::{purpose_line, render_module_descriptor};
use crate::error::{CtxSyncError, Result};
use crate::fs_utils::write_atomic;
use crate::graph::{build_edges, dependencies_of};
use crate::project::render_project_descriptor;
use crate::runlog::{self, RunLogEntry};
use crate::schema::{AnalysisReport, RawModule};
use crate::walker::{scan, CancelToken};

/// Run a full analysis and write descriptors under `root`
pub fn run_analysis(root: &Path, config: &ScanConfig) -> Result<AnalysisReport> {
    run(root, config, &CancelToken::new(), false)
}

/// Like [`run_analysis`], but honoring an external cancellation token
pub fn run_analysis_with_cancel(
    root: &Path,
    config: &ScanConfig,
    cancel: &CancelToken,
) -> Result<AnalysisReport> {
    run(root, config, cancel, false)
}

/// Dry run: report which descriptors would change without writing anything
pub fn check(root: &Path, config: &ScanConfig) -> Result<AnalysisReport> {
    run(root, config, &CancelToken::new(), true)
}

fn run(
    root: &Path,
    config: &ScanConfig,
    cancel: &CancelToken,
    dry_run: bool,
) -> Result<AnalysisReport> {
    let outcome = scan(root, config, cancel)?;
    let edges = build_edges(&outcome.modules);
    let conflicts = detect_conflicts(&outcome.modules);
    let deps_map = dependencies_of(&edges);

    info!(
        modules = outcome.modules.len(),
        edges = edges.len(),
        conflicts = conflicts.len(),
        "analysis complete"
    );

    let mut report = AnalysisReport {
        conflicts,
        errors: outcome.errors.clone(),
        ..Default::default()
    };
    let mut purposes: BTreeMap<String, String> = BTreeMap::new();
    let mut added = 0usize;
    let mut updated = 0usize;

    // Per-module descriptors, in deterministic path order
    for (path, module) in &outcome.modules {
        let dir = module_dir(root, path);
        let target = dir.join(MODULE_DESCRIPTOR_FILE);
        let existing = match read_optional(&target) {
            Ok(existing) => existing,
            Err(e) => {
                warn!(path = %target.display(), error = %e, "failed to read descriptor");
                report.errors.push(target);
                continue;
            }
        };

        let deps = deps_map.get(path).cloned().unwrap_or_default();
        let rendered = render_module_descriptor(module, &deps, existing.as_deref());
        if let Some(purpose) = purpose_line(&rendered) {
            purposes.insert(path.clone(), purpose);
        }

        if existing.as_deref() == Some(rendered.as_str()) {
            debug!(path = %target.display(), "descriptor unchanged");
            continue;
        }
        if existing.is_none() {
            added += 1;
        } else {
            updated += 1;
        }
        if !dry_run {
            if let Err(e) = write_atomic(&target, rendered.as_bytes()) {
                warn!(path = %target.display(), error = %e, "failed to write descriptor");
                report.errors.push(target);
                continue;
            }
        }
        report.written.push(target);
    }

    // Project-level descriptor
    let project_target = root.join(PROJECT_DESCRIPTOR_FILE);
    let previous = match read_optional(&project_target) {
        Ok(previous) => previous,
        Err(e) => {
            warn!(path = %project_target.display(), error = %e, "failed to read project descriptor");
            report.errors.push(project_target.clone());
            None
        }
    };
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let details = change_details(added, updated, previous.is_none());
    let tested = tested_modules(root, &outcome.modules);
    let rendered = render_project_descriptor(
        &root_name(root),
        &outcome.modules,
        &purposes,
        &edges,
        &report.conflicts,
        &tested,
        previous.as_deref(),
        &now,
        &details,
    );
    if let Some(text) = rendered {
        if !dry_run {
            if let Err(e) = write_atomic(&project_target, text.as_bytes()) {
                warn!(path = %project_target.display(), error = %e, "failed to write project descriptor");
                report.errors.push(project_target.clone());
            } else {
                report.written.push(project_target);
            }
        } else {
            report.written.push(project_target);
        }
    }

    report.errors.sort();
    report.errors.dedup();

    if !dry_run {
        let status = if report.errors.is_empty() { "ok" } else { "partial" };
        runlog::append(
            root,
            &RunLogEntry::new("sync", status, summary_line(&report)),
        );
    }

    Ok(report)
}

/// Modules with a baseline test file under the root `tests/` directory
///
/// A module counts as covered when `tests/` holds a file whose stem is
/// `test_<leaf>` or `test_baseline_<leaf>`.
fn tested_modules(root: &Path, modules: &BTreeMap<String, RawModule>) -> BTreeSet<String> {
    let mut stems = BTreeSet::new();
    if let Ok(entries) = std::fs::read_dir(root.join("tests")) {
        for entry in entries.flatten() {
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_string());
            }
        }
    }

    modules
        .keys()
        .filter(|path| {
            let leaf = path.rsplit('/').next().unwrap_or(path);
            stems.contains(&format!("test_{leaf}")) || stems.contains(&format!("test_baseline_{leaf}"))
        })
        .cloned()
        .collect()
}

fn module_dir(root: &Path, module_path: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for part in module_path.split('/') {
        dir.push(part);
    }
    dir
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CtxSyncError::IoFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// History line for the project descriptor describing what this run changed
fn change_details(added: usize, updated: usize, fresh_project: bool) -> String {
    match (added, updated) {
        (0, 0) if fresh_project => "Initial project descriptor".to_string(),
        (0, 0) => "Updated project structure".to_string(),
        (a, 0) => format!("Added {a} module descriptor(s)"),
        (0, u) => format!("Updated {u} module descriptor(s)"),
        (a, u) => format!("Added {a} and updated {u} module descriptor(s)"),
    }
}

fn summary_line(report: &AnalysisReport) -> String {
    format!(
        "{} file(s) written, {} conflict(s), {} error(s)",
        report.written.len(),
        report.conflicts.len(),
        report.errors.len()
    )
}

fn root_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_details_wording() {
        assert_eq!(change_details(0, 0, true), "Initial project descriptor");
        assert_eq!(change_details(0, 0, false), "Updated project structure");
        assert_eq!(change_details(2, 0, false), "Added 2 module descriptor(s)");
        assert_eq!(change_details(0, 3, false), "Updated 3 module descriptor(s)");
        assert_eq!(
            change_details(1, 1, false),
            "Added 1 and updated 1 module descriptor(s)"
        );
    }

    #[test]
    fn test_module_dir_joins_components() {
        let dir = module_dir(Path::new("/repo"), "src/auth");
        assert_eq!(dir, PathBuf::from("/repo/src/auth"));
    }
}
