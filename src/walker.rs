//! Project tree traversal
//!
//! Single traversal of the scan root, consulting the path filter at every
//! entry. Files are grouped by containing directory; every directory that
//! holds at least one source file becomes one `RawModule`. Per-directory
//! extraction runs on a rayon worker pool; workers only produce values, the
//! write phase later in the run is the sole code that touches disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ignore::WalkBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::{CtxSyncError, Result};
use crate::extract::extract;
use crate::filter::PathFilter;
use crate::lang::{is_source_file, Lang};
use crate::schema::RawModule;

/// Cooperative cancellation token, checked at directory granularity
///
/// Cancelling discards the whole scan (`Err(Cancelled)`); partial results are
/// never written because all disk writes happen after the scan completes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of scanning a project root
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// One entry per source-bearing directory, keyed by relative path.
    /// BTreeMap keeps every later stage in sorted path order.
    pub modules: BTreeMap<String, RawModule>,
    /// Files skipped because they could not be read or parsed
    pub errors: Vec<PathBuf>,
}

/// Scan `root`, producing one `RawModule` per source-bearing directory
///
/// The root directory itself is never treated as a module. Fails with
/// `FatalFailure` when the root does not exist or is not a directory, and
/// with `Cancelled` when the token fires mid-scan.
pub fn scan(root: &Path, config: &ScanConfig, cancel: &CancelToken) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(CtxSyncError::FatalFailure {
            path: root.display().to_string(),
        });
    }

    let filter = PathFilter::new(config)?;
    let groups = collect_source_files(root, &filter)?;
    debug!(directories = groups.len(), "grouped source files");

    let results = match config.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| CtxSyncError::FatalFailure {
                    path: format!("failed to build worker pool: {}", e),
                })?;
            pool.install(|| extract_groups(root, &groups, cancel))
        }
        None => extract_groups(root, &groups, cancel),
    };

    if cancel.is_cancelled() {
        return Err(CtxSyncError::Cancelled);
    }

    let mut outcome = ScanOutcome::default();
    for (module, errors) in results {
        outcome.errors.extend(errors);
        outcome.modules.insert(module.path.clone(), module);
    }
    outcome.errors.sort();

    Ok(outcome)
}

/// Walk the tree once, grouping source files by containing directory
fn collect_source_files(
    root: &Path,
    filter: &PathFilter,
) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    // The filter only ever sees scan-root-relative paths; directory names in
    // ancestors of the root (a project under /tmp, a checkout inside a dir
    // named build) must not exclude anything.
    let entry_filter = filter.clone();
    let root_buf = root.to_path_buf();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            entry
                .path()
                .strip_prefix(&root_buf)
                .map(|rel| entry_filter.should_include(rel))
                .unwrap_or(true)
        })
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("walk error: {}", e);
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        if !is_source_file(path) {
            continue;
        }

        let rel_dir = match path.parent().and_then(|p| p.strip_prefix(root).ok()) {
            Some(p) => relative_key(p),
            None => continue,
        };
        // The root itself never becomes a module
        if rel_dir.is_empty() {
            continue;
        }

        groups.entry(rel_dir).or_default().push(path.to_path_buf());
    }

    for files in groups.values_mut() {
        files.sort();
    }

    Ok(groups)
}

/// Extract all directories in parallel; one `(RawModule, skipped)` per directory
fn extract_groups(
    root: &Path,
    groups: &BTreeMap<String, Vec<PathBuf>>,
    cancel: &CancelToken,
) -> Vec<(RawModule, Vec<PathBuf>)> {
    groups
        .par_iter()
        .filter_map(|(dir, files)| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(extract_directory(root, dir, files))
        })
        .collect()
}

/// Union the per-file extractions of one directory into a `RawModule`
fn extract_directory(
    root: &Path,
    dir: &str,
    files: &[PathBuf],
) -> (RawModule, Vec<PathBuf>) {
    let mut module = RawModule {
        path: dir.to_string(),
        ..Default::default()
    };
    let mut errors = Vec::new();

    for file in files {
        let rel = file
            .strip_prefix(root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| file.display().to_string());
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let lang = match Lang::from_path(file) {
            Ok(l) => l,
            Err(_) => continue,
        };

        // read() + explicit UTF-8 validation so an encoding error is a
        // per-file skip, not a run abort
        let source = match fs::read(file).map_err(|e| e.to_string()).and_then(|bytes| {
            String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))
        }) {
            Ok(s) => s,
            Err(message) => {
                warn!(file = %rel, "skipping unreadable file: {}", message);
                errors.push(file.clone());
                continue;
            }
        };

        module.source_files.push(file_name);

        match extract(file, &source, lang) {
            Ok(summary) => {
                module.symbols.extend(summary.symbols);
                module.imported_names.extend(summary.imports);
            }
            Err(e) => {
                warn!(file = %rel, "skipping unparseable file: {}", e);
                errors.push(file.clone());
            }
        }
    }

    (module, errors)
}

/// Relative path as a stable `/`-separated key
fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
