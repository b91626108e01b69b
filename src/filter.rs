//! Path filtering
//!
//! Decides whether a filesystem entry participates in analysis. The check is
//! evaluated per path segment, not only on the leaf name, so a cache
//! directory several levels deep is excluded the same as one at the root.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ScanConfig;
use crate::error::{CtxSyncError, Result};

/// Segment-wise include/exclude filter built from a `ScanConfig`
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignore_dirs: BTreeSet<String>,
    ignore_globs: GlobSet,
}

impl PathFilter {
    /// Compile the filter from a scan configuration
    ///
    /// Fails only when a configured glob pattern is invalid.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore_globs {
            let glob = Glob::new(pattern).map_err(|e| CtxSyncError::FatalFailure {
                path: format!("invalid ignore pattern '{}': {}", pattern, e),
            })?;
            builder.add(glob);
        }
        let ignore_globs = builder.build().map_err(|e| CtxSyncError::FatalFailure {
            path: format!("failed to compile ignore patterns: {}", e),
        })?;

        Ok(Self {
            ignore_dirs: config.ignore_dirs.clone(),
            ignore_globs,
        })
    }

    /// Whether a path should participate in analysis
    ///
    /// Pure function of the path string; never touches the filesystem.
    /// Expects paths relative to the scan root: every segment is checked, so
    /// an absolute path would also subject the root's ancestors to the
    /// ignore rules.
    pub fn should_include(&self, path: &Path) -> bool {
        for component in path.components() {
            let segment = component.as_os_str().to_string_lossy();
            if self.ignore_dirs.contains(segment.as_ref()) {
                return false;
            }
            if self.ignore_globs.is_match(Path::new(segment.as_ref())) {
                return false;
            }
        }
        true
    }
}
