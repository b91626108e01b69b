//! Scan configuration
//!
//! All filtering state is carried in an explicit `ScanConfig` value handed to
//! the walker and path filter at construction time. Nothing is read from
//! process-wide state, so tests can build isolated configurations and the CLI
//! can apply per-invocation overrides.

use std::collections::BTreeSet;

/// Directory names excluded from analysis wherever they appear in a path
const DEFAULT_IGNORE_DIRS: &[&str] = &[
    // Virtual environments
    "venv",
    ".venv",
    "env",
    "ENV",
    ".env",
    // Python caches
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".cache",
    ".ipynb_checkpoints",
    // Distribution / build output
    "build",
    "dist",
    ".eggs",
    "target",
    // Testing and coverage artifacts
    ".tox",
    "htmlcov",
    ".nyc_output",
    // IDE and editor metadata
    ".idea",
    ".vscode",
    ".fleet",
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Package managers
    "node_modules",
    "vendor",
    // Tool-specific
    ".claude",
    ".ctxsync",
    ".next",
    ".nuxt",
    "tmp",
    "temp",
];

/// Glob patterns excluding individual path segments (compiled artifacts,
/// OS metadata, locks, logs)
const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    "*.pyc", "*.pyo", "*.pyd", "*.so", "*.dylib", "*.dll", "*.class", "*.egg-info", ".DS_Store",
    "*.log", "*.sqlite", "*.sqlite3", "*.db", "*.bak", "*.swp", "*.swo", "*~", "*.lock", "*.tmp",
];

/// Per-directory descriptor file name
pub const MODULE_DESCRIPTOR_FILE: &str = "CONTEXT.llm";

/// Project-level descriptor file name
pub const PROJECT_DESCRIPTOR_FILE: &str = "PROJECT.llm";

/// Configuration for one analysis run
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory names excluded at any nesting depth
    pub ignore_dirs: BTreeSet<String>,
    /// Glob patterns matched against individual path segments
    pub ignore_globs: Vec<String>,
    /// Worker count for the extraction stage; `None` uses the rayon default
    pub jobs: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            ignore_globs: DEFAULT_IGNORE_GLOBS.iter().map(|s| s.to_string()).collect(),
            jobs: None,
        }
    }
}

impl ScanConfig {
    /// Add an extra ignored directory name
    pub fn with_ignore_dir(mut self, name: impl Into<String>) -> Self {
        self.ignore_dirs.insert(name.into());
        self
    }

    /// Add an extra ignore glob pattern
    pub fn with_ignore_glob(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_globs.push(pattern.into());
        self
    }

    /// Set the extraction worker count
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_covers_common_noise() {
        let config = ScanConfig::default();
        assert!(config.ignore_dirs.contains(".git"));
        assert!(config.ignore_dirs.contains("venv"));
        assert!(config.ignore_dirs.contains("node_modules"));
        assert!(config.ignore_dirs.contains("__pycache__"));
        assert!(config.ignore_globs.iter().any(|g| g == "*.pyc"));
    }

    #[test]
    fn test_config_overrides() {
        let config = ScanConfig::default()
            .with_ignore_dir("generated")
            .with_ignore_glob("*.gen.ts")
            .with_jobs(2);
        assert!(config.ignore_dirs.contains("generated"));
        assert!(config.ignore_globs.iter().any(|g| g == "*.gen.ts"));
        assert_eq!(config.jobs, Some(2));
    }
}
