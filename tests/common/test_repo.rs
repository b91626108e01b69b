//! TestRepo builder for integration tests
//!
//! Builds throwaway project trees and drives analysis through the library
//! API, so tests exercise the same code paths as the CLI without shelling
//! out to a binary.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use ctxsync::schema::AnalysisReport;
use ctxsync::{runner, ScanConfig};

pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new empty test repository
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the path to the test repository root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a source file with the given content, creating parent directories
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Add raw bytes (for invalid-encoding fixtures)
    pub fn add_bytes(&self, relative_path: &str, content: &[u8]) -> &Self {
        let full_path = self.dir.path().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Run a full sync over the repository root
    pub fn sync(&self) -> AnalysisReport {
        runner::run_analysis(self.path(), &ScanConfig::default()).expect("sync failed")
    }

    /// Run a dry-run check over the repository root
    pub fn check(&self) -> AnalysisReport {
        runner::check(self.path(), &ScanConfig::default()).expect("check failed")
    }

    /// Read a file relative to the repository root
    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative_path))
            .unwrap_or_else(|e| panic!("Failed to read {relative_path}: {e}"))
    }

    /// Whether a file exists relative to the repository root
    pub fn exists(&self, relative_path: &str) -> bool {
        self.dir.path().join(relative_path).exists()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
