//! ctxsync: descriptor synchronization for project trees
//!
//! This library walks a project tree, extracts the public surface of each
//! source directory with tree-sitter, builds a directory-level dependency
//! graph, detects naming conflicts, and synthesizes persistent descriptor
//! files: one `CONTEXT.llm` per source directory and one `PROJECT.llm` at
//! the root. Derived sections of existing descriptors are regenerated on
//! every run; human-authored sections are preserved byte-for-byte.
//!
//! # Supported Languages
//!
//! - Python
//! - TypeScript, TSX, JavaScript, JSX
//! - Rust
//! - Go
//!
//! # Example
//!
//! ```ignore
//! use ctxsync::{runner, ScanConfig};
//! use std::path::Path;
//!
//! let report = runner::run_analysis(Path::new("."), &ScanConfig::default())?;
//! for path in &report.written {
//!     println!("updated {}", path.display());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod conflict;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod filter;
pub mod fs_utils;
pub mod graph;
pub mod lang;
pub mod parsing;
pub mod project;
pub mod runlog;
pub mod runner;
pub mod schema;
pub mod walker;

// Re-export commonly used types
pub use config::{ScanConfig, MODULE_DESCRIPTOR_FILE, PROJECT_DESCRIPTOR_FILE};
pub use error::{CtxSyncError, Result};
pub use extract::{extract, FileSummary};
pub use lang::Lang;
pub use schema::{
    AnalysisReport, Conflict, ConflictKind, DependencyEdge, RawModule, Severity, Symbol,
    SymbolKind,
};
pub use walker::CancelToken;
