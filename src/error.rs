//! Error types and exit codes for ctxsync

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for ctxsync operations
///
/// Only `FatalFailure` and `Cancelled` abort a run. `ParseFailure` and
/// `IoFailure` are collected into the report's error list by the runner and
/// surface here only when a single-file API is used directly.
#[derive(Error, Debug)]
pub enum CtxSyncError {
    #[error("Root path not found or not a directory: {path}")]
    FatalFailure { path: String },

    #[error("Failed to parse {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    #[error("IO failure at {path}: {message}")]
    IoFailure { path: PathBuf, message: String },

    #[error("Unsupported language for extension: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CtxSyncError {
    /// Convert error to the exit code reported by the CLI:
    /// - 0: Success
    /// - 1: Fatal root / IO error
    /// - 2: Unsupported language
    /// - 3: Parse failure
    /// - 130: Cancelled
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FatalFailure { .. } => ExitCode::from(1),
            Self::IoFailure { .. } => ExitCode::from(1),
            Self::Io(_) => ExitCode::from(1),
            Self::UnsupportedLanguage { .. } => ExitCode::from(2),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::Cancelled => ExitCode::from(130),
        }
    }
}

/// Result type alias for ctxsync operations
pub type Result<T> = std::result::Result<T, CtxSyncError>;
