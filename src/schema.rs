//! Core data model for the analysis pipeline
//!
//! Everything in this module is either rebuilt from the source tree on
//! every run (`RawModule`, `DependencyEdge`, `Conflict`) or describes the
//! structure of a persisted descriptor document (`Section`). Nothing here is
//! persisted incrementally.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of an extracted symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
}

/// A shallow symbol extracted from a source file
///
/// Extraction is top-level only: free functions, classes, and the public
/// methods one level inside a class body. Never hand-edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Set for `SymbolKind::Method`, absent otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owning_class: Option<String>,
}

impl Symbol {
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Function,
            name: name.into(),
            owning_class: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Class,
            name: name.into(),
            owning_class: None,
        }
    }

    pub fn method(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Method,
            name: name.into(),
            owning_class: Some(owner.into()),
        }
    }
}

/// One source-bearing directory, rebuilt from scratch every run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawModule {
    /// Directory path relative to the scan root, `/`-separated
    pub path: String,
    /// Source file names directly inside the directory, sorted
    pub source_files: Vec<String>,
    /// Union of symbols across all source files (file order, then in-file order)
    pub symbols: Vec<Symbol>,
    /// Deduplicated top-level names referenced by import statements
    pub imported_names: BTreeSet<String>,
}

/// A directed dependency between two project directories
///
/// Only exists when `to` is a directory present in the current scan, so the
/// graph never contains dangling edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

/// Kind of structural naming conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    DuplicateRole,
    SingularPluralPair,
}

/// Conflict severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }
}

/// A structural naming conflict detected by directory-set inspection
///
/// Conflicts are informational: they never block a run and are fully
/// regenerated each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub directories: Vec<String>,
    pub message: String,
    pub recommendation: String,
}

/// How a descriptor section is treated during merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// Recomputed from source every run; prior content is overwritten
    Derived,
    /// Human-authored prose; preserved byte-for-byte across merges
    Authored,
}

/// One marker-prefixed section of a descriptor document
///
/// `raw` holds the section's full original text (marker line plus body,
/// including any trailing blank lines), so authored sections can be copied
/// back verbatim during merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub marker: String,
    pub kind: SectionKind,
    pub raw: String,
}

/// Module type classification used for the `@type` derived field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Api,
    Data,
    Service,
    Util,
    Module,
}

impl ModuleType {
    /// Classify a directory path by name markers, most specific first
    pub fn classify(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.contains("api") {
            Self::Api
        } else if lower.contains("model") {
            Self::Data
        } else if lower.contains("service") {
            Self::Service
        } else if lower.contains("util") {
            Self::Util
        } else {
            Self::Module
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Data => "data",
            Self::Service => "service",
            Self::Util => "util",
            Self::Module => "module",
        }
    }
}

/// Outcome of one full analysis run, returned to the caller
///
/// The core never prints or exits; whether the collected errors should fail
/// the run is the caller's decision.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Descriptor files actually written this run, in write order
    pub written: Vec<PathBuf>,
    /// Conflicts detected in the current directory set
    pub conflicts: Vec<Conflict>,
    /// Files that failed to parse plus directories whose descriptor write failed
    pub errors: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_type_classification() {
        assert_eq!(ModuleType::classify("api"), ModuleType::Api);
        assert_eq!(ModuleType::classify("rest_api"), ModuleType::Api);
        assert_eq!(ModuleType::classify("models"), ModuleType::Data);
        assert_eq!(ModuleType::classify("auth_service"), ModuleType::Service);
        assert_eq!(ModuleType::classify("utils"), ModuleType::Util);
        assert_eq!(ModuleType::classify("auth"), ModuleType::Module);
    }

    #[test]
    fn test_symbol_constructors() {
        let m = Symbol::method("login", "AuthService");
        assert_eq!(m.kind, SymbolKind::Method);
        assert_eq!(m.owning_class.as_deref(), Some("AuthService"));

        let f = Symbol::function("main");
        assert!(f.owning_class.is_none());
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::High.label(), "HIGH");
        assert_eq!(Severity::Medium.label(), "MEDIUM");
    }
}
