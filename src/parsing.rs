//! Tree-sitter parsing entry point
//!
//! Wraps parser construction and the parse call so extraction code only ever
//! sees a finished `Tree`. A file that cannot be parsed yields a
//! `ParseFailure`; callers treat that as a non-fatal skip.

use std::path::Path;

use tree_sitter::Tree;

use crate::error::{CtxSyncError, Result};
use crate::lang::Lang;

/// Parse source text into a syntax tree for the given language
pub fn parse_source(file_path: &Path, source: &str, lang: Lang) -> Result<Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang.tree_sitter_language())
        .map_err(|e| CtxSyncError::ParseFailure {
            path: file_path.to_path_buf(),
            message: format!("failed to load {} grammar: {:?}", lang.name(), e),
        })?;

    parser
        .parse(source, None)
        .ok_or_else(|| CtxSyncError::ParseFailure {
            path: file_path.to_path_buf(),
            message: "parser returned no tree".to_string(),
        })
}
