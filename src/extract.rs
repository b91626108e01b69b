//! Shallow symbol and import extraction
//!
//! Walks top-level declarations only: free functions, classes, and the
//! methods one level inside a class body. Names beginning with an underscore
//! are treated as private and excluded; Rust uses `pub` and Go uses the
//! uppercase-initial convention for the same purpose. Import statements are
//! reduced to their first path segment and deduplicated.
//!
//! This is deliberately not a semantic analyzer: no type resolution, no
//! descent into function bodies, no alias tracking.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Result;
use crate::lang::Lang;
use crate::parsing::parse_source;
use crate::schema::Symbol;

/// Symbols and referenced module names extracted from one source file
#[derive(Debug, Clone, Default)]
pub struct FileSummary {
    pub symbols: Vec<Symbol>,
    pub imports: BTreeSet<String>,
}

/// Extract a shallow summary from one source file
///
/// Fails with `ParseFailure` when the grammar cannot be loaded or the parser
/// produces no tree; the walker logs that and skips the file.
pub fn extract(file_path: &Path, source: &str, lang: Lang) -> Result<FileSummary> {
    let tree = parse_source(file_path, source, lang)?;
    let root = tree.root_node();

    let mut summary = FileSummary::default();
    match lang {
        Lang::Python => extract_python(&mut summary, &root, source),
        Lang::TypeScript | Lang::Tsx | Lang::JavaScript | Lang::Jsx => {
            extract_javascript_family(&mut summary, &root, source)
        }
        Lang::Rust => extract_rust(&mut summary, &root, source),
        Lang::Go => extract_go(&mut summary, &root, source),
    }

    Ok(summary)
}

/// Python convention: names not starting with `_` are public
fn is_public_python(name: &str) -> bool {
    !name.starts_with('_')
}

/// First dotted segment of a module path (`a.b.c` -> `a`)
fn first_dotted_segment(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// First slash segment of a module specifier (`pkg/sub` -> `pkg`)
fn first_slash_segment(name: &str) -> &str {
    name.split('/').next().unwrap_or(name)
}

// ============================================================================
// Python
// ============================================================================

fn extract_python(summary: &mut FileSummary, root: &tree_sitter::Node, source: &str) {
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_definition" => python_function(summary, &child, source),
            "class_definition" => python_class(summary, &child, source),
            "decorated_definition" => {
                // Look through the decorator to the wrapped definition
                let mut inner_cursor = child.walk();
                for inner in child.children(&mut inner_cursor) {
                    match inner.kind() {
                        "function_definition" => python_function(summary, &inner, source),
                        "class_definition" => python_class(summary, &inner, source),
                        _ => {}
                    }
                }
            }
            "import_statement" => {
                let mut inner_cursor = child.walk();
                for inner in child.children(&mut inner_cursor) {
                    match inner.kind() {
                        "dotted_name" => {
                            let name = get_node_text(&inner, source);
                            summary.imports.insert(first_dotted_segment(&name).to_string());
                        }
                        "aliased_import" => {
                            if let Some(name_node) = inner.child_by_field_name("name") {
                                let name = get_node_text(&name_node, source);
                                summary.imports.insert(first_dotted_segment(&name).to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            "import_from_statement" => {
                if let Some(module) = child.child_by_field_name("module_name") {
                    // Relative imports resolve inside the same directory;
                    // they never name another project module.
                    if module.kind() == "dotted_name" {
                        let name = get_node_text(&module, source);
                        summary.imports.insert(first_dotted_segment(&name).to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

fn python_function(summary: &mut FileSummary, node: &tree_sitter::Node, source: &str) {
    if let Some(name_node) = node.child_by_field_name("name") {
        let name = get_node_text(&name_node, source);
        if is_public_python(&name) {
            summary.symbols.push(Symbol::function(name));
        }
    }
}

fn python_class(summary: &mut FileSummary, node: &tree_sitter::Node, source: &str) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let class_name = get_node_text(&name_node, source);
    if !is_public_python(&class_name) {
        return;
    }
    summary.symbols.push(Symbol::class(class_name.clone()));

    // One level deep: public methods directly inside the class body
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for item in body.children(&mut cursor) {
            let def = match item.kind() {
                "function_definition" => Some(item),
                "decorated_definition" => {
                    let mut inner_cursor = item.walk();
                    let wrapped = item
                        .children(&mut inner_cursor)
                        .find(|n| n.kind() == "function_definition");
                    wrapped
                }
                _ => None,
            };
            if let Some(def) = def {
                if let Some(method_name) = def.child_by_field_name("name") {
                    let name = get_node_text(&method_name, source);
                    if is_public_python(&name) {
                        summary.symbols.push(Symbol::method(name, class_name.clone()));
                    }
                }
            }
        }
    }
}

// ============================================================================
// JavaScript / TypeScript family
// ============================================================================

fn extract_javascript_family(summary: &mut FileSummary, root: &tree_sitter::Node, source: &str) {
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "export_statement" => {
                if let Some(decl) = child.child_by_field_name("declaration") {
                    js_declaration(summary, &decl, source);
                }
            }
            "import_statement" => {
                if let Some(src) = child.child_by_field_name("source") {
                    let spec = get_node_text(&src, source);
                    let spec = spec.trim_matches(|c| c == '"' || c == '\'');
                    // Relative specifiers stay within the module's own tree
                    if !spec.starts_with('.') && !spec.is_empty() {
                        summary.imports.insert(first_slash_segment(spec).to_string());
                    }
                }
            }
            _ => js_declaration(summary, &child, source),
        }
    }
}

fn js_declaration(summary: &mut FileSummary, node: &tree_sitter::Node, source: &str) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = get_node_text(&name_node, source);
                if !name.starts_with('_') {
                    summary.symbols.push(Symbol::function(name));
                }
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return;
            };
            let class_name = get_node_text(&name_node, source);
            if class_name.starts_with('_') {
                return;
            }
            summary.symbols.push(Symbol::class(class_name.clone()));

            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for item in body.children(&mut cursor) {
                    if item.kind() == "method_definition" {
                        if let Some(method_name) = item.child_by_field_name("name") {
                            let name = get_node_text(&method_name, source);
                            if !name.starts_with('_')
                                && !name.starts_with('#')
                                && name != "constructor"
                            {
                                summary.symbols.push(Symbol::method(name, class_name.clone()));
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Rust
// ============================================================================

fn extract_rust(summary: &mut FileSummary, root: &tree_sitter::Node, source: &str) {
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                if rust_is_pub(&child, source) {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        summary
                            .symbols
                            .push(Symbol::function(get_node_text(&name_node, source)));
                    }
                }
            }
            "struct_item" | "enum_item" | "trait_item" => {
                if rust_is_pub(&child, source) {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        summary
                            .symbols
                            .push(Symbol::class(get_node_text(&name_node, source)));
                    }
                }
            }
            "impl_item" => {
                let Some(type_node) = child.child_by_field_name("type") else {
                    continue;
                };
                let type_text = get_node_text(&type_node, source);
                // Drop generic arguments: `Store<T>` -> `Store`
                let owner = type_text.split('<').next().unwrap_or(&type_text).to_string();

                if let Some(body) = child.child_by_field_name("body") {
                    let mut inner_cursor = body.walk();
                    for item in body.children(&mut inner_cursor) {
                        if item.kind() == "function_item" && rust_is_pub(&item, source) {
                            if let Some(name_node) = item.child_by_field_name("name") {
                                summary.symbols.push(Symbol::method(
                                    get_node_text(&name_node, source),
                                    owner.clone(),
                                ));
                            }
                        }
                    }
                }
            }
            "use_declaration" => {
                if let Some(arg) = child.child_by_field_name("argument") {
                    let text = get_node_text(&arg, source);
                    let first = text
                        .trim_start_matches("::")
                        .split("::")
                        .next()
                        .unwrap_or("")
                        .trim()
                        .to_string();
                    // `crate`/`self`/`super` imports are intra-crate paths
                    if !first.is_empty()
                        && first != "crate"
                        && first != "self"
                        && first != "super"
                        && !first.starts_with('{')
                    {
                        summary.imports.insert(first);
                    }
                }
            }
            _ => {}
        }
    }
}

fn rust_is_pub(node: &tree_sitter::Node, source: &str) -> bool {
    let mut cursor = node.walk();
    let has_pub = node
        .children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier" && get_node_text(&c, source).starts_with("pub"));
    has_pub
}

// ============================================================================
// Go
// ============================================================================

fn extract_go(summary: &mut FileSummary, root: &tree_sitter::Node, source: &str) {
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        match child.kind() {
            "function_declaration" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = get_node_text(&name_node, source);
                    if go_is_exported(&name) {
                        summary.symbols.push(Symbol::function(name));
                    }
                }
            }
            "method_declaration" => {
                let Some(name_node) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = get_node_text(&name_node, source);
                if !go_is_exported(&name) {
                    continue;
                }
                if let Some(owner) = go_receiver_type(&child, source) {
                    summary.symbols.push(Symbol::method(name, owner));
                }
            }
            "type_declaration" => {
                let mut inner_cursor = child.walk();
                for spec in child.children(&mut inner_cursor) {
                    if spec.kind() == "type_spec" {
                        if let Some(name_node) = spec.child_by_field_name("name") {
                            let name = get_node_text(&name_node, source);
                            if go_is_exported(&name) {
                                summary.symbols.push(Symbol::class(name));
                            }
                        }
                    }
                }
            }
            "import_declaration" => go_imports(summary, &child, source),
            _ => {}
        }
    }
}

/// Go convention: exported names start with an uppercase letter
fn go_is_exported(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn go_receiver_type(node: &tree_sitter::Node, source: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    for param in receiver.children(&mut cursor) {
        if param.kind() == "parameter_declaration" {
            if let Some(type_node) = param.child_by_field_name("type") {
                let text = get_node_text(&type_node, source);
                return Some(text.trim_start_matches('*').to_string());
            }
        }
    }
    None
}

fn go_imports(summary: &mut FileSummary, node: &tree_sitter::Node, source: &str) {
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == "import_spec" {
            if let Some(path_node) = current.child_by_field_name("path") {
                let spec = get_node_text(&path_node, source);
                let spec = spec.trim_matches('"');
                if !spec.is_empty() {
                    summary.imports.insert(first_slash_segment(spec).to_string());
                }
            }
            continue;
        }
        let mut cursor = current.walk();
        for child in current.children(&mut cursor) {
            stack.push(child);
        }
    }
}

fn get_node_text(node: &tree_sitter::Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SymbolKind;

    fn extract_str(source: &str, lang: Lang) -> FileSummary {
        extract(Path::new("test_input"), source, lang).unwrap()
    }

    #[test]
    fn test_python_class_with_methods() {
        let source = r#"
import models
import os.path

class AuthService:
    def login(self, user):
        return user

    def _check(self):
        pass

def standalone():
    pass

def _private():
    pass
"#;
        let summary = extract_str(source, Lang::Python);

        assert_eq!(summary.symbols.len(), 3);
        assert_eq!(summary.symbols[0], Symbol::class("AuthService"));
        assert_eq!(summary.symbols[1], Symbol::method("login", "AuthService"));
        assert_eq!(summary.symbols[2], Symbol::function("standalone"));

        assert!(summary.imports.contains("models"));
        // `os.path` reduces to its first segment
        assert!(summary.imports.contains("os"));
        assert!(!summary.imports.contains("os.path"));
    }

    #[test]
    fn test_python_from_import_and_relative() {
        let source = "from models.user import User\nfrom . import helpers\n";
        let summary = extract_str(source, Lang::Python);
        assert!(summary.imports.contains("models"));
        assert_eq!(summary.imports.len(), 1);
    }

    #[test]
    fn test_python_decorated_definitions() {
        let source = "@app.route('/x')\ndef handler():\n    pass\n";
        let summary = extract_str(source, Lang::Python);
        assert_eq!(summary.symbols, vec![Symbol::function("handler")]);
    }

    #[test]
    fn test_python_decorated_methods_inside_class() {
        let source = "class Repo:\n    @property\n    def count(self):\n        return 0\n\n    @staticmethod\n    def _hidden():\n        pass\n";
        let summary = extract_str(source, Lang::Python);
        assert_eq!(
            summary.symbols,
            vec![Symbol::class("Repo"), Symbol::method("count", "Repo")]
        );
    }

    #[test]
    fn test_python_private_class_skipped_entirely() {
        let source = "class _Internal:\n    def visible(self):\n        pass\n";
        let summary = extract_str(source, Lang::Python);
        assert!(summary.symbols.is_empty());
    }

    #[test]
    fn test_typescript_exports_and_imports() {
        let source = r#"
import { api } from "client/http";
import local from "./local";

export function fetchUsers() {}

export class UserStore {
    load() {}
    _flush() {}
}

function internalOnly() {}
"#;
        let summary = extract_str(source, Lang::TypeScript);

        let names: Vec<&str> = summary.symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"fetchUsers"));
        assert!(names.contains(&"UserStore"));
        assert!(names.contains(&"load"));
        assert!(!names.contains(&"_flush"));
        // Non-exported top-level declarations are still top-level symbols
        assert!(names.contains(&"internalOnly"));

        assert!(summary.imports.contains("client"));
        assert!(!summary.imports.iter().any(|i| i.starts_with('.')));
    }

    #[test]
    fn test_rust_visibility_filter() {
        let source = r#"
use serde::Serialize;
use crate::schema::Symbol;

pub struct Store;

impl Store {
    pub fn get(&self) {}
    fn evict(&self) {}
}

pub fn open() {}

fn helper() {}
"#;
        let summary = extract_str(source, Lang::Rust);

        assert_eq!(
            summary.symbols,
            vec![
                Symbol::class("Store"),
                Symbol::method("get", "Store"),
                Symbol::function("open"),
            ]
        );
        assert!(summary.imports.contains("serde"));
        assert!(!summary.imports.contains("crate"));
    }

    #[test]
    fn test_go_exported_only() {
        let source = r#"
package store

import (
    "fmt"
    "example.com/proj/models"
)

type Store struct{}

func (s *Store) Get() {}

func (s *Store) evict() {}

func Open() {}

func helper() {}
"#;
        let summary = extract_str(source, Lang::Go);

        let kinds: Vec<SymbolKind> = summary.symbols.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SymbolKind::Class, SymbolKind::Method, SymbolKind::Function]
        );
        assert_eq!(summary.symbols[1].owning_class.as_deref(), Some("Store"));
        assert!(summary.imports.contains("fmt"));
        assert!(summary.imports.contains("example.com"));
    }

    #[test]
    fn test_empty_file() {
        let summary = extract_str("", Lang::Python);
        assert!(summary.symbols.is_empty());
        assert!(summary.imports.is_empty());
    }
}
