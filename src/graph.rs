//! Dependency graph construction
//!
//! Name-based heuristic matching: a module's imported names are intersected
//! with the set of known project directory names. A match must be exact and
//! must name a directory present in the current scan, so false positives are
//! impossible by construction; re-exports, aliases, and relative imports are
//! out of scope (false negatives are acceptable).

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::{DependencyEdge, RawModule};

/// Build the directed edge list `module -> depends_on`
///
/// Self-edges are dropped and duplicate edges deduplicated. Output is sorted,
/// so downstream rendering stays reproducible.
pub fn build_edges(modules: &BTreeMap<String, RawModule>) -> Vec<DependencyEdge> {
    // Known directory names: leaf name -> full relative path. When two
    // directories share a leaf name the lexicographically first wins, which
    // keeps resolution deterministic.
    let mut known: BTreeMap<&str, &str> = BTreeMap::new();
    for path in modules.keys() {
        let leaf = path.rsplit('/').next().unwrap_or(path);
        known.entry(leaf).or_insert(path);
    }

    let mut edges: BTreeSet<DependencyEdge> = BTreeSet::new();
    for (path, module) in modules {
        for import in &module.imported_names {
            if let Some(&target) = known.get(import.as_str()) {
                if target != path {
                    edges.insert(DependencyEdge {
                        from: path.clone(),
                        to: target.to_string(),
                    });
                }
            }
        }
    }

    edges.into_iter().collect()
}

/// Outgoing dependency targets per module, in sorted order
pub fn dependencies_of(edges: &[DependencyEdge]) -> BTreeMap<String, Vec<String>> {
    let mut deps: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in edges {
        deps.entry(edge.from.clone()).or_default().push(edge.to.clone());
    }
    deps
}
