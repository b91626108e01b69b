//! Structural naming conflict detection
//!
//! Two heuristics over the directory set, both re-derived from scratch every
//! run. Conflicts are informational only; they never block a run.

use std::collections::BTreeMap;
use std::path::Path;

use crate::schema::{Conflict, ConflictKind, RawModule, Severity};

/// Semantic role marker words; a directory leaf name containing the marker
/// maps to the role
const ROLE_MARKERS: &[(&str, &str)] = &[
    ("test", "test"),
    ("config", "configuration"),
    ("util", "utility"),
    ("doc", "documentation"),
    ("script", "script"),
];

/// Inspect the directory set for structural smells
pub fn detect_conflicts(modules: &BTreeMap<String, RawModule>) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    conflicts.extend(detect_role_duplicates(modules));
    conflicts.extend(detect_singular_plural_pairs(modules));
    conflicts
}

/// Role duplication: more than one directory serving the same semantic role
///
/// The lexicographically first directory is recommended as canonical.
fn detect_role_duplicates(modules: &BTreeMap<String, RawModule>) -> Vec<Conflict> {
    let mut by_role: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for path in modules.keys() {
        let leaf = leaf_name(path);
        for (marker, role) in ROLE_MARKERS {
            if leaf.contains(marker) {
                by_role.entry(role).or_default().push(path);
                break;
            }
        }
    }

    by_role
        .into_iter()
        .filter(|(_, dirs)| dirs.len() > 1)
        .map(|(role, dirs)| {
            let directories: Vec<String> = dirs.iter().map(|d| d.to_string()).collect();
            // BTreeMap keys arrive sorted, so the first is canonical
            let canonical = directories[0].clone();
            Conflict {
                kind: ConflictKind::DuplicateRole,
                severity: Severity::High,
                message: format!(
                    "multiple directories serve the '{}' role: {}",
                    role,
                    directories.join(", ")
                ),
                recommendation: format!("consolidate into '{}'", canonical),
                directories,
            }
        })
        .collect()
}

/// Singular/plural pairing at the same nesting level
///
/// Recommends the plural form as canonical: a consistency bias, not a
/// correctness judgment.
fn detect_singular_plural_pairs(modules: &BTreeMap<String, RawModule>) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for path in modules.keys() {
        let leaf = leaf_name(path);
        let Some(singular_leaf) = leaf.strip_suffix('s') else {
            continue;
        };
        if singular_leaf.is_empty() {
            continue;
        }

        let singular_path = sibling_path(path, singular_leaf);
        if modules.contains_key(&singular_path) {
            conflicts.push(Conflict {
                kind: ConflictKind::SingularPluralPair,
                severity: Severity::Medium,
                message: format!(
                    "'{}' and '{}' exist at the same level",
                    singular_path, path
                ),
                recommendation: format!("prefer the plural form '{}'", path),
                directories: vec![singular_path, path.clone()],
            });
        }
    }

    conflicts
}

fn leaf_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_lowercase()
}

/// Replace the leaf of `path` with `leaf`, keeping the parent
fn sibling_path(path: &str, leaf: &str) -> String {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            format!("{}/{}", parent.display(), leaf)
        }
        _ => leaf.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(paths: &[&str]) -> BTreeMap<String, RawModule> {
        paths
            .iter()
            .map(|p| {
                (
                    p.to_string(),
                    RawModule {
                        path: p.to_string(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_duplicate_test_role_is_one_high_conflict() {
        let conflicts = detect_conflicts(&modules(&["app", "testing", "tests_old"]));

        let role: Vec<&Conflict> = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::DuplicateRole)
            .collect();
        assert_eq!(role.len(), 1);
        assert_eq!(role[0].severity, Severity::High);
        assert_eq!(role[0].directories, vec!["testing", "tests_old"]);
        assert!(role[0].recommendation.contains("testing"));
    }

    #[test]
    fn test_config_role_duplicates() {
        let conflicts = detect_conflicts(&modules(&["config", "configs", "app"]));
        let role: Vec<&Conflict> = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::DuplicateRole)
            .collect();
        assert_eq!(role.len(), 1);
        assert!(role[0].message.contains("configuration"));
    }

    #[test]
    fn test_singular_plural_pair_is_one_medium_conflict() {
        let conflicts = detect_conflicts(&modules(&["model", "models", "app"]));

        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.kind, ConflictKind::SingularPluralPair);
        assert_eq!(c.severity, Severity::Medium);
        assert_eq!(c.directories, vec!["model", "models"]);
        assert!(c.recommendation.contains("models"));
    }

    #[test]
    fn test_singular_plural_requires_same_level() {
        // `model` and `nested/models` are not siblings
        let conflicts = detect_conflicts(&modules(&["model", "nested/models"]));
        assert!(conflicts
            .iter()
            .all(|c| c.kind != ConflictKind::SingularPluralPair));
    }

    #[test]
    fn test_nested_singular_plural_pair() {
        let conflicts = detect_conflicts(&modules(&["src/model", "src/models"]));
        let pairs: Vec<&Conflict> = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::SingularPluralPair)
            .collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].directories, vec!["src/model", "src/models"]);
    }

    #[test]
    fn test_clean_tree_has_no_conflicts() {
        let conflicts = detect_conflicts(&modules(&["auth", "models", "api"]));
        assert!(conflicts.is_empty());
    }
}
