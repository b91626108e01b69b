//! Project descriptor aggregation
//!
//! Builds the project-level descriptor from the per-module results: an
//! architecture listing annotated with each module's authored purpose, the
//! dependency graph, detected conflicts, and a capped change history. The
//! render is compared byte-for-byte against the previous document with the
//! previous timestamp and history substituted in; when nothing derived
//! changed, no new text (and so no history entry) is produced.

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::parse_sections_with;
use crate::graph;
use crate::schema::{Conflict, DependencyEdge, RawModule};

/// Maximum number of entries kept in `@recent_changes`
pub const HISTORY_LIMIT: usize = 10;

const KNOWN_MARKERS: &[&str] = &[
    "project",
    "version",
    "updated",
    "architecture",
    "dependency_graph",
    "conflicts",
    "test_coverage",
    "recent_changes",
];

/// Carried-over state parsed from the previous project descriptor
struct PreviousState {
    version: String,
    updated: String,
    history: Vec<String>,
    /// Raw text of sections with markers this tool does not manage
    extras: Vec<String>,
}

impl Default for PreviousState {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            updated: String::new(),
            history: Vec::new(),
            extras: Vec::new(),
        }
    }
}

/// Render the project descriptor, or `None` when it is unchanged
///
/// `now` is the timestamp recorded on change and `details` the history line
/// describing what this run did.
#[allow(clippy::too_many_arguments)]
pub fn render_project_descriptor(
    root_name: &str,
    modules: &BTreeMap<String, RawModule>,
    purposes: &BTreeMap<String, String>,
    edges: &[DependencyEdge],
    conflicts: &[Conflict],
    tested: &BTreeSet<String>,
    previous: Option<&str>,
    now: &str,
    details: &str,
) -> Option<String> {
    let state = previous.map(parse_previous).unwrap_or_default();
    let deps_map = graph::dependencies_of(edges);

    if let Some(prev_text) = previous {
        let unchanged = render(
            root_name,
            modules,
            purposes,
            &deps_map,
            conflicts,
            tested,
            &state.version,
            &state.updated,
            &state.history,
            &state.extras,
        );
        if unchanged == prev_text {
            return None;
        }
    }

    let mut history = Vec::with_capacity(HISTORY_LIMIT);
    history.push(format!("{now}: {details}"));
    history.extend(state.history.iter().take(HISTORY_LIMIT - 1).cloned());

    Some(render(
        root_name,
        modules,
        purposes,
        &deps_map,
        conflicts,
        tested,
        &state.version,
        now,
        &history,
        &state.extras,
    ))
}

fn parse_previous(text: &str) -> PreviousState {
    let mut state = PreviousState::default();
    let Some(sections) = parse_sections_with(text, |_| false) else {
        return state;
    };

    for section in sections {
        match section.marker.as_str() {
            "version" => {
                if let Some(v) = inline_value(&section.raw) {
                    state.version = v;
                }
            }
            "updated" => {
                if let Some(v) = inline_value(&section.raw) {
                    state.updated = v;
                }
            }
            "recent_changes" => {
                state.history = section
                    .raw
                    .lines()
                    .filter_map(|l| l.strip_prefix("- "))
                    .map(str::to_string)
                    .collect();
            }
            marker if !KNOWN_MARKERS.contains(&marker) => {
                state.extras.push(section.raw);
            }
            _ => {}
        }
    }
    state
}

/// Value after the colon on a `@marker: value` line
fn inline_value(raw: &str) -> Option<String> {
    let first = raw.lines().next()?;
    let value = first.splitn(2, ':').nth(1)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[allow(clippy::too_many_arguments)]
fn render(
    root_name: &str,
    modules: &BTreeMap<String, RawModule>,
    purposes: &BTreeMap<String, String>,
    deps_map: &BTreeMap<String, Vec<String>>,
    conflicts: &[Conflict],
    tested: &BTreeSet<String>,
    version: &str,
    updated: &str,
    history: &[String],
    extras: &[String],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("@project: {root_name}\n"));
    out.push_str(&format!("@version: {version}\n"));
    out.push_str(&format!("@updated: {updated}\n\n"));

    out.push_str("@architecture:\n");
    for path in modules.keys() {
        let purpose = purposes
            .get(path)
            .map(String::as_str)
            .unwrap_or("[Add module purpose]");
        match deps_map.get(path) {
            Some(deps) if !deps.is_empty() => {
                out.push_str(&format!("- {path}/: {purpose} [@deps: {}]\n", deps.join(", ")));
            }
            _ => out.push_str(&format!("- {path}/: {purpose}\n")),
        }
    }
    out.push('\n');

    out.push_str("@dependency_graph:\n");
    if deps_map.is_empty() {
        out.push_str("- none\n");
    } else {
        for (from, deps) in deps_map {
            out.push_str(&format!("{from} -> {}\n", deps.join(", ")));
        }
    }
    out.push('\n');

    out.push_str("@conflicts:\n");
    if conflicts.is_empty() {
        out.push_str("- none\n");
    } else {
        for conflict in conflicts {
            out.push_str(&format!(
                "- [{}] {} ({})\n",
                conflict.severity.label(),
                conflict.message,
                conflict.recommendation
            ));
        }
    }
    out.push('\n');

    out.push_str("@test_coverage:\n");
    for path in modules.keys() {
        let coverage = if tested.contains(path) {
            "baseline tests"
        } else {
            "no tests"
        };
        out.push_str(&format!("- {path}/: {coverage}\n"));
    }
    out.push('\n');

    for extra in extras {
        out.push_str(extra);
        if !extra.ends_with('\n') {
            out.push('\n');
        }
    }

    out.push_str("@recent_changes:\n");
    for entry in history {
        out.push_str(&format!("- {entry}\n"));
    }
    out
}
