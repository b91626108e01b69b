//! Module descriptor format: parsing, rendering, and merge
//!
//! A descriptor is a line-oriented document of marker-prefixed sections. A
//! section starts at a `@marker:` line and runs until the next marker or end
//! of file. Derived sections (`@component`, `@type`, `@deps`, `@interface`)
//! are recomputed from source every run; everything else is authored and
//! preserved byte-for-byte across merges. The split is enforced through
//! `SectionKind`, so merge policy lives here and nowhere else.

use std::collections::BTreeSet;

use crate::schema::{ModuleType, RawModule, Section, SectionKind, Symbol, SymbolKind};

/// Markers whose content is always recomputed from source
pub const DERIVED_MARKERS: &[&str] = &["component", "type", "deps", "interface"];

/// Whether a module-descriptor marker is derived (vs authored)
pub fn is_derived_marker(marker: &str) -> bool {
    DERIVED_MARKERS.contains(&marker)
}

/// Parse a descriptor into its section sequence
///
/// Returns `None` only when the text contains no marker sections at all;
/// callers treat that as an absent descriptor and synthesize a fresh one.
/// Content before the first marker is kept as an authored preamble section
/// (empty marker name), so hand-written prose at the top of a descriptor
/// survives the merge.
pub fn parse_sections(text: &str) -> Option<Vec<Section>> {
    parse_sections_with(text, is_derived_marker)
}

/// Parse with a caller-supplied derived/authored classification
pub fn parse_sections_with(
    text: &str,
    is_derived: impl Fn(&str) -> bool,
) -> Option<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();
    let mut preamble = String::new();

    for line in text.split_inclusive('\n') {
        if let Some(marker) = marker_of(line) {
            if !preamble.is_empty() {
                sections.push(Section {
                    marker: String::new(),
                    kind: SectionKind::Authored,
                    raw: std::mem::take(&mut preamble),
                });
            }
            sections.push(Section {
                kind: if is_derived(&marker) {
                    SectionKind::Derived
                } else {
                    SectionKind::Authored
                },
                marker,
                raw: line.to_string(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.raw.push_str(line);
        } else {
            preamble.push_str(line);
        }
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections)
    }
}

/// Extract the marker name from a `@marker: ...` line, if it is one
fn marker_of(line: &str) -> Option<String> {
    let rest = line.strip_prefix('@')?;
    let colon = rest.find(':')?;
    let marker = &rest[..colon];
    if marker.is_empty()
        || !marker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some(marker.to_string())
}

/// Synthesize the on-disk text for one module descriptor
///
/// With no existing descriptor this builds a fresh document with authored
/// placeholders. With one, this is a merge: derived sections are rebuilt from
/// `module`, authored sections are copied verbatim in their original relative
/// order, and derived markers missing from the existing document are appended.
/// An unparseable existing descriptor is treated as absent.
pub fn render_module_descriptor(
    module: &RawModule,
    deps: &[String],
    existing: Option<&str>,
) -> String {
    let sections = existing.and_then(parse_sections);

    match sections {
        Some(sections) => merge_sections(module, deps, &sections),
        None => fresh_descriptor(module, deps),
    }
}

fn fresh_descriptor(module: &RawModule, deps: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&derived_raw("component", module, deps));
    out.push_str(&derived_raw("type", module, deps));
    out.push_str(&derived_raw("deps", module, deps));
    out.push_str("@purpose: [Add module purpose]\n\n");
    out.push_str(&derived_raw("interface", module, deps));
    out.push_str("@behavior:\n- [Add key behavior]\n- [Add error handling]\n- [Add performance notes]\n");
    out
}

fn merge_sections(module: &RawModule, deps: &[String], sections: &[Section]) -> String {
    let mut out = String::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for section in sections {
        match section.kind {
            SectionKind::Derived => {
                // Duplicate derived markers collapse into one
                if let Some(marker) = DERIVED_MARKERS.iter().find(|m| **m == section.marker) {
                    if seen.insert(marker) {
                        out.push_str(&derived_raw(marker, module, deps));
                    }
                }
            }
            SectionKind::Authored => out.push_str(&section.raw),
        }
    }

    for marker in DERIVED_MARKERS {
        if !seen.contains(marker) {
            if !out.ends_with("\n\n") && !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&derived_raw(marker, module, deps));
        }
    }

    out
}

/// Render one derived section, including its trailing separator
fn derived_raw(marker: &str, module: &RawModule, deps: &[String]) -> String {
    match marker {
        "component" => format!("@component: {}\n", component_name(&module.path)),
        "type" => format!("@type: {}\n", ModuleType::classify(&module.path).as_str()),
        "deps" => format!("@deps: [{}]\n", deps.join(", ")),
        "interface" => {
            let mut out = String::from("@interface:\n");
            for line in interface_lines(&module.symbols) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push('\n');
            out
        }
        _ => unreachable!("unknown derived marker: {marker}"),
    }
}

/// Interface listing: classes with their methods first, then free functions
fn interface_lines(symbols: &[Symbol]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut emitted: BTreeSet<String> = BTreeSet::new();
    for class in symbols.iter().filter(|s| s.kind == SymbolKind::Class) {
        if !emitted.insert(format!("class {}", class.name)) {
            continue;
        }
        lines.push(format!("- class {}", class.name));
        let mut method_seen: BTreeSet<&str> = BTreeSet::new();
        for method in symbols.iter().filter(|s| {
            s.kind == SymbolKind::Method && s.owning_class.as_deref() == Some(class.name.as_str())
        }) {
            if method_seen.insert(method.name.as_str()) {
                lines.push(format!("  - {}()", method.name));
            }
        }
    }
    for function in symbols.iter().filter(|s| s.kind == SymbolKind::Function) {
        if emitted.insert(format!("fn {}", function.name)) {
            lines.push(format!("- {}()", function.name));
        }
    }
    lines
}

/// Component display name from the directory leaf: `user_api` -> `UserApi`
fn component_name(path: &str) -> String {
    let leaf = path.rsplit('/').next().unwrap_or(path);
    leaf.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// First line of a descriptor's `@purpose` section, skipping placeholders
///
/// Used by the project aggregator to annotate the architecture listing.
pub fn purpose_line(text: &str) -> Option<String> {
    let sections = parse_sections(text)?;
    let purpose = sections.iter().find(|s| s.marker == "purpose")?;
    let first_line = purpose.raw.lines().next()?;
    let value = first_line.splitn(2, ':').nth(1)?.trim();
    if value.is_empty() || value.starts_with('[') {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Symbol;

    fn auth_module() -> RawModule {
        RawModule {
            path: "auth".to_string(),
            source_files: vec!["service.py".to_string()],
            symbols: vec![
                Symbol::class("AuthService"),
                Symbol::method("login", "AuthService"),
                Symbol::function("issue_token"),
            ],
            imported_names: ["models".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn test_fresh_descriptor_layout() {
        let text = render_module_descriptor(&auth_module(), &["models".to_string()], None);

        assert!(text.starts_with("@component: Auth\n"));
        assert!(text.contains("@type: module\n"));
        assert!(text.contains("@deps: [models]\n"));
        assert!(text.contains("@purpose: [Add module purpose]\n"));
        assert!(text.contains("@interface:\n- class AuthService\n  - login()\n- issue_token()\n"));
        assert!(text.contains("@behavior:\n- [Add key behavior]\n"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let module = auth_module();
        let deps = vec!["models".to_string()];
        let first = render_module_descriptor(&module, &deps, None);
        let second = render_module_descriptor(&module, &deps, Some(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_preserves_authored_purpose() {
        let module = auth_module();
        let deps = vec!["models".to_string()];
        let original = render_module_descriptor(&module, &deps, None);
        let edited = original.replace(
            "@purpose: [Add module purpose]",
            "@purpose: Session and credential handling",
        );

        // Source change: a new public function appears
        let mut changed = module.clone();
        changed.symbols.push(Symbol::function("logout"));

        let merged = render_module_descriptor(&changed, &deps, Some(&edited));
        assert!(merged.contains("@purpose: Session and credential handling\n"));
        assert!(merged.contains("- logout()"));
    }

    #[test]
    fn test_merge_preserves_unknown_sections_and_order() {
        let module = auth_module();
        let deps: Vec<String> = Vec::new();
        let existing = "@component: Old\n@type: module\n@deps: []\n@purpose: Does auth\n\n@security_notes:\n- tokens expire after 1h\n\n@interface:\n- old()\n\n@behavior:\n- retries twice\n";

        let merged = render_module_descriptor(&module, &deps, Some(existing));

        assert!(merged.contains("@security_notes:\n- tokens expire after 1h\n"));
        assert!(merged.contains("@behavior:\n- retries twice\n"));
        // Derived interface was rebuilt, the stale entry dropped
        assert!(!merged.contains("- old()"));
        assert!(merged.contains("- class AuthService"));
        // Authored relative order: purpose before security_notes before behavior
        let p = merged.find("@purpose").unwrap();
        let s = merged.find("@security_notes").unwrap();
        let b = merged.find("@behavior").unwrap();
        assert!(p < s && s < b);
    }

    #[test]
    fn test_leading_prose_kept_as_authored_preamble() {
        let module = auth_module();
        let existing = "Internal auth notes, do not remove.\n\n@component: Old\n@purpose: Does auth\n";
        let merged = render_module_descriptor(&module, &[], Some(existing));

        assert!(merged.starts_with("Internal auth notes, do not remove.\n\n"));
        assert!(merged.contains("@purpose: Does auth\n"));
        // Derived content is still regenerated behind the preamble
        assert!(merged.contains("@component: Auth\n"));
        assert!(!merged.contains("@component: Old"));

        // Round trip: raws reproduce the input, preamble included
        let sections = parse_sections(existing).unwrap();
        assert_eq!(sections[0].marker, "");
        assert_eq!(sections[0].kind, SectionKind::Authored);
        let rebuilt: String = sections.iter().map(|s| s.raw.as_str()).collect();
        assert_eq!(rebuilt, existing);
    }

    #[test]
    fn test_unparseable_existing_treated_as_absent() {
        let module = auth_module();
        let merged =
            render_module_descriptor(&module, &[], Some("just some prose, no markers at all"));
        assert!(merged.starts_with("@component: Auth\n"));
        assert!(merged.contains("@purpose: [Add module purpose]\n"));
    }

    #[test]
    fn test_missing_derived_sections_appended() {
        let module = auth_module();
        let existing = "@purpose: Minimal descriptor\n";
        let merged = render_module_descriptor(&module, &[], Some(existing));

        assert!(merged.starts_with("@purpose: Minimal descriptor\n"));
        assert!(merged.contains("@component: Auth\n"));
        assert!(merged.contains("@interface:\n"));
    }

    #[test]
    fn test_component_name_title_cases_leaf() {
        assert_eq!(component_name("auth"), "Auth");
        assert_eq!(component_name("user_api"), "UserApi");
        assert_eq!(component_name("src/data_models"), "DataModels");
    }

    #[test]
    fn test_purpose_line_extraction() {
        assert_eq!(
            purpose_line("@component: X\n@purpose: Handles login\n"),
            Some("Handles login".to_string())
        );
        assert_eq!(purpose_line("@purpose: [Add module purpose]\n"), None);
        assert_eq!(purpose_line("no markers"), None);
    }

    #[test]
    fn test_parse_sections_splits_on_markers() {
        let text = "@component: X\n@interface:\n- a()\n\n@behavior:\n- b\n";
        let sections = parse_sections(text).unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].marker, "component");
        assert_eq!(sections[1].marker, "interface");
        assert_eq!(sections[1].kind, SectionKind::Derived);
        assert_eq!(sections[1].raw, "@interface:\n- a()\n\n");
        assert_eq!(sections[2].kind, SectionKind::Authored);
        // Round trip: concatenated raws reproduce the input bytes
        let rebuilt: String = sections.iter().map(|s| s.raw.as_str()).collect();
        assert_eq!(rebuilt, text);
    }
}
