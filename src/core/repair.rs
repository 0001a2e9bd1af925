//! Batch repair passes over agent record files.
//!
//! Each pass is a pure planner (`document -> Option<new document>`) plus the
//! shared apply step in [`Repairer`]: back up, write, log, count. Records the
//! planner leaves alone are never backed up or written.

use crate::core::backup;
use crate::core::interactions;
use crate::core::references::{self, ReferenceAction};
use crate::core::store::{self, SlugIndex};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

fn modes_mut(doc: &mut Value) -> impl Iterator<Item = &mut Map<String, Value>> {
    doc.get_mut("customModes")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|modes| modes.iter_mut())
        .filter_map(Value::as_object_mut)
}

/// Flatten compound `["edit", {...}]` group entries to the bare `"edit"` tag.
pub fn plan_groups(doc: &Value) -> Option<Value> {
    let mut next = doc.clone();
    let mut changed = false;
    for mode in modes_mut(&mut next) {
        let Some(groups) = mode.get_mut("groups").and_then(Value::as_array_mut) else {
            continue;
        };
        for entry in groups.iter_mut() {
            let is_compound_edit = entry
                .as_array()
                .and_then(|items| items.first())
                .and_then(Value::as_str)
                == Some("edit");
            if is_compound_edit {
                *entry = Value::String("edit".to_string());
                changed = true;
            }
        }
    }
    changed.then_some(next)
}

/// Remap, drop invalid, and drop non-string `interactsWith` entries.
pub fn plan_references(doc: &Value) -> Option<(Value, Vec<ReferenceAction>)> {
    let mut next = doc.clone();
    let mut actions = Vec::new();
    for mode in modes_mut(&mut next) {
        let Some(list) = mode
            .get_mut("connectivity")
            .and_then(Value::as_object_mut)
            .and_then(|c| c.get_mut("interactsWith"))
            .and_then(Value::as_array_mut)
        else {
            continue;
        };
        let (cleaned, changes) = references::clean_references(list);
        if !changes.is_empty() {
            *list = cleaned;
            actions.extend(changes);
        }
    }
    (!actions.is_empty()).then_some((next, actions))
}

/// Fill an empty `interactsWith` from the role table, keeping only existing targets.
///
/// The role is the mode's `slug`, or `fallback_slug` (the file stem) when the
/// mode has none. A missing `connectivity` object is created; a non-object one
/// is left alone.
pub fn plan_interactions(
    doc: &Value,
    fallback_slug: &str,
    index: &dyn SlugIndex,
) -> Option<(Value, Vec<String>)> {
    let mut next = doc.clone();
    let mut added = Vec::new();
    for mode in modes_mut(&mut next) {
        let slug = mode
            .get("slug")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback_slug)
            .to_string();

        let connectivity = mode
            .entry("connectivity")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(connectivity) = connectivity.as_object_mut() else {
            continue;
        };
        let current_empty = match connectivity.get("interactsWith") {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        };
        if !current_empty {
            continue;
        }
        let suggestions = interactions::suggest(&slug, index);
        if suggestions.is_empty() {
            continue;
        }
        connectivity.insert(
            "interactsWith".to_string(),
            Value::Array(suggestions.iter().cloned().map(Value::String).collect()),
        );
        added.extend(suggestions);
    }
    if added.is_empty() {
        return None;
    }
    Some((next, added))
}

/// Per-pass fix counts from one `repair_all` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub groups_fixes: usize,
    pub reference_fixes: usize,
    pub interaction_fixes: usize,
}

impl RepairSummary {
    pub fn total(&self) -> usize {
        self.groups_fixes + self.reference_fixes + self.interaction_fixes
    }

    pub fn entries(&self) -> [(&'static str, usize); 3] {
        [
            ("groups_fixes", self.groups_fixes),
            ("reference_fixes", self.reference_fixes),
            ("interaction_fixes", self.interaction_fixes),
        ]
    }
}

/// Applies repair plans to record files with backup-before-write.
pub struct Repairer<'a> {
    backup_dir: PathBuf,
    index: &'a dyn SlugIndex,
    log: Vec<String>,
}

impl<'a> Repairer<'a> {
    pub fn new(backup_dir: impl Into<PathBuf>, index: &'a dyn SlugIndex) -> Self {
        Repairer {
            backup_dir: backup_dir.into(),
            index,
            log: Vec::new(),
        }
    }

    /// Human-readable entries, one per rewritten record.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Backup failures are logged and the write still proceeds.
    fn apply(&mut self, path: &Path, next: &Value, entry: String) -> bool {
        match backup::backup_file(&self.backup_dir, path) {
            Ok(copy) => info!(file = %path.display(), backup = %copy.display(), "backed up record"),
            Err(e) => warn!(file = %path.display(), error = %e, "backup failed, repairing anyway"),
        }
        if let Err(e) = store::write_document(path, next) {
            error!(file = %path.display(), error = %e, "failed to write repaired record");
            return false;
        }
        info!(file = %path.display(), "{}", entry);
        self.log.push(entry);
        true
    }

    pub fn fix_groups_format(&mut self, files: &[PathBuf]) -> usize {
        let mut fixed = 0;
        for path in files {
            let Some(doc) = store::load_document(path) else {
                continue;
            };
            if let Some(next) = plan_groups(&doc) {
                let entry = format!("Fixed groups format in {}", store::file_name(path));
                if self.apply(path, &next, entry) {
                    fixed += 1;
                }
            }
        }
        fixed
    }

    pub fn fix_broken_references(&mut self, files: &[PathBuf]) -> usize {
        let mut fixed = 0;
        for path in files {
            let Some(doc) = store::load_document(path) else {
                continue;
            };
            if let Some((next, actions)) = plan_references(&doc) {
                let details: Vec<String> = actions.iter().map(ReferenceAction::describe).collect();
                let entry = format!(
                    "Fixed references in {} ({})",
                    store::file_name(path),
                    details.join(", ")
                );
                if self.apply(path, &next, entry) {
                    fixed += 1;
                }
            }
        }
        fixed
    }

    pub fn fix_empty_interactions(&mut self, files: &[PathBuf]) -> usize {
        let mut fixed = 0;
        for path in files {
            let Some(doc) = store::load_document(path) else {
                continue;
            };
            let fallback = store::storage_key(path).unwrap_or_default();
            if let Some((next, added)) = plan_interactions(&doc, &fallback, self.index) {
                let entry = format!(
                    "Populated interactsWith in {} with {} agents",
                    store::file_name(path),
                    added.len()
                );
                if self.apply(path, &next, entry) {
                    fixed += 1;
                }
            }
        }
        fixed
    }

    /// Groups, then references, then interactions.
    pub fn repair_all(&mut self, files: &[PathBuf]) -> RepairSummary {
        let summary = RepairSummary {
            groups_fixes: self.fix_groups_format(files),
            reference_fixes: self.fix_broken_references(files),
            interaction_fixes: self.fix_empty_interactions(files),
        };
        info!(
            groups = summary.groups_fixes,
            references = summary.reference_fixes,
            interactions = summary.interaction_fixes,
            "repair passes complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn record(mode: Value) -> Value {
        json!({ "customModes": [mode] })
    }

    #[test]
    fn groups_planner_flattens_only_compound_edit() {
        let doc = record(json!({
            "slug": "a-agent",
            "groups": ["read", ["edit", {"fileRegex": "\\.md$"}], ["browser"], "mcp"]
        }));
        let next = plan_groups(&doc).unwrap();
        assert_eq!(
            next["customModes"][0]["groups"],
            json!(["read", "edit", ["browser"], "mcp"])
        );
        assert!(plan_groups(&next).is_none());
    }

    #[test]
    fn references_planner_is_noop_on_clean_list() {
        let doc = record(json!({"connectivity": {"interactsWith": ["coding-agent"]}}));
        assert!(plan_references(&doc).is_none());
        let doc = record(json!({"connectivity": "free text"}));
        assert!(plan_references(&doc).is_none());
    }

    #[test]
    fn references_planner_rewrites_bad_entries() {
        let doc = record(json!({
            "connectivity": {"interactsWith": ["qa-agent", "TeamLead", 3, "devops-agent"], "feedbackLoop": "x"}
        }));
        let (next, actions) = plan_references(&doc).unwrap();
        assert_eq!(
            next["customModes"][0]["connectivity"]["interactsWith"],
            json!(["test-orchestrator-agent", "devops-agent"])
        );
        assert_eq!(next["customModes"][0]["connectivity"]["feedbackLoop"], "x");
        assert_eq!(actions.len(), 3);
    }

    #[test]
    fn interactions_planner_uses_fallback_slug_and_creates_connectivity() {
        let index: BTreeSet<String> = ["code-reviewer-agent".to_string()].into_iter().collect();
        let doc = record(json!({"name": "Coder"}));
        let (next, added) = plan_interactions(&doc, "coding-agent", &index).unwrap();
        assert_eq!(added, vec!["code-reviewer-agent"]);
        assert_eq!(
            next["customModes"][0]["connectivity"]["interactsWith"],
            json!(["code-reviewer-agent"])
        );
    }

    #[test]
    fn interactions_planner_leaves_unknown_or_filtered_roles() {
        let empty: BTreeSet<String> = BTreeSet::new();
        let doc = record(json!({"slug": "coding-agent", "connectivity": {"interactsWith": []}}));
        assert!(plan_interactions(&doc, "coding-agent", &empty).is_none());

        let doc = record(json!({"slug": "mystery-agent", "connectivity": {"interactsWith": []}}));
        let index: BTreeSet<String> = ["coding-agent".to_string()].into_iter().collect();
        assert!(plan_interactions(&doc, "mystery-agent", &index).is_none());

        let doc = record(json!({"slug": "coding-agent", "connectivity": "n/a"}));
        assert!(plan_interactions(&doc, "coding-agent", &index).is_none());
    }

    #[test]
    fn summary_totals() {
        let s = RepairSummary {
            groups_fixes: 1,
            reference_fixes: 2,
            interaction_fixes: 0,
        };
        assert_eq!(s.total(), 3);
        assert_eq!(s.entries()[1], ("reference_fixes", 2));
    }
}
