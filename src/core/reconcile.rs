//! Merge of previously published modes with freshly validated ones.
//!
//! The canonical document is `{"customModes": [...]}`. Entries are keyed by
//! slug in an insertion-ordered map: previous entries first, then validated
//! overlays. Output walks the priority list, then whatever remains in map
//! order.

use crate::core::error::AgentCheckError;
use crate::core::store;
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn slug_of(mode: &Value) -> Option<&str> {
    mode.get("slug").and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// `customModes` entries of a canonical-shaped document; anything else is empty.
pub fn modes_of(doc: &Value) -> Vec<Value> {
    doc.get("customModes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Ordered canonical mode list.
///
/// Slugless entries are ignored. A duplicate slug replaces the earlier value
/// but keeps the earlier position.
pub fn reconcile(previous: &[Value], validated: &[Value], priority: &[&str]) -> Vec<Value> {
    let mut by_slug: IndexMap<String, Value> = IndexMap::new();
    for mode in previous.iter().chain(validated.iter()) {
        match slug_of(mode) {
            Some(slug) => {
                by_slug.insert(slug.to_string(), mode.clone());
            }
            None => debug!("skipping mode without slug"),
        }
    }

    let mut ordered = Vec::with_capacity(by_slug.len());
    for slug in priority {
        if let Some(mode) = by_slug.shift_remove(*slug) {
            ordered.push(mode);
        }
    }
    ordered.extend(by_slug.into_values());
    ordered
}

/// Reconcile `passed_files` into `canonical_file` and return the number of modes written.
///
/// An absent or unreadable canonical file counts as empty. Record files that
/// fail to load are skipped.
pub fn sync_canonical(
    canonical_file: &Path,
    passed_files: &[PathBuf],
    priority: &[&str],
) -> Result<usize, AgentCheckError> {
    let previous = if canonical_file.exists() {
        match store::load_document(canonical_file) {
            Some(doc) => modes_of(&doc),
            None => {
                warn!(file = %canonical_file.display(), "canonical file unreadable, starting empty");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let validated: Vec<Value> = passed_files
        .iter()
        .filter_map(|path| store::load_document(path))
        .flat_map(|doc| modes_of(&doc))
        .collect();

    let merged = reconcile(&previous, &validated, priority);
    let count = merged.len();
    store::write_document(canonical_file, &json!({ "customModes": merged }))?;
    info!(
        file = %canonical_file.display(),
        count,
        previous = previous.len(),
        validated = validated.len(),
        "synchronized canonical modes"
    );
    Ok(count)
}
