//! Record store for agent definition documents.
//!
//! One JSON document per agent lives directly under the agents directory,
//! named by its slug. Reads never fail loudly: a missing or malformed
//! document is logged and surfaces as `None` so batch callers can skip it.

use crate::core::error::AgentCheckError;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Existence lookup for inter-record references.
pub trait SlugIndex {
    fn contains(&self, slug: &str) -> bool;
}

impl SlugIndex for BTreeSet<String> {
    fn contains(&self, slug: &str) -> bool {
        BTreeSet::contains(self, slug)
    }
}

/// Handle on the agents directory.
#[derive(Debug, Clone)]
pub struct AgentStore {
    /// Directory holding `<slug>.json` files
    pub root: PathBuf,
}

impl AgentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AgentStore { root: root.into() }
    }

    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{slug}.json"))
    }

    /// All record files, sorted by file name. Missing directory -> empty.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => {
                warn!(dir = %self.root.display(), "agents directory not found");
                return Vec::new();
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_json_file(p))
            .collect();
        files.sort();
        files
    }

    /// Resolve `--slug` selections to files; unknown slugs are a `NotFound` error.
    pub fn select_files(&self, slugs: &[String]) -> Result<Vec<PathBuf>, AgentCheckError> {
        if slugs.is_empty() {
            return Ok(self.list_files());
        }
        slugs
            .iter()
            .map(|slug| {
                let path = self.path_for(slug);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(AgentCheckError::NotFound(format!(
                        "agent '{}' at {}",
                        slug,
                        path.display()
                    )))
                }
            })
            .collect()
    }

}

impl SlugIndex for AgentStore {
    fn contains(&self, slug: &str) -> bool {
        !slug.is_empty() && self.path_for(slug).is_file()
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// The storage key of a record file: its name without extension.
pub fn storage_key(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and parse a JSON document, logging and returning `None` on failure.
pub fn load_document(path: &Path) -> Option<Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(path = %path.display(), "file not found");
            return None;
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read file");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(path = %path.display(), error = %e, "invalid JSON");
            None
        }
    }
}

/// Whole-document replace, pretty-printed with two-space indent.
pub fn write_document(path: &Path, value: &Value) -> Result<(), AgentCheckError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// The single mode object of a record document, if the document has one.
pub fn first_mode(doc: &Value) -> Option<&serde_json::Map<String, Value>> {
    doc.get("customModes")?.as_array()?.first()?.as_object()
}
