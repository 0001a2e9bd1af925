//! Manual loading probe: stage one mode in the canonical file and ask
//! whether the runtime picked it up.

use crate::core::confirm::Confirm;
use crate::core::error::AgentCheckError;
use crate::core::store;
use crate::core::validate::ValidationOutcome;
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const LOADING_FAILURE: &str = "User reported loading failure";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Loaded,
    Failed(String),
}

impl ProbeOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ProbeOutcome::Loaded)
    }
}

/// Overwrites `canonical_file` with just this record's first mode.
pub fn probe_record(record: &Path, canonical_file: &Path, confirm: &mut dyn Confirm) -> ProbeOutcome {
    let Some(doc) = store::load_document(record) else {
        return ProbeOutcome::Failed(format!(
            "Failed to load agent data: {}",
            store::file_name(record)
        ));
    };
    let Some(mode) = doc
        .get("customModes")
        .and_then(Value::as_array)
        .and_then(|modes| modes.first())
    else {
        return ProbeOutcome::Failed("Missing or invalid 'customModes'".to_string());
    };
    if let Err(e) = store::write_document(canonical_file, &json!({ "customModes": [mode] })) {
        return ProbeOutcome::Failed(format!("Could not stage mode: {e}"));
    }

    let fallback = store::storage_key(record).unwrap_or_default();
    let slug = mode.get("slug").and_then(Value::as_str).unwrap_or(&fallback);
    if confirm.confirm(&format!("Did agent '{slug}' load correctly in chat mode?")) {
        info!(slug, "loading confirmed");
        ProbeOutcome::Loaded
    } else {
        warn!(slug, "loading rejected");
        ProbeOutcome::Failed(LOADING_FAILURE.to_string())
    }
}

/// Canonical file contents as they were before any mode was staged.
#[derive(Debug)]
pub struct CanonicalSnapshot {
    path: PathBuf,
    contents: Option<Vec<u8>>,
}

impl CanonicalSnapshot {
    pub fn take(path: &Path) -> Result<Self, AgentCheckError> {
        let contents = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(CanonicalSnapshot {
            path: path.to_path_buf(),
            contents,
        })
    }

    /// Put the file back as `take` found it; a file that did not exist is removed.
    pub fn restore(&self) -> Result<(), AgentCheckError> {
        match &self.contents {
            Some(bytes) => fs::write(&self.path, bytes)?,
            None if self.path.exists() => fs::remove_file(&self.path)?,
            None => {}
        }
        debug!(file = %self.path.display(), "restored canonical file after probing");
        Ok(())
    }
}

/// Probe every passing record in `files`, rejecting those the user says did not load.
///
/// The canonical file is restored afterwards, so previously published modes
/// survive for the next sync. Returns the number of rejected records.
pub fn probe_passing(
    files: &[PathBuf],
    results: &mut IndexMap<String, ValidationOutcome>,
    canonical_file: &Path,
    confirm: &mut dyn Confirm,
) -> Result<usize, AgentCheckError> {
    let snapshot = CanonicalSnapshot::take(canonical_file)?;
    let mut rejected = 0;
    for path in files {
        let Some(outcome) = results.get_mut(&store::file_name(path)) else {
            continue;
        };
        if !outcome.passed {
            continue;
        }
        if let ProbeOutcome::Failed(reason) = probe_record(path, canonical_file, confirm) {
            outcome.reject(reason);
            rejected += 1;
        }
    }
    snapshot.restore()?;
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirm::{AutoConfirm, ScriptedConfirm};

    #[test]
    fn stages_single_mode_and_respects_answer() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("coding-agent.json");
        let canonical = dir.path().join(".roomodes");
        store::write_document(
            &record,
            &json!({"customModes": [{"slug": "coding-agent", "name": "Coder"}]}),
        )
        .unwrap();

        assert!(probe_record(&record, &canonical, &mut AutoConfirm).is_loaded());
        let staged = store::load_document(&canonical).unwrap();
        assert_eq!(staged["customModes"].as_array().unwrap().len(), 1);

        let mut no = ScriptedConfirm::new([false]);
        assert_eq!(
            probe_record(&record, &canonical, &mut no),
            ProbeOutcome::Failed(LOADING_FAILURE.to_string())
        );
        assert_eq!(no.prompts, vec!["Did agent 'coding-agent' load correctly in chat mode?"]);
    }

    #[test]
    fn unreadable_record_fails_without_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = ScriptedConfirm::new([true]);
        let outcome = probe_record(&dir.path().join("x.json"), &dir.path().join(".roomodes"), &mut c);
        assert!(!outcome.is_loaded());
        assert!(c.prompts.is_empty());
    }

    #[test]
    fn snapshot_restores_previous_contents_or_absence() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().join(".roomodes");

        let absent = CanonicalSnapshot::take(&canonical).unwrap();
        fs::write(&canonical, "staged").unwrap();
        absent.restore().unwrap();
        assert!(!canonical.exists());

        fs::write(&canonical, "published").unwrap();
        let present = CanonicalSnapshot::take(&canonical).unwrap();
        fs::write(&canonical, "staged").unwrap();
        present.restore().unwrap();
        assert_eq!(fs::read_to_string(&canonical).unwrap(), "published");
    }

    #[test]
    fn only_passing_records_are_asked_about() {
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().join(".roomodes");
        let mut files = Vec::new();
        let mut results = IndexMap::new();
        for (slug, passed) in [("a-agent", true), ("b-agent", false), ("c-agent", true)] {
            let path = dir.path().join(format!("{slug}.json"));
            store::write_document(&path, &json!({"customModes": [{"slug": slug}]})).unwrap();
            results.insert(
                store::file_name(&path),
                ValidationOutcome {
                    passed,
                    ..Default::default()
                },
            );
            files.push(path);
        }

        let mut answers = ScriptedConfirm::new([true, false]);
        let rejected = probe_passing(&files, &mut results, &canonical, &mut answers).unwrap();
        assert_eq!(rejected, 1);
        assert_eq!(answers.prompts.len(), 2);
        assert!(results["a-agent.json"].passed);
        assert_eq!(results["c-agent.json"].errors, vec![LOADING_FAILURE]);
        assert!(!canonical.exists());
    }
}
