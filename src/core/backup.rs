//! Timestamped snapshots taken before a file is rewritten.

use crate::core::error::AgentCheckError;
use crate::core::time;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy `file` to `<backup_dir>/<stem>_<stamp>_<ulid>.json` and return the copy's path.
///
/// The ULID suffix keeps snapshots distinct when several repair passes touch
/// the same record within one second.
pub fn backup_file(backup_dir: &Path, file: &Path) -> Result<PathBuf, AgentCheckError> {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            AgentCheckError::PathError(format!("cannot derive backup name for {}", file.display()))
        })?;
    backup_file_as(backup_dir, file, stem, "json")
}

/// Snapshot under an explicit name prefix and extension (used for dotfiles).
pub fn backup_file_as(
    backup_dir: &Path,
    file: &Path,
    prefix: &str,
    ext: &str,
) -> Result<PathBuf, AgentCheckError> {
    fs::create_dir_all(backup_dir)?;
    let target = backup_dir.join(format!(
        "{}_{}_{}.{}",
        prefix,
        time::backup_stamp(),
        time::new_backup_id(),
        ext
    ));
    fs::copy(file, &target)?;
    Ok(target)
}
