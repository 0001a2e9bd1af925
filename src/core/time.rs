//! Shared timestamp helpers for status documents and backup names.

use chrono::{Local, SecondsFormat, Utc};
use ulid::Ulid;

/// RFC 3339 timestamp in UTC with second precision (e.g. `2026-10-16T08:12:44Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Local wall-clock stamp used in backup file names (`20261016_081244`).
pub fn backup_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn new_backup_id() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_is_rfc3339() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_backup_stamp_shape() {
        let stamp = backup_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_new_backup_id_is_unique_ulid() {
        let a = new_backup_id();
        let b = new_backup_id();
        assert_ne!(a, b);
        assert!(ulid::Ulid::from_string(&a).is_ok());
    }
}
