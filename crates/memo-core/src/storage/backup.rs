//! Backup envelope
//!
//! Backup files wrap the note collection with a format version, the export
//! time and a count used as an integrity check:
//!
//! ```json
//! { "version": "1.0", "timestamp": "...", "memos": [...], "totalCount": 2 }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Note;
use crate::storage::error::{StorageError, StorageResult};

/// Format version written by this build
pub const BACKUP_VERSION: &str = "1.0";

/// How imported notes are combined with the stored collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Keep existing notes; incoming notes win when their `updatedAt` is newer
    #[default]
    Merge,
    /// Discard the stored collection
    Replace,
}

/// What an import changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub memos: Vec<Note>,
    pub total_count: usize,
}

impl Backup {
    /// Wrap a collection for export
    pub fn new(memos: Vec<Note>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            timestamp: Utc::now(),
            total_count: memos.len(),
            memos,
        }
    }

    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a backup document
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let backup: Backup = serde_json::from_str(json)?;
        backup.validate()?;
        Ok(backup)
    }

    fn validate(&self) -> StorageResult<()> {
        let major = self.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(StorageError::InvalidBackup(format!(
                "unsupported version '{}'",
                self.version
            )));
        }
        if self.total_count != self.memos.len() {
            return Err(StorageError::InvalidBackup(format!(
                "totalCount is {} but the file holds {} memos",
                self.total_count,
                self.memos.len()
            )));
        }
        let mut ids = std::collections::HashSet::new();
        for memo in &self.memos {
            if !ids.insert(memo.id.as_str()) {
                return Err(StorageError::InvalidBackup(format!(
                    "duplicate memo id '{}'",
                    memo.id
                )));
            }
        }
        Ok(())
    }
}

/// Combine `incoming` into `existing` according to `mode`
pub fn combine(existing: Vec<Note>, incoming: Vec<Note>, mode: ImportMode) -> (Vec<Note>, ImportSummary) {
    match mode {
        ImportMode::Replace => {
            let summary = ImportSummary {
                added: incoming.len(),
                ..ImportSummary::default()
            };
            (incoming, summary)
        }
        ImportMode::Merge => {
            let mut summary = ImportSummary::default();
            let mut merged = existing;
            let index: HashMap<String, usize> = merged
                .iter()
                .enumerate()
                .map(|(i, n)| (n.id.clone(), i))
                .collect();

            for note in incoming {
                match index.get(&note.id) {
                    Some(&i) if note.updated_at > merged[i].updated_at => {
                        merged[i] = note;
                        summary.updated += 1;
                    }
                    Some(_) => summary.skipped += 1,
                    None => {
                        merged.push(note);
                        summary.added += 1;
                    }
                }
            }
            (merged, summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_sets_count_and_version() {
        let backup = Backup::new(vec![Note::new("a"), Note::new("b")]);
        assert_eq!(backup.total_count, 2);
        assert_eq!(backup.version, BACKUP_VERSION);
    }

    #[test]
    fn test_json_envelope_keys() {
        let backup = Backup::new(vec![Note::new("a")]);
        let json: serde_json::Value = serde_json::from_str(&backup.to_json().unwrap()).unwrap();
        assert!(json.get("version").is_some());
        assert!(json.get("timestamp").is_some());
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["memos"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_round_trip() {
        let backup = Backup::new(vec![Note::new("a")]);
        let parsed = Backup::from_json(&backup.to_json().unwrap()).unwrap();
        assert_eq!(parsed, backup);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let json = r#"{"version":"1.0","timestamp":"2024-01-01T00:00:00Z","memos":[],"totalCount":3}"#;
        let err = Backup::from_json(json).unwrap_err();
        assert!(matches!(err, StorageError::InvalidBackup(_)));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let json = r#"{"version":"2.0","timestamp":"2024-01-01T00:00:00Z","memos":[],"totalCount":0}"#;
        assert!(matches!(
            Backup::from_json(json).unwrap_err(),
            StorageError::InvalidBackup(_)
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let backup = Backup::new(vec![Note::with_id("x", "a"), Note::with_id("x", "b")]);
        assert!(Backup::from_json(&backup.to_json().unwrap()).is_err());
    }

    #[test]
    fn test_merge_prefers_newer() {
        let old = Note::with_id("1", "old title");
        let mut newer = old.clone();
        newer.title = "new title".to_string();
        newer.updated_at = old.updated_at + Duration::seconds(60);

        let mut stale = Note::with_id("2", "kept");
        let mut stale_incoming = stale.clone();
        stale.updated_at = stale.updated_at + Duration::seconds(60);
        stale_incoming.title = "stale".to_string();

        let fresh = Note::with_id("3", "brand new");

        let (merged, summary) = combine(
            vec![old, stale],
            vec![newer, stale_incoming, fresh],
            ImportMode::Merge,
        );
        assert_eq!(summary, ImportSummary { added: 1, updated: 1, skipped: 1 });
        let titles: Vec<&str> = merged.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["new title", "kept", "brand new"]);
    }

    #[test]
    fn test_replace_discards_existing() {
        let (merged, summary) = combine(
            vec![Note::new("gone")],
            vec![Note::new("only")],
            ImportMode::Replace,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "only");
        assert_eq!(summary.added, 1);
    }
}
