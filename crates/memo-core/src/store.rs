//! Note store
//!
//! The `Store` is the storage collaborator for the query engine: it hands
//! out the full note collection and accepts full replacements. Convenience
//! operations (add, update, delete, pin) are load, modify, save-all cycles,
//! so the file on disk is never partially updated.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let mut note = Note::new("Groceries");
//! note.set_content("- eggs\n- milk");
//! store.add_note(note)?;
//!
//! let view = query::apply(&store.get_all_notes()?, &Criteria::default());
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::models::Note;
use crate::query::{self, Criteria};
use crate::storage::backup::{combine, Backup, ImportMode, ImportSummary};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::persistence::{atomic_write, JsonPersistence};

/// File-backed note collection
pub struct Store {
    persistence: JsonPersistence,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the store with a specific configuration
    ///
    /// Nothing is written until the first mutation.
    pub fn open_with_config(config: Config) -> Self {
        let persistence = JsonPersistence::new(config.notes_path());
        Self {
            persistence,
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if nothing has been stored yet
    pub fn is_new(&self) -> bool {
        !self.persistence.exists()
    }

    // ==================== Collection ====================

    /// Get the full collection, in storage order
    pub fn get_all_notes(&self) -> StorageResult<Vec<Note>> {
        self.persistence.load()
    }

    /// Replace the full collection
    pub fn replace_all(&mut self, notes: &[Note]) -> StorageResult<()> {
        self.persistence.save(notes)
    }

    /// Run the query engine over the stored collection
    pub fn query(&self, criteria: &Criteria) -> StorageResult<Vec<Note>> {
        let notes = self.get_all_notes()?;
        Ok(query::apply(&notes, criteria))
    }

    // ==================== Note Operations ====================

    /// Add a new note; its id must not be in use
    pub fn add_note(&mut self, note: Note) -> StorageResult<()> {
        let mut notes = self.get_all_notes()?;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(StorageError::DuplicateId(note.id));
        }
        info!("Adding note {}", note.id);
        notes.push(note);
        self.replace_all(&notes)
    }

    /// Replace a stored note with the same id
    pub fn update_note(&mut self, note: Note) -> StorageResult<()> {
        let mut notes = self.get_all_notes()?;
        let slot = notes
            .iter_mut()
            .find(|n| n.id == note.id)
            .ok_or_else(|| StorageError::NoteNotFound(note.id.clone()))?;
        info!("Updating note {}", note.id);
        *slot = note;
        self.replace_all(&notes)
    }

    /// Delete a note, returning it
    pub fn delete_note(&mut self, id: &str) -> StorageResult<Note> {
        let mut notes = self.get_all_notes()?;
        let pos = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| StorageError::NoteNotFound(id.to_string()))?;
        let removed = notes.remove(pos);
        info!("Deleting note {}", id);
        self.replace_all(&notes)?;
        Ok(removed)
    }

    /// Flip a note's pinned flag, returning the new state
    pub fn toggle_pin(&mut self, id: &str) -> StorageResult<bool> {
        let mut notes = self.get_all_notes()?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StorageError::NoteNotFound(id.to_string()))?;
        let pinned = note.toggle_pin();
        self.replace_all(&notes)?;
        Ok(pinned)
    }

    /// Get a note by ID
    pub fn get_note(&self, id: &str) -> StorageResult<Option<Note>> {
        Ok(self.get_all_notes()?.into_iter().find(|n| n.id == id))
    }

    /// Notes whose id starts with `prefix` (an exact id match wins outright)
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<Vec<Note>> {
        let notes = self.get_all_notes()?;
        if let Some(exact) = notes.iter().find(|n| n.id == prefix) {
            return Ok(vec![exact.clone()]);
        }
        Ok(notes
            .into_iter()
            .filter(|n| n.id.starts_with(prefix))
            .collect())
    }

    // ==================== Tags & Stats ====================

    /// Get all unique tags, sorted
    pub fn get_all_tags(&self) -> StorageResult<Vec<String>> {
        Ok(query::all_tags(&self.get_all_notes()?))
    }

    /// Get tags with usage counts
    pub fn get_tags_with_counts(&self) -> StorageResult<Vec<(String, usize)>> {
        Ok(query::tag_counts(&self.get_all_notes()?))
    }

    pub fn note_count(&self) -> StorageResult<usize> {
        Ok(self.get_all_notes()?.len())
    }

    // ==================== Backup ====================

    /// Write the collection to a backup file
    pub fn export_to(&self, path: &Path) -> StorageResult<usize> {
        let backup = Backup::new(self.get_all_notes()?);
        atomic_write(path, backup.to_json()?.as_bytes())?;
        info!("Exported {} notes to {:?}", backup.total_count, path);
        Ok(backup.total_count)
    }

    /// Read a backup file into the collection
    pub fn import_from(&mut self, path: &Path, mode: ImportMode) -> StorageResult<ImportSummary> {
        let json = std::fs::read_to_string(path).map_err(|source| StorageError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let backup = Backup::from_json(&json)?;

        let (notes, summary) = combine(self.get_all_notes()?, backup.memos, mode);
        self.replace_all(&notes)?;
        info!(
            "Imported from {:?}: {} added, {} updated, {} skipped",
            path, summary.added, summary.updated, summary.skipped
        );
        Ok(summary)
    }
}
