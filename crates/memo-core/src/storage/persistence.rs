//! JSON collection persistence
//!
//! The whole note collection lives in one JSON array on disk. Reads return
//! the full collection and writes replace it; there are no partial updates.
//! Writes are atomic (write to temp file, fsync, rename) so the file is never
//! left half-written.
//!
//! Storage location: `~/.local/share/memo/notes.json` (configurable via
//! `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::Note;
use crate::storage::error::{StorageError, StorageResult};

/// Reads and writes the full note collection
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Check if the collection file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the collection; a missing file is an empty collection
    pub fn load(&self) -> StorageResult<Vec<Note>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path).map_err(|source| StorageError::ReadError {
            path: self.path.clone(),
            source,
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let notes: Vec<Note> =
            serde_json::from_slice(&bytes).map_err(|source| StorageError::InvalidFormat {
                path: self.path.clone(),
                source,
            })?;
        debug!("Loaded {} notes from {:?}", notes.len(), self.path);
        Ok(notes)
    }

    /// Replace the stored collection
    pub fn save(&self, notes: &[Note]) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(notes)?;
        atomic_write(&self.path, &json)?;
        debug!("Saved {} notes to {:?}", notes.len(), self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
