//! Storage layer
//!
//! The note collection is persisted as a single JSON document that is always
//! read and written whole. Backups wrap the same collection in a versioned
//! envelope.

pub mod backup;
pub mod error;
pub mod persistence;

pub use backup::{combine, Backup, ImportMode, ImportSummary, BACKUP_VERSION};
pub use error::{StorageError, StorageResult};
pub use persistence::JsonPersistence;
