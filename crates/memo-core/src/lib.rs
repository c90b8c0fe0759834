//! memo Core Library
//!
//! This crate provides the core functionality for memo, a personal
//! note-taking tool: the note model, a pure query engine for search, filter
//! and sort, a restricted markdown renderer with an allow-list sanitizer,
//! and a JSON file store.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! // Add a note
//! let mut note = Note::new("Plan trip");
//! note.set_content("## Packing\n- passport\n- **charger**");
//! note.add_tag("travel");
//! store.add_note(note)?;
//!
//! // Query and render
//! let criteria = Criteria::new().with_tag("travel");
//! for note in store.query(&criteria)? {
//!     let html = markdown::render(&note.content);
//! }
//! ```
//!
//! # Modules
//!
//! - `store`: Note collection storage (main entry point)
//! - `models`: Note and NoteType
//! - `query`: Filter/sort criteria and the derived tag views
//! - `collate`: Japanese-aware title ordering
//! - `markdown`: Markdown rendering, sanitization and heading extraction
//! - `storage`: JSON persistence, backup envelope and storage errors
//! - `config`: Application configuration

pub mod collate;
pub mod config;
pub mod markdown;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;

pub use config::Config;
pub use markdown::{extract_headings, render, sanitize_html, Heading};
pub use models::{Note, NoteType, ParseEnumError};
pub use query::{Criteria, DateRange, SortField, SortOrder};
pub use storage::{Backup, ImportMode, ImportSummary, StorageError, StorageResult};
pub use store::Store;
