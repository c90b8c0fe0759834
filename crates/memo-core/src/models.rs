//! Data models for memo
//!
//! Defines the core data structures: Note and NoteType.
//! Notes serialize with camelCase keys so that backup files and stored
//! collections share one shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a string does not name a known enum variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// The kind of a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NoteType {
    /// Free-form text memo
    #[default]
    #[serde(rename = "plain-note")]
    Plain,
    /// Note following a template (checklist, journal entry, ...)
    #[serde(rename = "structured-note")]
    Structured,
    /// Saved reference material (quote, citation, snippet)
    #[serde(rename = "reference-entry")]
    Reference,
}

impl NoteType {
    pub const ALL: [NoteType; 3] = [NoteType::Plain, NoteType::Structured, NoteType::Reference];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Plain => "plain-note",
            NoteType::Structured => "structured-note",
            NoteType::Reference => "reference-entry",
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = ParseEnumError;

    /// Accepts the serialized names plus the short forms `plain`,
    /// `structured` and `reference`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain-note" | "plain" => Ok(NoteType::Plain),
            "structured-note" | "structured" => Ok(NoteType::Structured),
            "reference-entry" | "reference" => Ok(NoteType::Reference),
            _ => Err(ParseEnumError {
                kind: "note type",
                value: s.to_string(),
                expected: "plain, structured, reference",
            }),
        }
    }
}

/// A user-authored memo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Opaque unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Body text (markdown subset)
    #[serde(default)]
    pub content: String,
    /// Tags for organization, duplicates suppressed
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image references (data URIs or URLs)
    #[serde(default)]
    pub images: Vec<String>,
    /// When this note was created
    pub created_at: DateTime<Utc>,
    /// When this note was last updated
    pub updated_at: DateTime<Utc>,
    /// Pinned notes sort ahead of everything else
    #[serde(default)]
    pub is_pinned: bool,
    /// Note kind
    #[serde(rename = "type", default)]
    pub note_type: NoteType,
}

impl Note {
    /// Create a new note with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title)
    }

    /// Create a note with a specific ID (for loading or importing)
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
            note_type: NoteType::default(),
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Update the content
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Add a tag
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.touch();
        }
    }

    /// Remove a tag
    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            self.touch();
        }
    }

    /// Set all tags (replacing existing, first occurrence wins)
    pub fn set_tags(&mut self, tags: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !deduped.contains(&tag) {
                deduped.push(tag);
            }
        }
        self.tags = deduped;
        self.touch();
    }

    /// Append an image reference
    pub fn add_image(&mut self, image: impl Into<String>) {
        self.images.push(image.into());
        self.touch();
    }

    /// Remove the image at `index`, if any
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        if index < self.images.len() {
            let removed = self.images.remove(index);
            self.touch();
            Some(removed)
        } else {
            None
        }
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        if self.is_pinned != pinned {
            self.is_pinned = pinned;
            self.touch();
        }
    }

    /// Flip the pinned flag, returning the new state
    pub fn toggle_pin(&mut self) -> bool {
        self.set_pinned(!self.is_pinned);
        self.is_pinned
    }

    pub fn set_type(&mut self, note_type: NoteType) {
        self.note_type = note_type;
        self.touch();
    }

    /// Refresh `updated_at`, never letting it fall behind `created_at`
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}
