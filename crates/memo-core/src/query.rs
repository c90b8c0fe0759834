//! Query engine
//!
//! Derives the display list from the full note collection and a
//! [`Criteria`]. Every function here is pure: the same inputs always yield
//! the same output, notes are never mutated, and nothing is cached between
//! calls.
//!
//! Filters combine with AND across dimensions and OR inside the tag and type
//! sets. Sorting puts pinned notes first, then orders each partition by the
//! chosen field. The sort is stable, so equal keys keep their input order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collate::compare_titles;
use crate::models::{Note, NoteType, ParseEnumError};

/// Field used to order the result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[default]
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(SortField::Title),
            "createdat" | "created" => Ok(SortField::CreatedAt),
            "updatedat" | "updated" => Ok(SortField::UpdatedAt),
            _ => Err(ParseEnumError {
                kind: "sort field",
                value: s.to_string(),
                expected: "title, created, updated",
            }),
        }
    }
}

/// Direction applied to the field comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError {
                kind: "sort order",
                value: s.to_string(),
                expected: "asc, desc",
            }),
        }
    }
}

/// Inclusive creation-date window
///
/// Bounds are kept as the strings the caller supplied (`YYYY-MM-DD` or
/// RFC 3339). The end bound covers the whole of its day. A bound that does
/// not parse makes the window exclude every note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Resolved form of a [`DateRange`]
enum Window {
    Bounded {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    Empty,
}

impl DateRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    /// Whether `at` falls inside the window
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        match self.resolve() {
            Window::Empty => false,
            Window::Bounded { start, end } => {
                start.map_or(true, |s| *at >= s) && end.map_or(true, |e| *at <= e)
            }
        }
    }

    fn resolve(&self) -> Window {
        let start = match bound(self.start.as_deref(), NaiveTime::MIN) {
            Ok(start) => start,
            Err(()) => return Window::Empty,
        };
        let end = match bound(self.end.as_deref(), end_of_day()) {
            Ok(end) => end,
            Err(()) => return Window::Empty,
        };
        Window::Bounded { start, end }
    }
}

/// Parse one range bound; blank means unbounded
fn bound(raw: Option<&str>, time_of_day: NaiveTime) -> Result<Option<DateTime<Utc>>, ()> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| ())?;

    Ok(Some(date.and_time(time_of_day).and_utc()))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Combined filter and sort settings
///
/// Every field defaults to "no constraint", so `Criteria::default()` keeps
/// all notes and sorts by most recently updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Criteria {
    /// Case-insensitive substring matched against title, content and tags
    pub search_term: String,
    /// Keep notes carrying at least one of these tags
    pub selected_tags: BTreeSet<String>,
    /// Keep notes of one of these types
    pub selected_types: BTreeSet<NoteType>,
    /// Filter on presence of images
    pub has_images: Option<bool>,
    pub date_range: Option<DateRange>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.selected_tags.insert(tag.into());
        self
    }

    pub fn with_type(mut self, note_type: NoteType) -> Self {
        self.selected_types.insert(note_type);
        self
    }

    pub fn with_images(mut self, has_images: bool) -> Self {
        self.has_images = Some(has_images);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    /// Whether a note passes every active filter
    pub fn matches(&self, note: &Note) -> bool {
        self.matches_search(note)
            && self.matches_tags(note)
            && self.matches_type(note)
            && self.matches_images(note)
            && self.matches_dates(note)
    }

    fn matches_search(&self, note: &Note) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        note.title.to_lowercase().contains(&needle)
            || note.content.to_lowercase().contains(&needle)
            || note.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn matches_tags(&self, note: &Note) -> bool {
        self.selected_tags.is_empty() || note.tags.iter().any(|t| self.selected_tags.contains(t))
    }

    fn matches_type(&self, note: &Note) -> bool {
        self.selected_types.is_empty() || self.selected_types.contains(&note.note_type)
    }

    fn matches_images(&self, note: &Note) -> bool {
        self.has_images.map_or(true, |want| note.has_images() == want)
    }

    fn matches_dates(&self, note: &Note) -> bool {
        self.date_range
            .as_ref()
            .map_or(true, |range| range.contains(&note.created_at))
    }

    /// Display ordering between two notes
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        // Pinned first, independent of sort order
        b.is_pinned.cmp(&a.is_pinned).then_with(|| {
            let by_field = match self.sort_field {
                SortField::Title => compare_titles(&a.title, &b.title),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            self.sort_order.apply(by_field)
        })
    }
}

/// Filter and sort, returning owned notes
pub fn apply(notes: &[Note], criteria: &Criteria) -> Vec<Note> {
    apply_refs(notes, criteria).into_iter().cloned().collect()
}

/// Filter and sort without cloning
pub fn apply_refs<'a>(notes: &'a [Note], criteria: &Criteria) -> Vec<&'a Note> {
    let mut matched: Vec<&Note> = notes.iter().filter(|n| criteria.matches(n)).collect();
    matched.sort_by(|a, b| criteria.compare(a, b));

    debug!(
        "Query matched {} of {} notes (sort={} {})",
        matched.len(),
        notes.len(),
        criteria.sort_field,
        criteria.sort_order
    );
    matched
}

/// Sorted, deduplicated union of every note's tags
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .flat_map(|n| n.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tag usage counts, sorted by tag name
pub fn tag_counts(notes: &[Note]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for note in notes {
        for tag in &note.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect()
}
