//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use memo_core::markdown::{excerpt, Heading};
use memo_core::{ImportSummary, Note};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single note, optionally with its rendered HTML
    pub fn print_note(&self, note: &Note, html: Option<&str>) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", note.id);
                println!("Title:    {}{}", note.title, pin_marker(note));
                println!("Type:     {}", note.note_type);
                if !note.tags.is_empty() {
                    println!("Tags:     {}", note.tags.join(", "));
                }
                if !note.images.is_empty() {
                    println!("Images:   {}", note.images.len());
                    for image in &note.images {
                        println!("  - {}", truncate(image, 70));
                    }
                }
                println!("Created:  {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", note.updated_at.format("%Y-%m-%d %H:%M"));

                println!();
                match html {
                    Some(html) => println!("{}", html),
                    None if note.content.is_empty() => println!("(no content)"),
                    None => println!("{}", note.content),
                }
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(note).unwrap_or_default();
                if let (Some(html), Some(obj)) = (html, value.as_object_mut()) {
                    obj.insert("html".to_string(), serde_json::Value::from(html));
                }
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                println!("{}", note.id);
            }
        }
    }

    /// Print a list of notes
    pub fn print_notes(&self, notes: &[Note]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for note in notes {
                    let tags = if note.tags.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", note.tags.join(", "))
                    };
                    println!(
                        "{} | {}{}{} | {} | {}",
                        short_id(&note.id),
                        truncate(&note.title, 30),
                        pin_marker(note),
                        tags,
                        note.updated_at.format("%Y-%m-%d"),
                        excerpt(&note.content, 40)
                    );
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(notes).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json_tags).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a table of contents
    pub fn print_headings(&self, headings: &[Heading]) {
        match self.format {
            OutputFormat::Human => {
                if headings.is_empty() {
                    println!("No headings.");
                    return;
                }
                for heading in headings {
                    let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
                    println!("{}{} (#{})", indent, heading.text, heading.id);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(headings).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                for heading in headings {
                    println!("{}", heading.id);
                }
            }
        }
    }

    /// Print rendered HTML
    pub fn print_html(&self, html: &str) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "html": html })),
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", html),
        }
    }

    pub fn print_import_summary(&self, summary: &ImportSummary) {
        match self.format {
            OutputFormat::Human => println!(
                "✓ Imported: {} added, {} updated, {} unchanged",
                summary.added, summary.updated, summary.skipped
            ),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(summary).unwrap_or_default())
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// First eight characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn pin_marker(note: &Note) -> &'static str {
    if note.is_pinned {
        " 📌"
    } else {
        ""
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte titles are cut on character boundaries
        assert_eq!(truncate("日本語のタイトルです", 6), "日本語...");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_pin_marker() {
        let mut note = Note::new("x");
        assert_eq!(pin_marker(&note), "");
        note.is_pinned = true;
        assert!(!pin_marker(&note).is_empty());
    }
}
