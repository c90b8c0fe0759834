//! Heading extraction for tables of contents

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static HEADING_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})[ \t]+(.+?)[ \t]*$").expect("valid heading line regex"));

/// A heading found in raw note text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1 to 3
    pub level: u8,
    /// Heading text as written (unrendered)
    pub text: String,
    /// Anchor id, unique within the document
    pub id: String,
}

/// Collect headings from raw (pre-render) text, in document order
///
/// Lines inside fenced code blocks are ignored.
pub fn extract_headings(text: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut in_fence = false;

    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("```") {
            // A fence closed on the same line never opens a block
            if in_fence || !rest.contains("```") {
                in_fence = !in_fence;
            }
            continue;
        }
        if in_fence {
            continue;
        }
        let Some(caps) = HEADING_LINE_RE.captures(line) else {
            continue;
        };

        let level = caps[1].len() as u8;
        let text = caps[2].to_string();
        let mut base = slugify(&text);
        if base.is_empty() {
            base = format!("heading-{}", headings.len() + 1);
        }
        let mut id = base.clone();
        let mut suffix = 0;
        while used.contains(&id) {
            suffix += 1;
            id = format!("{}-{}", base, suffix);
        }
        used.insert(id.clone());

        headings.push(Heading { level, text, id });
    }

    headings
}

/// Lowercase, keep letters and digits (any script), dash-separate words
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
