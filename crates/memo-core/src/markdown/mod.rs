//! Markdown rendering
//!
//! Converts the small markdown dialect used in note bodies into HTML that is
//! safe to inject into a page. The input is untrusted. It is escaped first,
//! transformed with line and inline rules, and finally passed through
//! [`sanitize_html`], which is the authoritative safety boundary.
//!
//! Supported syntax: `#`..`###` headings, `>` blockquotes, `**bold**`,
//! `*italic*`, `` `code` ``, fenced code blocks, `[text](http(s) url)` links,
//! `-`/`*` bullet lists and `1.` ordered lists. Anything else is rendered as
//! literal text.

mod headings;
mod sanitize;

pub use headings::{extract_headings, Heading};
pub use sanitize::{is_safe_href, sanitize_html, ALLOWED_TAGS};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static FENCED_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[^\n`]*\n)?(.*?)```").expect("valid fenced code regex"));
static INLINE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("valid inline code regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,3})[ \t]+(.+?)[ \t]*$").expect("valid heading regex"));
static BLOCKQUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^&gt;[ \t]?(.*)$").expect("valid blockquote regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(\S(?:[^\n]*?\S)?)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("valid italic regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid link regex"));
static BULLET_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*][ \t]+(.+)$").expect("valid bullet regex"));
static ORDERED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.[ \t]+(.+)$").expect("valid ordered item regex"));
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{E000}\x{E002}](\d+)[\x{E001}\x{E003}]").expect("valid placeholder regex")
});

// Excerpt helpers
static MARKDOWN_LINK_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link text regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~]+|^\s*(?:[-+]|\d+\.)\s+").expect("valid symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

// Private-use code points delimiting protected code spans. Inline spans use
// E000/E001, fenced blocks use E002/E003 so line joining can spot them.
const INLINE_OPEN: char = '\u{E000}';
const INLINE_CLOSE: char = '\u{E001}';
const BLOCK_OPEN: char = '\u{E002}';
const BLOCK_CLOSE: char = '\u{E003}';

const BLOCK_START_TAGS: [&str; 6] = ["<h1", "<h2", "<h3", "<blockquote", "<ul", "<ol"];
const BLOCK_END_TAGS: [&str; 6] = ["</h1>", "</h2>", "</h3>", "</blockquote>", "</ul>", "</ol>"];

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`] (used to validate link targets)
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Render untrusted markdown to sanitized HTML
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let normalized = text.replace("\r\n", "\n");
    let escaped = escape_placeholders(&escape_html(&normalized));

    // Code is lifted out before any other rule so its contents stay literal.
    let mut codes: Vec<String> = Vec::new();
    let protected = protect_fenced_code(&escaped, &mut codes);

    let blocks = render_blocks(&protected);
    let inline = render_inline(&blocks, &mut codes);
    let linked = render_links(&inline);
    let listed = render_lists(&linked);
    let joined = join_lines(&listed);
    let restored = restore_code(&joined, &codes);

    sanitize_html(&restored)
}

/// Turn placeholder code points already present in the input into character
/// references so they can never be mistaken for a protected span
fn escape_placeholders(text: &str) -> String {
    if !text.contains(&[INLINE_OPEN, INLINE_CLOSE, BLOCK_OPEN, BLOCK_CLOSE][..]) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            INLINE_OPEN | INLINE_CLOSE | BLOCK_OPEN | BLOCK_CLOSE => {
                out.push_str(&format!("&#x{:X};", c as u32))
            }
            _ => out.push(c),
        }
    }
    out
}

fn protect_fenced_code(text: &str, codes: &mut Vec<String>) -> String {
    FENCED_CODE_RE
        .replace_all(text, |caps: &Captures| {
            let body = caps[1].trim_end_matches('\n');
            codes.push(format!(
                "<pre class=\"markdown-code-block\"><code>{}</code></pre>",
                body
            ));
            format!("{}{}{}", BLOCK_OPEN, codes.len() - 1, BLOCK_CLOSE)
        })
        .into_owned()
}

/// Headings and blockquotes
fn render_blocks(text: &str) -> String {
    let headed = HEADING_RE.replace_all(text, |caps: &Captures| {
        let level = caps[1].len();
        format!(
            "<h{level} class=\"markdown-h{level}\">{}</h{level}>",
            &caps[2]
        )
    });
    BLOCKQUOTE_RE
        .replace_all(&headed, "<blockquote class=\"markdown-blockquote\">$1</blockquote>")
        .into_owned()
}

/// Inline code, bold, italic
fn render_inline(text: &str, codes: &mut Vec<String>) -> String {
    let coded = INLINE_CODE_RE.replace_all(text, |caps: &Captures| {
        codes.push(format!("<code class=\"markdown-code\">{}</code>", &caps[1]));
        format!("{}{}{}", INLINE_OPEN, codes.len() - 1, INLINE_CLOSE)
    });
    let bolded = BOLD_RE.replace_all(&coded, "<strong class=\"markdown-bold\">$1</strong>");
    ITALIC_RE
        .replace_all(&bolded, "<em class=\"markdown-italic\">$1</em>")
        .into_owned()
}

/// Links with an http(s) target; anything else stays as written
fn render_links(text: &str) -> String {
    LINK_RE
        .replace_all(text, |caps: &Captures| {
            let label = &caps[1];
            let url = &caps[2];
            if is_safe_href(&unescape_html(url)) {
                format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"markdown-link\">{}</a>",
                    url, label
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    fn tag(&self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// Turn list-marker lines into items and wrap each contiguous run
fn render_lists(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<(ListKind, String)> = None;

    for line in text.split('\n') {
        let item = BULLET_ITEM_RE
            .captures(line)
            .map(|c| (ListKind::Bullet, c[1].to_string()))
            .or_else(|| {
                ORDERED_ITEM_RE
                    .captures(line)
                    .map(|c| (ListKind::Ordered, c[1].to_string()))
            });

        match item {
            Some((kind, body)) => {
                let li = format!("<li class=\"markdown-list-item\">{}</li>", body);
                match current.as_mut() {
                    Some((open_kind, buf)) if *open_kind == kind => buf.push_str(&li),
                    _ => {
                        if let Some(done) = current.take() {
                            lines.push(close_list(done));
                        }
                        current = Some((kind, li));
                    }
                }
            }
            None => {
                if let Some(done) = current.take() {
                    lines.push(close_list(done));
                }
                lines.push(line.to_string());
            }
        }
    }
    if let Some(done) = current.take() {
        lines.push(close_list(done));
    }

    lines.join("\n")
}

fn close_list((kind, items): (ListKind, String)) -> String {
    format!(
        "<{tag} class=\"markdown-list\">{}</{tag}>",
        items,
        tag = kind.tag()
    )
}

/// Convert newlines to `<br>`, skipping the ones that border block elements
fn join_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_was_block = false;

    for (i, line) in text.split('\n').enumerate() {
        let starts_block =
            line.starts_with(BLOCK_OPEN) || BLOCK_START_TAGS.iter().any(|t| line.starts_with(t));
        if i > 0 {
            if previous_was_block || starts_block {
                if line.is_empty() {
                    // Blank separators next to a block fold into the block boundary.
                    previous_was_block = false;
                    continue;
                }
            } else {
                out.push_str("<br>");
            }
        }
        out.push_str(line);
        previous_was_block =
            line.ends_with(BLOCK_CLOSE) || BLOCK_END_TAGS.iter().any(|t| line.ends_with(t));
    }
    out
}

fn restore_code(text: &str, codes: &[String]) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| codes.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Plain-text preview of a note body, at most `max_chars` characters
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let without_links = MARKDOWN_LINK_TEXT_RE.replace_all(text, "$1");
    let stripped: Vec<String> = without_links
        .lines()
        .map(|line| MARKDOWN_SYMBOL_RE.replace_all(line, " ").into_owned())
        .collect();
    let joined = stripped.join(" ");
    let normalized = WHITESPACE_RE.replace_all(joined.trim(), " ");

    if normalized.chars().count() <= max_chars {
        return normalized.into_owned();
    }
    let mut cut: String = normalized.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_plain_text_lines_become_breaks() {
        assert_eq!(render("one\ntwo\r\nthree"), "one<br>two<br>three");
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("# Title"), "<h1 class=\"markdown-h1\">Title</h1>");
        assert_eq!(render("## Sub"), "<h2 class=\"markdown-h2\">Sub</h2>");
        assert_eq!(render("### Deep"), "<h3 class=\"markdown-h3\">Deep</h3>");
        // Four levels is not part of the dialect
        assert_eq!(render("#### Nope"), "#### Nope");
        // A marker needs a following space
        assert_eq!(render("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_heading_followed_by_text_has_no_extra_break() {
        assert_eq!(
            render("# Title\nbody"),
            "<h1 class=\"markdown-h1\">Title</h1>body"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("> quoted **text**"),
            "<blockquote class=\"markdown-blockquote\">quoted <strong class=\"markdown-bold\">text</strong></blockquote>"
        );
    }

    #[test]
    fn test_bold_and_italic() {
        let html = render("**bold** and *em*");
        assert_eq!(
            html,
            "<strong class=\"markdown-bold\">bold</strong> and <em class=\"markdown-italic\">em</em>"
        );
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(render("**not closed"), "**not closed");
        assert_eq!(render("2 * 3 * 4"), "2 * 3 * 4");
    }

    #[test]
    fn test_inline_code_is_not_formatted() {
        assert_eq!(
            render("run `a **b** c` now"),
            "run <code class=\"markdown-code\">a **b** c</code> now"
        );
    }

    #[test]
    fn test_fenced_code_block_keeps_newlines_and_markers() {
        let html = render("before\n```rust\n# not a heading\nlet x = 1;\n```\nafter");
        assert_eq!(
            html,
            "before<pre class=\"markdown-code-block\"><code># not a heading\nlet x = 1;</code></pre>after"
        );
    }

    #[test]
    fn test_single_line_fence_keeps_its_body() {
        assert_eq!(
            render("```let x = 1;```"),
            "<pre class=\"markdown-code-block\"><code>let x = 1;</code></pre>"
        );
        // An info string only counts when a newline ends it
        assert_eq!(
            render("```js\nlet y = 2;\n```"),
            "<pre class=\"markdown-code-block\"><code>let y = 2;</code></pre>"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            render("[Rust](https://www.rust-lang.org)"),
            "<a href=\"https://www.rust-lang.org\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"markdown-link\">Rust</a>"
        );
    }

    #[test]
    fn test_link_query_string_is_escaped_once() {
        let html = render("[q](https://example.com/?a=1&b=2)");
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=2\""));
    }

    #[test]
    fn test_unsafe_links_stay_literal() {
        assert_eq!(render("[x](javascript:alert(1))"), "[x](javascript:alert(1))");
        assert_eq!(render("[x](ftp://example.com)"), "[x](ftp://example.com)");
        // A quote smuggled into the URL disqualifies it
        let html = render("[x](https://a.com/\"onmouseover=\"alert(1))");
        assert!(!html.contains("<a"));
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(
            render("- one\n* two"),
            "<ul class=\"markdown-list\"><li class=\"markdown-list-item\">one</li><li class=\"markdown-list-item\">two</li></ul>"
        );
    }

    #[test]
    fn test_ordered_list_after_paragraph() {
        assert_eq!(
            render("steps:\n1. first\n2. second\nend"),
            "steps:<ol class=\"markdown-list\"><li class=\"markdown-list-item\">first</li><li class=\"markdown-list-item\">second</li></ol>end"
        );
    }

    #[test]
    fn test_switching_list_kind_starts_new_list() {
        let html = render("- a\n1. b");
        assert_eq!(
            html,
            "<ul class=\"markdown-list\"><li class=\"markdown-list-item\">a</li></ul><ol class=\"markdown-list\"><li class=\"markdown-list-item\">b</li></ol>"
        );
    }

    #[test]
    fn test_list_items_support_inline_markup() {
        let html = render("- *em* item");
        assert!(html.contains("<li class=\"markdown-list-item\"><em class=\"markdown-italic\">em</em> item</li>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render("**bold** and *em* <b>raw</b>");
        assert!(html.contains("<strong class=\"markdown-bold\">bold</strong>"));
        assert!(html.contains("<em class=\"markdown-italic\">em</em>"));
        assert!(html.contains("&lt;b&gt;raw&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_escaping_happens_once() {
        assert_eq!(render("a & b"), "a &amp; b");
        assert_eq!(render("&amp;"), "&amp;amp;");
        assert!(!render("&lt;").contains("&amp;amp;"));
    }

    #[test]
    fn test_placeholder_characters_in_input_are_harmless() {
        let html = render("\u{E000}7\u{E001} and \u{E002}0\u{E003}");
        assert_eq!(html, "&#xE000;7&#xE001; and &#xE002;0&#xE003;");
    }

    #[test]
    fn test_placeholder_characters_never_copy_other_code() {
        let html = render("`code` then \u{E000}0\u{E001}");
        assert_eq!(html.matches("<code").count(), 1);
        assert_eq!(
            html,
            "<code class=\"markdown-code\">code</code> then &#xE000;0&#xE001;"
        );
    }

    #[test]
    fn test_excerpt() {
        let text = "# Title\n\nSome **bold** text with a [link](https://x.y).\n- item";
        assert_eq!(excerpt(text, 200), "Title Some bold text with a link. item");
        assert_eq!(excerpt("abcdefghij", 5), "abcd…");
        assert_eq!(excerpt("short", 5), "short");
    }
}
