//! Allow-list HTML sanitizer
//!
//! Every tag in the input is either re-emitted in a canonical form (lowercase
//! name, double-quoted allowed attributes) or dropped. Raw-text elements such
//! as `<script>` are dropped together with their content. Angle brackets that
//! do not form a tag are escaped, so nothing outside the allow-list can reach
//! the output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tags permitted in rendered output
pub const ALLOWED_TAGS: [&str; 13] = [
    "h1", "h2", "h3", "strong", "em", "code", "pre", "blockquote", "a", "ul", "ol", "li", "br",
];

/// Elements removed along with everything up to their closing tag
const DROP_WITH_CONTENT: [&str; 8] = [
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea",
];

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([^<>]*)>").expect("valid tag regex"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});
static SAFE_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?i:https?)://[^\s"'<>]+$"#).expect("valid href regex"));

/// Whether a link target may appear in an `href`
pub fn is_safe_href(url: &str) -> bool {
    SAFE_HREF_RE.is_match(url)
}

/// Strip everything not on the tag/attribute allow-list
pub fn sanitize_html(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(caps) = TAG_RE.captures_at(html, pos) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            break;
        };
        push_text(&mut out, &html[pos..whole.start()]);
        pos = whole.end();

        let closing = !caps[1].is_empty();
        let name = name.as_str().to_ascii_lowercase();

        if DROP_WITH_CONTENT.contains(&name.as_str()) {
            if !closing {
                pos = skip_past_closing(&lower, pos, &name);
            }
            continue;
        }
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            continue;
        }

        if closing {
            if name != "br" {
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
        } else {
            out.push('<');
            out.push_str(&name);
            push_attributes(&mut out, &name, &caps[3]);
            out.push('>');
        }
    }

    push_text(&mut out, &html[pos..]);
    out
}

/// Text between tags; stray angle brackets are escaped
fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Position just after `</name ...>`, or the end of input when unclosed
fn skip_past_closing(lower: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{}", name);
    match lower[from..].find(&needle) {
        Some(offset) => {
            let close_start = from + offset;
            lower[close_start..]
                .find('>')
                .map_or(lower.len(), |gt| close_start + gt + 1)
        }
        None => lower.len(),
    }
}

fn push_attributes(out: &mut String, tag: &str, raw: &str) {
    for caps in ATTR_RE.captures_iter(raw) {
        let attr = caps[1].to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());

        let allowed = match attr.as_str() {
            "class" => true,
            "target" | "rel" => tag == "a",
            "href" => tag == "a" && is_safe_href(value),
            _ => false,
        };
        if !allowed {
            continue;
        }

        out.push(' ');
        out.push_str(&attr);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}
