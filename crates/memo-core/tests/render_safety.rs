use memo_core::markdown::{self, extract_headings, ALLOWED_TAGS};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?([A-Za-z][A-Za-z0-9]*)").unwrap());

/// Every tag in the output is on the allow-list and nothing can execute
fn assert_inert(html: &str) {
    for caps in TAG_NAME_RE.captures_iter(html) {
        let name = caps[1].to_ascii_lowercase();
        assert!(
            ALLOWED_TAGS.contains(&name.as_str()),
            "disallowed tag <{name}> in {html}"
        );
    }
    let lower = html.to_ascii_lowercase();
    assert!(!lower.contains("<script"), "{html}");
    assert!(!lower.contains("href=\"javascript:"), "{html}");
    assert!(!Regex::new(r"<[^>]*\son[a-z]+=").unwrap().is_match(&lower), "{html}");
}

#[test]
fn script_tags_never_survive() {
    let html = markdown::render("<script>alert(1)</script>");
    assert_inert(&html);
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn image_error_handlers_never_survive() {
    let html = markdown::render("<img src=x onerror=alert(1)>");
    assert_inert(&html);
    assert_eq!(html, "&lt;img src=x onerror=alert(1)&gt;");
}

#[test]
fn javascript_links_stay_literal() {
    for input in [
        "[click](javascript:alert(1))",
        "[click](JavaScript:alert(1))",
        "[click](data:text/html;base64,PHNjcmlwdD4=)",
        "[click]( javascript:alert(1))",
    ] {
        let html = markdown::render(input);
        assert_inert(&html);
        assert!(!html.contains("<a"), "{input} -> {html}");
        assert!(html.contains("[click]"));
    }
}

#[test]
fn fragments_split_across_rules_stay_escaped() {
    let inputs = [
        "**<scr**ipt>alert(1)</script>",
        "`<script>`alert(1)`</script>`",
        "# <iframe src=x>\n> <object>",
        "- <embed src=x>\n1. <style>body{}</style>",
        "[<script>](https://example.com)",
        "[x](https://example.com\"onclick=\"alert(1))",
        "```\n<script>alert(1)</script>\n```",
        "*<b onmouseover=alert(1)>*",
        "<<script>>alert(1)<</script>>",
    ];
    for input in inputs {
        assert_inert(&markdown::render(input));
    }
}

#[test]
fn sample_render_matches_expected_markup() {
    let html = markdown::render("**bold** and *em* <b>raw</b>");
    assert!(html.contains("<strong class=\"markdown-bold\">bold</strong>"));
    assert!(html.contains("<em class=\"markdown-italic\">em</em>"));
    assert!(html.contains("&lt;b&gt;raw&lt;/b&gt;"));
}

#[test]
fn entities_are_escaped_exactly_once() {
    assert_eq!(markdown::render("&amp;"), "&amp;amp;");
    assert_eq!(markdown::render("Tom & Jerry"), "Tom &amp; Jerry");
    assert_eq!(markdown::render("\"q\" 'a'"), "&quot;q&quot; &#39;a&#39;");
}

#[test]
fn full_document_renders() {
    let doc = "# Trip\n\n> pack light\n\n## Todo\n- **passport**\n- `charger`\n\n1. book hotel\n2. [map](https://maps.example.com/?q=kyoto&z=3)\n\nDone.";
    let html = markdown::render(doc);
    assert_inert(&html);
    assert!(html.starts_with("<h1 class=\"markdown-h1\">Trip</h1>"));
    assert!(html.contains("<blockquote class=\"markdown-blockquote\">pack light</blockquote>"));
    assert!(html.contains("<ul class=\"markdown-list\">"));
    assert!(html.contains("<ol class=\"markdown-list\">"));
    assert!(html.contains("href=\"https://maps.example.com/?q=kyoto&amp;z=3\""));
    assert!(html.ends_with("Done."));

    let toc: Vec<(u8, String)> = extract_headings(doc)
        .into_iter()
        .map(|h| (h.level, h.id))
        .collect();
    assert_eq!(toc, vec![(1, "trip".to_string()), (2, "todo".to_string())]);
}
