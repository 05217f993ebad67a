//! Markdown preview boundary
//!
//! Renders editor content to HTML and applies a best-effort sanitation
//! pass before it is handed to the view. The tag/attribute lists are a
//! fixed contract, not an exhaustive defense against injection.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

/// Shown when the editor is empty.
const EMPTY_PREVIEW_PLACEHOLDER: &str = "*No content to preview.*";

const PAIRED_DANGEROUS_TAGS: &[&str] = &["script", "iframe", "object", "embed", "style"];

// Paired dangerous elements are removed together with their contents;
// a second pass catches unclosed or void tags (e.g. <link>).
static DANGEROUS_ELEMENT_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    PAIRED_DANGEROUS_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid regex")
        })
        .collect()
});
static DANGEROUS_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(script|iframe|object|embed|style|link)\b[^>]*>").expect("valid regex")
});
// Inline event handlers: onclick, onerror, onload, ...
static EVENT_HANDLER_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+on\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid regex")
});
static JAVASCRIPT_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+href\s*=\s*("\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]+)"#)
        .expect("valid regex")
});
static ANCHOR_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<a\b").expect("valid regex"));

/// Strip the fixed deny-list of tags and attributes from rendered HTML and
/// force every link to open in a new browsing context.
pub fn sanitize_html(html: &str) -> String {
    let mut cleaned = html.to_string();
    for re in DANGEROUS_ELEMENT_RES.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = DANGEROUS_TAG_RE.replace_all(&cleaned, "");
    let cleaned = EVENT_HANDLER_ATTR_RE.replace_all(&cleaned, "");
    let cleaned = JAVASCRIPT_HREF_RE.replace_all(&cleaned, "");
    ANCHOR_OPEN_RE
        .replace_all(&cleaned, r#"<a target="_blank" rel="noopener noreferrer""#)
        .into_owned()
}

/// Render editor content to sanitized preview HTML.
pub fn render_preview(content: &str) -> String {
    let source = if content.trim().is_empty() {
        EMPTY_PREVIEW_PLACEHOLDER
    } else {
        content
    };

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options);
    let mut raw_html = String::new();
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}
