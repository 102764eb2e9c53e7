pub mod entities;
pub mod format;
pub mod headings;
pub mod paragraphs;

use self::entities::decode_html_entities;
use self::format::has_html_tag;
use self::headings::normalize_headings;
use self::paragraphs::to_html_paragraphs;

/// Normalizes raw editorial content into HTML ready for sanitization.
///
/// Runs, in order: a single entity-decoding pass (only when the input looks
/// escaped), plain-text promotion (only when no tag survives decoding), and
/// `<h1>` demotion.
///
/// The result is **not** safe to render. It must still go through
/// [`crate::sanitize::Sanitizer::sanitize`].
#[must_use]
pub fn normalize_editorial_html(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    let html = if has_html_tag(&decoded) {
        decoded
    } else {
        to_html_paragraphs(&decoded)
    };
    normalize_headings(&html)
}

/// Escapes characters that are special in HTML.
///
/// Escapes `&`, `<`, `>`, `"`, `'`.
/// Safe for use in both element content and attribute values.
#[must_use]
pub(crate) fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    output
}
