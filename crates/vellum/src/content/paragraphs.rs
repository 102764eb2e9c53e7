use std::sync::LazyLock;

use regex::Regex;

use super::escape_html;

/// Two or more line breaks, optionally separated by horizontal whitespace.
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("valid regex"));

/// Promotes newline-delimited plain text to paragraph markup.
///
/// Blank-line runs separate paragraphs; single newlines become `<br/>`.
/// Every block is HTML-escaped. Returns `<p></p>` when no block has content.
#[must_use]
pub fn to_html_paragraphs(text: &str) -> String {
    let html: String = BLOCK_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            let lines: Vec<String> = block.lines().map(escape_html).collect();
            format!("<p>{}</p>", lines.join("<br/>"))
        })
        .collect();

    if html.is_empty() {
        String::from("<p></p>")
    } else {
        html
    }
}
