use std::sync::LazyLock;

use regex::Regex;

static H1_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h1(\s[^>]*)?>").expect("valid regex"));

static H1_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</h1\s*>").expect("valid regex"));

/// Demotes every `<h1>` to `<h2>`, keeping its attributes.
///
/// The article title owns the page's only `<h1>`. This is a textual rewrite;
/// the tree sanitizer renames any `h1` element that slips past it.
#[must_use]
pub fn normalize_headings(html: &str) -> String {
    let opened = H1_OPEN.replace_all(html, "<h2${1}>");
    H1_CLOSE.replace_all(&opened, "</h2>").into_owned()
}
