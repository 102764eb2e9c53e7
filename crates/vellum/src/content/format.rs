use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Matches an entity-escaped tag such as `&lt;p class=&quot;x&quot;&gt;`.
static ESCAPED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)&lt;/?[a-z][a-z0-9-]*(?:\s.*?|/)?&gt;").expect("valid regex")
});

/// Matches a literal tag such as `<p>`, `</p>`, `<br/>` or `<a href="x">`.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[a-z][a-z0-9-]*(?:\s[^<>]*)?/?>").expect("valid regex"));

/// The shape raw editorial content arrives in.
///
/// - `AsRefStr` / `Display` yield the snake_case identifier (e.g., `"escaped_html"`).
/// - `EnumString` provides case-insensitive [`FromStr`](std::str::FromStr).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString, EnumIter, Serialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    /// Markup with literal tags.
    Html,
    /// Markup whose tags were entity-escaped, typically by a double encode.
    EscapedHtml,
    /// Newline-delimited text without any tags.
    PlainText,
}

/// Classifies raw content by cheap pattern matching.
///
/// Escaped tags take priority over literal ones. The result is informational:
/// nothing security-relevant depends on it.
#[must_use]
pub fn detect_format(raw: &str) -> ContentFormat {
    if has_escaped_html_tag(raw) {
        ContentFormat::EscapedHtml
    } else if has_html_tag(raw) {
        ContentFormat::Html
    } else {
        ContentFormat::PlainText
    }
}

/// Returns `true` if `value` contains an entity-escaped tag.
#[must_use]
pub(crate) fn has_escaped_html_tag(value: &str) -> bool {
    ESCAPED_TAG.is_match(value)
}

/// Returns `true` if `value` contains a literal tag.
#[must_use]
pub(crate) fn has_html_tag(value: &str) -> bool {
    HTML_TAG.is_match(value)
}
