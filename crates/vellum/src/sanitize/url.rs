use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};
use url::Url;

/// Scheme prefixes refused before any parsing, compared after removing
/// whitespace and control characters.
const BLOCKED_PREFIXES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

/// Schemes a resolved URL may carry.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Outcome of classifying a link or image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    /// Same-site reference: a path, fragment, or URL resolving to the site origin.
    Internal,
    /// `http(s)`, `mailto` or `tel` URL pointing elsewhere.
    External,
    /// Inline `data:image/*` payload, only accepted for images.
    DataImage,
    /// Same-origin `blob:` object URL.
    Blob,
    /// Anything unsafe or unparsable.
    Blocked,
}

/// A classified URL together with the value to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedUrl<'a> {
    pub kind: UrlKind,
    /// The trimmed input; empty when blocked.
    pub value: &'a str,
}

impl ClassifiedUrl<'_> {
    const BLOCKED: Self = Self {
        kind: UrlKind::Blocked,
        value: "",
    };

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.kind == UrlKind::Blocked
    }
}

/// Classifies `raw` for use in an `href` or `src`.
///
/// - Executable schemes (`javascript:`, `vbscript:`, `data:text/html`) are
///   blocked however they are cased or padded with whitespace/control chars.
/// - Root-relative paths, fragments, `./` and `../` are internal as written.
/// - `data:image/*` is accepted only when `allow_image_data` is set.
/// - `blob:` URLs are accepted as written.
/// - Everything else is resolved against `origin` and must use an allowed scheme.
#[must_use]
pub fn classify_url<'a>(raw: &'a str, origin: &Url, allow_image_data: bool) -> ClassifiedUrl<'a> {
    let value = raw.trim();
    if value.is_empty() || has_blocked_scheme(value) {
        return ClassifiedUrl::BLOCKED;
    }

    let accept = |kind| ClassifiedUrl { kind, value };

    if is_relative_reference(value) {
        return accept(UrlKind::Internal);
    }
    if allow_image_data && starts_with_ignore_ascii_case(value, "data:image/") {
        return accept(UrlKind::DataImage);
    }
    if starts_with_ignore_ascii_case(value, "blob:") {
        return accept(UrlKind::Blob);
    }

    let Ok(resolved) = origin.join(value) else {
        return ClassifiedUrl::BLOCKED;
    };
    if !ALLOWED_SCHEMES.contains(&resolved.scheme()) {
        return ClassifiedUrl::BLOCKED;
    }
    if resolved.origin() == origin.origin() {
        accept(UrlKind::Internal)
    } else {
        accept(UrlKind::External)
    }
}

fn has_blocked_scheme(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BLOCKED_PREFIXES
        .iter()
        .any(|prefix| compact.starts_with(prefix))
}

/// `/path`, `#frag`, `./x`, `../x`, but not protocol-relative `//host`
/// (browsers also read `/\host` that way).
fn is_relative_reference(value: &str) -> bool {
    if let Some(rest) = value.strip_prefix('/') {
        return !rest.starts_with(['/', '\\']);
    }
    value.starts_with('#') || value.starts_with("./") || value.starts_with("../")
}

fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
