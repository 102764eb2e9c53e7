use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::content::format::{ContentFormat, detect_format};
use crate::sanitize::Sanitizer;

/// Opening tags counted in sanitized output.
static COUNTED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(h2|h3|ul|ol|blockquote|code|img)[\s/>]").expect("valid regex")
});

/// Summary of how raw content fared through the pipeline, for editor feedback.
///
/// Lengths are counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorialDiagnostics {
    pub format: ContentFormat,
    pub raw_length: usize,
    pub sanitized_length: usize,
    pub h2: usize,
    pub h3: usize,
    pub ul: usize,
    pub ol: usize,
    pub blockquote: usize,
    pub code: usize,
    pub img: usize,
    pub sanitized_html: String,
}

impl Sanitizer {
    /// Runs the full pipeline over `raw` and reports its input format and the
    /// structure of the result.
    #[must_use]
    pub fn diagnose(&self, raw: &str) -> EditorialDiagnostics {
        let format = detect_format(raw);
        let sanitized_html = self.render(raw);

        let mut diagnostics = EditorialDiagnostics {
            format,
            raw_length: raw.chars().count(),
            sanitized_length: sanitized_html.chars().count(),
            h2: 0,
            h3: 0,
            ul: 0,
            ol: 0,
            blockquote: 0,
            code: 0,
            img: 0,
            sanitized_html: String::new(),
        };

        for caps in COUNTED_TAG.captures_iter(&sanitized_html) {
            let counter = match &caps[1] {
                "h2" => &mut diagnostics.h2,
                "h3" => &mut diagnostics.h3,
                "ul" => &mut diagnostics.ul,
                "ol" => &mut diagnostics.ol,
                "blockquote" => &mut diagnostics.blockquote,
                "code" => &mut diagnostics.code,
                _ => &mut diagnostics.img,
            };
            *counter += 1;
        }

        diagnostics.sanitized_html = sanitized_html;
        diagnostics
    }
}

/// Diagnoses `raw` with the default site origin.
#[must_use]
pub fn editorial_diagnostics(raw: &str) -> EditorialDiagnostics {
    Sanitizer::default().diagnose(raw)
}
