pub mod config;
pub mod content;
pub mod diagnostics;
pub mod sanitize;

pub use content::format::{ContentFormat, detect_format};
pub use content::normalize_editorial_html;
pub use diagnostics::{EditorialDiagnostics, editorial_diagnostics};
pub use sanitize::{Sanitizer, render_editorial_html, sanitize_editorial_html};
