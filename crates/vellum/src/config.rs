use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "vellum.toml";

pub(crate) const DEFAULT_SITE_ORIGIN: &str = "http://localhost";
pub(crate) const DEFAULT_IMAGE_ALT: &str = "Imagen";

/// Engine configuration loaded from `vellum.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Origin the site is served from. Relative URLs resolve against it, and
    /// absolute URLs on it count as internal links.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// `alt` text for images that carry none.
    #[serde(default = "default_image_alt")]
    pub default_image_alt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_origin: default_site_origin(),
            default_image_alt: default_image_alt(),
        }
    }
}

impl Config {
    /// Load configuration from `vellum.toml` in the given project root.
    ///
    /// Falls back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("failed to read {CONFIG_FILE}"))?;
            toml::from_str(&contents).with_context(|| format!("failed to parse {CONFIG_FILE}"))
        } else {
            Ok(Self::default())
        }
    }
}

fn default_site_origin() -> String {
    String::from(DEFAULT_SITE_ORIGIN)
}

fn default_image_alt() -> String {
    String::from(DEFAULT_IMAGE_ALT)
}
