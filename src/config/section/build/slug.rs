//! Slug configuration.

use serde::{Deserialize, Serialize};

/// Slug generation mode for paths and anchors.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Full slugify: Unicode → ASCII, lowercase, dash separator.
    Full,
    /// Safe mode: remove dangerous chars, preserve Unicode, lowercase (default).
    #[default]
    Safe,
    /// ASCII mode: transliterate Unicode → ASCII, keep case.
    Ascii,
    /// No modification; preserve original text.
    No,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    /// Slugify page paths.
    pub path: SlugMode,
    /// Slugify heading anchors.
    pub fragment: SlugMode,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            path: SlugMode::Safe,
            fragment: SlugMode::Full,
        }
    }
}
