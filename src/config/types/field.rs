//! Dotted config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A dotted path into `vaultpress.toml`, e.g. `vault.default_extension`.
///
/// Used to label diagnostics and as the key for [`SiteConfig::lookup`].
///
/// [`SiteConfig::lookup`]: crate::config::SiteConfig::lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Iterate over the dot separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
