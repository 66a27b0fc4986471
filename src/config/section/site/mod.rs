//! `[site]` section configuration.
//!
//! ```toml
//! [site]
//! title = "My Vault"
//! url = "https://example.github.io/notes"   # path `notes` becomes the link prefix
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Site title, shown in every page's `<title>` and header.
    pub title: String,

    /// Public site URL. Its path component is the prefix of every emitted link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for SiteSectionConfig {
    fn default() -> Self {
        Self {
            title: "Vault".into(),
            url: None,
        }
    }
}

impl SiteSectionConfig {
    pub const URL: FieldPath = FieldPath::new("site.url");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.url
            && url::Url::parse(url).is_err()
        {
            diag.error_with_hint(
                Self::URL,
                format!("`{url}` is not a valid URL"),
                "include the scheme, e.g. https://example.com/notes",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.site.title, "Vault");
        assert!(config.site.url.is_none());
    }

    #[test]
    fn test_validate_url() {
        let mut diag = ConfigDiagnostics::new();
        let site = SiteSectionConfig {
            url: Some("example.com/notes".into()),
            ..Default::default()
        };
        site.validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        let site = SiteSectionConfig {
            url: Some("https://example.com/notes".into()),
            ..Default::default()
        };
        site.validate(&mut diag);
        assert!(diag.is_empty());
    }
}
