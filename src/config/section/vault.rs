//! `[vault]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [vault]
//! root = "notes"                  # Vault directory (relative to project root)
//! entrypoint = "Home.md"          # Crawl starts here
//! extra_entrypoints = ["Inbox.md"]
//! case_insensitive = true         # [[home]] finds Home.md
//! default_extension = "md"        # Appended when a link omits it
//! process_all = false             # Also render notes nothing links to
//! max_depth = 4                   # Stop following links past this depth
//! exclude = [".obsidian", "templates"]
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault directory.
    pub root: PathBuf,

    /// Entry note, relative to the vault root.
    pub entrypoint: String,

    /// Additional crawl roots, relative to the vault root.
    pub extra_entrypoints: Vec<String>,

    /// Fold note paths to lowercase for registration and lookup.
    pub case_insensitive: bool,

    /// Extension appended to extension-less links during resolution.
    pub default_extension: String,

    /// Sweep notes not reachable from any entrypoint.
    pub process_all: bool,

    /// Link-following depth limit. Notes at the limit are still rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Vault-relative path prefixes skipped while scanning.
    pub exclude: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: "vault".into(),
            entrypoint: "index.md".into(),
            extra_entrypoints: Vec::new(),
            case_insensitive: false,
            default_extension: "md".into(),
            process_all: false,
            max_depth: None,
            exclude: vec![".obsidian".into(), ".git".into(), ".trash".into()],
        }
    }
}

impl VaultConfig {
    pub const ENTRYPOINT: FieldPath = FieldPath::new("vault.entrypoint");
    pub const DEFAULT_EXTENSION: FieldPath = FieldPath::new("vault.default_extension");
    pub const MAX_DEPTH: FieldPath = FieldPath::new("vault.max_depth");

    /// Check if a vault-relative path falls under an excluded prefix.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.exclude.iter().any(|prefix| {
            let prefix = prefix.trim_matches('/');
            !prefix.is_empty()
                && rel_path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.entrypoint.trim().is_empty() {
            diag.error(Self::ENTRYPOINT, "entrypoint must not be empty");
        }

        if self.default_extension.is_empty() {
            diag.error(Self::DEFAULT_EXTENSION, "default extension must not be empty");
        } else if self.default_extension.starts_with('.') {
            diag.error_with_hint(
                Self::DEFAULT_EXTENSION,
                format!("`{}` starts with a dot", self.default_extension),
                format!(
                    "write `{}` instead",
                    self.default_extension.trim_start_matches('.')
                ),
            );
        }

        if self.max_depth == Some(0) {
            diag.warn(
                Self::MAX_DEPTH,
                "max_depth = 0 renders only the entrypoints",
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
        assert_eq!(config.vault.root, PathBuf::from("vault"));
        assert_eq!(config.vault.entrypoint, "index.md");
        assert_eq!(config.vault.default_extension, "md");
        assert!(!config.vault.case_insensitive);
        assert!(!config.vault.process_all);
        assert_eq!(config.vault.max_depth, None);
    }

    #[test]
    fn test_parse_vault_section() {
        let config = test_parse_config(
            "[vault]\nroot = \"notes\"\nentrypoint = \"Home.md\"\ncase_insensitive = true\nmax_depth = 3",
        );
        assert_eq!(config.vault.root, PathBuf::from("notes"));
        assert_eq!(config.vault.entrypoint, "Home.md");
        assert!(config.vault.case_insensitive);
        assert_eq!(config.vault.max_depth, Some(3));
    }

    #[test]
    fn test_is_excluded() {
        let vault = VaultConfig::default();
        assert!(vault.is_excluded(".obsidian/app.json"));
        assert!(vault.is_excluded(".git"));
        assert!(!vault.is_excluded(".github/notes.md"));
        assert!(!vault.is_excluded("notes/.obsidian.md"));
    }

    #[test]
    fn test_validate_extension() {
        let mut diag = ConfigDiagnostics::new();
        let vault = VaultConfig {
            default_extension: ".md".into(),
            ..Default::default()
        };
        vault.validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        let vault = VaultConfig {
            default_extension: String::new(),
            ..Default::default()
        };
        vault.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
