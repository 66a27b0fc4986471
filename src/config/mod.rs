//! Site configuration management for `vaultpress.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [vault], [site], [build]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config discovery, url and path helpers
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The loaded config is the read-only settings provider for a build: every
//! value is reachable by dotted path through [`SiteConfig::lookup`].

pub mod section;
pub mod types;
mod util;

use util::{expand_path, extract_url_path, find_config_file};

pub use section::{BuildSectionConfig, SiteSectionConfig, SlugConfig, SlugMode, VaultConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the intermediate (Stage A) output directory below `build.output`.
pub const MD_DIR: &str = "md";
/// Name of the page (Stage B) output directory below `build.output`.
pub const HTML_DIR: &str = "html";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `vaultpress.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory, parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Link prefix derived from `site.url`, without slashes (internal use only)
    #[serde(skip)]
    pub site_prefix: String,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub site: SiteSectionConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from the working directory. Without a config file the
    /// defaults apply and the working directory is the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = crate::utils::path::normalize_path(&path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.apply_cli(cli);
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Resolve every path against `root` and derive the site prefix.
    ///
    /// Called once by [`Self::load`]; tests call it directly on a parsed config.
    pub fn finalize(&mut self, root: &Path) {
        self.root = crate::utils::path::normalize_path(root);
        self.vault.root = expand_path(&self.vault.root, &self.root);
        self.build.output = expand_path(&self.build.output, &self.root);

        self.site_prefix = self
            .site
            .url
            .as_deref()
            .and_then(extract_url_path)
            .unwrap_or_default();
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.vault.root, cli.vault.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Commands::Build { build_args } = &cli.command {
            self.apply_build_args(build_args);
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.vault.entrypoint, args.entrypoint.as_ref());
        if args.site_url.is_some() {
            self.site.url = args.site_url.clone();
        }
        if args.max_depth.is_some() {
            self.vault.max_depth = args.max_depth;
        }
        self.vault.process_all |= args.process_all;
        self.build.clean |= args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Vault directory (absolute after [`Self::finalize`]).
    pub fn vault_dir(&self) -> &Path {
        &self.vault.root
    }

    /// Directory receiving Stage A output.
    pub fn md_dir(&self) -> PathBuf {
        self.build.output.join(MD_DIR)
    }

    /// Directory receiving Stage B output.
    pub fn html_dir(&self) -> PathBuf {
        self.build.output.join(HTML_DIR)
    }

    /// Prefix for root-relative links: `""` or `"/prefix"`.
    pub fn url_base(&self) -> String {
        if self.site_prefix.is_empty() {
            String::new()
        } else {
            format!("/{}", self.site_prefix)
        }
    }

    /// Read a resolved setting by dotted path, e.g. `vault.case_insensitive`.
    ///
    /// Array elements are addressed by index (`vault.exclude.0`).
    pub fn lookup(&self, dotted: &str) -> Option<toml::Value> {
        let mut value = toml::Value::try_from(self).ok()?;
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            value = match value {
                toml::Value::Table(mut table) => table.remove(segment)?,
                toml::Value::Array(mut items) => {
                    let index: usize = segment.parse().ok()?;
                    if index >= items.len() {
                        return None;
                    }
                    items.swap_remove(index)
                }
                _ => return None,
            };
        }
        Some(value)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, reporting every error at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.vault.validate(&mut diag);
        self.site.validate(&mut diag);
        self.build.validate(&mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse a config snippet and root it at `root`, as `load` would.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    config.finalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(SiteConfig::parse_with_ignored("[vault\nroot = \"x\"").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[vault]\nroot = \"notes\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.vault.root, PathBuf::from("notes"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_finalize_paths_and_prefix() {
        let config = test_config_at(
            Path::new("/project"),
            "[site]\nurl = \"https://example.github.io/notes/\"\n[build]\noutput = \"public\"",
        );
        assert_eq!(config.vault_dir(), Path::new("/project/vault"));
        assert_eq!(config.md_dir(), PathBuf::from("/project/public/md"));
        assert_eq!(config.html_dir(), PathBuf::from("/project/public/html"));
        assert_eq!(config.site_prefix, "notes");
        assert_eq!(config.url_base(), "/notes");
    }

    #[test]
    fn test_url_base_without_site_url() {
        let config = test_config_at(Path::new("/project"), "");
        assert_eq!(config.url_base(), "");
    }

    #[test]
    fn test_lookup_dotted_path() {
        let config = test_parse_config("[vault]\ncase_insensitive = true\nmax_depth = 3");

        assert_eq!(
            config.lookup("vault.case_insensitive"),
            Some(toml::Value::Boolean(true))
        );
        assert_eq!(
            config.lookup("vault.max_depth"),
            Some(toml::Value::Integer(3))
        );
        assert_eq!(
            config.lookup("vault.default_extension"),
            Some(toml::Value::String("md".into()))
        );
        assert_eq!(
            config.lookup("vault.exclude.1"),
            Some(toml::Value::String(".git".into()))
        );
        assert_eq!(
            config.lookup("build.slug.fragment"),
            Some(toml::Value::String("full".into()))
        );
        assert_eq!(config.lookup("site.url"), None);
        assert_eq!(config.lookup("vault.nope"), None);
        assert_eq!(config.lookup("vault.exclude.9"), None);
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = test_parse_config(
            "[vault]\ndefault_extension = \".md\"\n[site]\nurl = \"not a url\"",
        );
        let err = config.validate().unwrap_err();
        let diag = match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => diag,
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(diag.len(), 2);
    }
}
