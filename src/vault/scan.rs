//! Vault scanning.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use jwalk::WalkDir;

use super::{DocKind, Document, Source, VaultIndex};
use crate::config::SiteConfig;
use crate::debug;
use crate::utils::path::to_vault_key;

/// Collect every file below `dir`, sorted so registration order is stable.
pub fn collect_vault_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect()
}

/// Build the namespace index from the vault directory.
///
/// Files matching `vault.default_extension` become notes, everything else
/// media. Excluded prefixes and the output directory are skipped.
pub fn scan_vault(config: &SiteConfig) -> Result<VaultIndex> {
    let root = config.vault_dir();
    if !root.is_dir() {
        bail!("vault directory `{}` does not exist", root.display());
    }

    let mut index = VaultIndex::new(config.vault.case_insensitive);
    for path in collect_vault_files(root) {
        if path.starts_with(&config.build.output) {
            continue;
        }
        let Some(key) = path.strip_prefix(root).ok().and_then(to_vault_key) else {
            continue;
        };
        if config.vault.is_excluded(&key) {
            continue;
        }

        let kind = if is_note_path(&key, &config.vault.default_extension) {
            DocKind::Note
        } else {
            DocKind::Media
        };
        index.register(Document::new(key, Source::File(path), kind));
    }

    debug!("scan"; "{} files in {}", index.len(), root.display());
    Ok(index)
}

/// Check the extension case-insensitively.
pub fn is_note_path(path: &str, extension: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.ends_with('/') && ext.eq_ignore_ascii_case(extension))
}
