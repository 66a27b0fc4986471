//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `to_vault_key` - relative vault path with `/` separators

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Convert a path relative to the vault root into a namespace key.
///
/// Separators are normalized to `/` regardless of platform and `.`
/// components are dropped. Returns `None` when the path escapes the root.
pub fn to_vault_key(relative: &Path) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_to_vault_key() {
        assert_eq!(
            to_vault_key(Path::new("notes/daily/today.md")).as_deref(),
            Some("notes/daily/today.md")
        );
        assert_eq!(
            to_vault_key(Path::new("./notes/../index.md")).as_deref(),
            Some("index.md")
        );
        assert_eq!(to_vault_key(Path::new("../outside.md")), None);
        assert_eq!(to_vault_key(Path::new("")), None);
    }
}
