//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Extract the path component of a URL, without surrounding slashes.
///
/// Returns `None` if the URL is invalid.
///
/// # Examples
/// ```ignore
/// extract_url_path("https://example.github.io/notes/") -> Some("notes")
/// extract_url_path("https://example.com")              -> Some("")
/// extract_url_path("invalid")                          -> None
/// ```
pub fn extract_url_path(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    Some(parsed.path().trim_matches('/').to_string())
}

/// Find the config file by walking upward from `start`.
///
/// An absolute `config_name` is returned as is when it exists.
///
/// ```text
/// /home/user/notes/vault/daily/   ← start
/// /home/user/notes/vaultpress.toml ← found
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Expand `~` and make `path` absolute against `root`.
pub fn expand_path(path: &Path, root: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).into_owned()),
        None => path.to_path_buf(),
    };
    let full = if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    };
    crate::utils::path::normalize_path(&full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_url_path() {
        assert_eq!(
            extract_url_path("https://example.github.io/my-notes/"),
            Some("my-notes".to_string())
        );
        assert_eq!(
            extract_url_path("https://example.com:8080/a/b?x=1#y"),
            Some("a/b".to_string())
        );
        assert_eq!(extract_url_path("https://example.com"), Some(String::new()));
        assert_eq!(extract_url_path("invalid-url"), None);
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("vault/daily");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("vaultpress.toml"), "").unwrap();

        let found = find_config_file(&nested, Path::new("vaultpress.toml")).unwrap();
        assert_eq!(found, dir.path().join("vaultpress.toml"));
        assert!(find_config_file(&nested, Path::new("missing.toml")).is_none());
    }

    #[test]
    fn test_expand_path() {
        let root = Path::new("/project");
        assert_eq!(
            expand_path(Path::new("vault"), root),
            PathBuf::from("/project/vault")
        );
        assert_eq!(
            expand_path(Path::new("/abs/out"), root),
            PathBuf::from("/abs/out")
        );
    }
}
