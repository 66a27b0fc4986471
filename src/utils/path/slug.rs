//! Slugification for page paths and heading anchors.

use deunicode::deunicode;
pub use crate::config::SlugMode;

/// Characters that are never allowed in a slug segment.
const DANGEROUS: &[char] = &[
    '<', '>', ':', '"', '/', '\\', '|', '?', '*', '#', '%', '&', '{', '}', '[', ']', '^', '`',
    '\'', '(', ')', '!', '=', '+', ',', ';', '$', '@', '~',
];

/// Slugify a single piece of text (a heading title or one path segment).
pub fn slugify(text: &str, mode: SlugMode) -> String {
    match mode {
        SlugMode::No => text.to_string(),
        SlugMode::Full => collapse(&deunicode(text).to_lowercase(), |c| {
            c.is_ascii_alphanumeric() || c == '_'
        }),
        SlugMode::Ascii => collapse(&deunicode(text), |c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
        }),
        SlugMode::Safe => collapse(&text.to_lowercase(), |c| {
            !c.is_whitespace() && !c.is_control() && !DANGEROUS.contains(&c) && c != '-'
        }),
    }
}

/// Slugify every segment of a `/` separated path.
///
/// Empty segments are dropped.
pub fn slugify_path(path: &str, mode: SlugMode) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| slugify(segment, mode))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Keep characters accepted by `keep`, turn runs of anything else into one `-`.
fn collapse(text: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if keep(c) {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mode() {
        assert_eq!(slugify("Hello World", SlugMode::Full), "hello-world");
        assert_eq!(slugify("  Intro!  ", SlugMode::Full), "intro");
        assert_eq!(slugify("Café Crème", SlugMode::Full), "cafe-creme");
        assert_eq!(slugify("a -- b", SlugMode::Full), "a-b");
        assert_eq!(slugify("!!!", SlugMode::Full), "");
    }

    #[test]
    fn test_safe_mode_preserves_unicode() {
        assert_eq!(slugify("Café Crème", SlugMode::Safe), "café-crème");
        assert_eq!(slugify("What? Why!", SlugMode::Safe), "what-why");
    }

    #[test]
    fn test_ascii_and_no_modes() {
        assert_eq!(slugify("Café Notes", SlugMode::Ascii), "Cafe-Notes");
        assert_eq!(slugify("Café Notes", SlugMode::No), "Café Notes");
    }

    #[test]
    fn test_slugify_path() {
        assert_eq!(
            slugify_path("Folder A/My Note", SlugMode::Safe),
            "folder-a/my-note"
        );
        assert_eq!(slugify_path("/a//b/", SlugMode::Full), "a/b");
    }
}
