//! Link string utilities.
//!
//! Provides consistent link handling across the pipeline:
//! - Link type detection (external vs internal)
//! - Fragment splitting
//! - Relative marker and site prefix stripping
//! - Percent-encoding of link destinations

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped in a link path. `/` stays literal.
const PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Schemes that never carry an authority (`//`) but are still external.
const OPAQUE_SCHEMES: &[&str] = &["mailto", "tel", "data", "javascript", "obsidian"];

/// Check if a link is external (has a URL scheme like `https://`, `mailto:`, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
/// - Be followed by `//`, unless it is a known opaque scheme
///
/// The authority requirement keeps note names such as `Meeting: notes`
/// internal.
///
/// # Examples
/// ```ignore
/// assert!(is_external_link("https://example.com"));
/// assert!(is_external_link("mailto:user@example.com"));
/// assert!(!is_external_link("/about"));
/// assert!(!is_external_link("Meeting: notes"));
/// ```
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        let scheme = &link[..pos];
        pos > 0
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            && (link[pos + 1..].starts_with("//")
                || OPAQUE_SCHEMES
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(scheme)))
    })
}

/// Split a link into path and fragment parts
///
/// # Returns
/// A tuple of (path, fragment) where fragment is empty string if no `#` found
///
/// # Examples
/// ```ignore
/// assert_eq!(split_path_fragment("note#team"), ("note", "team"));
/// assert_eq!(split_path_fragment("note"), ("note", ""));
/// ```
#[inline]
pub fn split_path_fragment(link: &str) -> (&str, &str) {
    link.split_once('#').unwrap_or((link, ""))
}

/// Strip leading `./` and any number of `../` markers.
///
/// # Examples
/// ```ignore
/// assert_eq!(strip_relative_markers("../../a/b.md"), "a/b.md");
/// assert_eq!(strip_relative_markers("./a.md"), "a.md");
/// ```
pub fn strip_relative_markers(link: &str) -> &str {
    let mut rest = link;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Strip a leading site prefix (e.g. `/docs/`) and leading slashes.
///
/// An empty prefix only strips leading slashes.
pub fn strip_site_prefix<'a>(link: &'a str, prefix: &str) -> &'a str {
    let prefix = prefix.trim_matches('/');
    let trimmed = link.trim_start_matches('/');
    if prefix.is_empty() || !link.starts_with('/') {
        return trimmed;
    }
    match trimmed.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => trimmed,
    }
}

/// Check if a link starts with a relative marker (`./` or `../`).
#[inline]
pub fn is_relative_link(link: &str) -> bool {
    link.starts_with("./") || link.starts_with("../")
}

/// Percent-encode a path or fragment for use as a markdown/HTML link.
pub fn encode_link(s: &str) -> String {
    utf8_percent_encode(s, PATH_SET).to_string()
}

/// Undo [`encode_link`]. Invalid UTF-8 sequences decode lossily.
pub fn decode_link(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Root-relative URL of a page below the html directory.
///
/// `base` is `""` or `"/prefix"`.
pub fn page_url(base: &str, page_path: &str) -> String {
    format!("{base}/{}", encode_link(page_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_external_link() {
        assert!(is_external_link("https://example.com"));
        assert!(is_external_link("http://example.com"));
        assert!(is_external_link("mailto:user@example.com"));
        assert!(is_external_link("tel:+1234567890"));
        assert!(!is_external_link("/about"));
        assert!(!is_external_link("./file.txt"));
        assert!(!is_external_link("#section"));
        assert!(!is_external_link("Meeting: notes"));
        assert!(!is_external_link(":weird"));
    }

    #[test]
    fn test_split_path_fragment() {
        assert_eq!(split_path_fragment("note#team"), ("note", "team"));
        assert_eq!(split_path_fragment("note"), ("note", ""));
        assert_eq!(split_path_fragment("#section"), ("", "section"));
        assert_eq!(split_path_fragment("a#b#c"), ("a", "b#c"));
    }

    #[test]
    fn test_strip_relative_markers() {
        assert_eq!(strip_relative_markers("../../a/b.md"), "a/b.md");
        assert_eq!(strip_relative_markers("./a.md"), "a.md");
        assert_eq!(strip_relative_markers("./../a.md"), "a.md");
        assert_eq!(strip_relative_markers("a.md"), "a.md");
    }

    #[test]
    fn test_strip_site_prefix() {
        assert_eq!(strip_site_prefix("/docs/a/b.md", "docs"), "a/b.md");
        assert_eq!(strip_site_prefix("/docs/a/b.md", "/docs/"), "a/b.md");
        assert_eq!(strip_site_prefix("/docsets/a.md", "docs"), "docsets/a.md");
        assert_eq!(strip_site_prefix("/a/b.md", ""), "a/b.md");
        assert_eq!(strip_site_prefix("docs/a.md", "docs"), "docs/a.md");
    }

    #[test]
    fn test_encode_decode_link() {
        assert_eq!(encode_link("My Note (draft).md"), "My%20Note%20%28draft%29.md");
        assert_eq!(encode_link("a/b.md"), "a/b.md");
        assert_eq!(decode_link("My%20Note%20%28draft%29.md"), "My Note (draft).md");
        assert_eq!(decode_link(&encode_link("日記/今日.md")), "日記/今日.md");
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url("", "index.html"), "/index.html");
        assert_eq!(page_url("/docs", "a/my note.html"), "/docs/a/my%20note.html");
    }
}
