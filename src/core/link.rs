//! Link classification.

use crate::utils::path::route::{is_external_link, is_relative_link};
use serde::Serialize;

/// How a link occurrence was written in the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[target#anchor|alias]]`
    Wiki,
    /// `[alias](target)`
    Markdown,
    /// `![[target]]` or `![alt](target)`
    Embed,
    /// A bare `https://...` in text
    RawUrl,
    /// `<inclusion href="..."/>` produced by Stage A for embedded notes
    Inclusion,
}

/// Syntactic classification of a link destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// External link with URL scheme (https://, mailto:, etc.)
    External(&'a str),
    /// Pure fragment (`#section`). Value is the anchor without `#`.
    Fragment(&'a str),
    /// Vault-root path (`/folder/note.md`).
    Root(&'a str),
    /// Relative to the current note (`./x.md`, `../y.md`).
    Relative(&'a str),
    /// Bare name, resolved against the whole vault (`note`, `folder/note`).
    Bare(&'a str),
}

impl<'a> LinkTarget<'a> {
    /// Parse a link destination into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if let Some(anchor) = link.strip_prefix("./#") {
            Self::Fragment(anchor)
        } else if link.starts_with('/') {
            Self::Root(link)
        } else if is_relative_link(link) {
            Self::Relative(link)
        } else {
            Self::Bare(link)
        }
    }

    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_external() {
        assert_eq!(
            LinkTarget::parse("https://example.com"),
            LinkTarget::External("https://example.com")
        );
        assert!(LinkTarget::parse("mailto:a@b.c").is_external());
    }

    #[test]
    fn test_parse_fragment() {
        assert_eq!(LinkTarget::parse("#section"), LinkTarget::Fragment("section"));
        assert_eq!(LinkTarget::parse("./#section"), LinkTarget::Fragment("section"));
        assert_eq!(LinkTarget::parse("#"), LinkTarget::Fragment(""));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            LinkTarget::parse("/notes/a.md#x"),
            LinkTarget::Root("/notes/a.md#x")
        );
        assert_eq!(
            LinkTarget::parse("../other.md"),
            LinkTarget::Relative("../other.md")
        );
        assert_eq!(LinkTarget::parse("Some Note"), LinkTarget::Bare("Some Note"));
        assert_eq!(
            LinkTarget::parse("Meeting: notes"),
            LinkTarget::Bare("Meeting: notes")
        );
    }
}
