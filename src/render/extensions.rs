//! Renderer extensions.

use std::sync::LazyLock;

use regex::Regex;

use crate::deferred::{Placeholder, neutralize};
use crate::utils::html::escape;

/// Handlers for fenced code blocks, keyed by info-string language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHandler {
    /// ```` ```mermaid ```` → `<pre class="mermaid">`, rendered client side.
    Mermaid,
    /// ```` ```query ```` → embedded search results, filled in by the
    /// deferred pass.
    Query,
}

impl BlockHandler {
    pub const fn language(self) -> &'static str {
        match self {
            Self::Mermaid => "mermaid",
            Self::Query => "query",
        }
    }

    pub fn render(self, code: &str) -> String {
        match self {
            Self::Mermaid => format!(
                "<pre class=\"mermaid\">{}</pre>\n",
                neutralize(&escape(code))
            ),
            Self::Query => format!(
                "<div class=\"embedded-search\">{}</div>\n",
                Placeholder::search(code).encode()
            ),
        }
    }
}

static HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==([^=\s](?:[^=]*[^=\s])?)==").expect("valid highlight regex"));

/// Patterns applied to escaped inline text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlinePattern {
    /// `==text==` → `<mark>text</mark>`
    Highlight,
}

impl InlinePattern {
    /// Rewrite already escaped text. `None` when the pattern does not occur.
    pub fn apply(self, escaped: &str) -> Option<String> {
        match self {
            Self::Highlight => HIGHLIGHT
                .is_match(escaped)
                .then(|| HIGHLIGHT.replace_all(escaped, "<mark>$1</mark>").into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::tokens;

    #[test]
    fn test_mermaid_is_escaped() {
        let html = BlockHandler::Mermaid.render("A-->B<C");
        assert_eq!(html, "<pre class=\"mermaid\">A--&gt;B&lt;C</pre>\n");
    }

    #[test]
    fn test_query_emits_placeholder() {
        let html = BlockHandler::Query.render("tag:project\n");
        assert_eq!(tokens(&html), vec![Placeholder::search("tag:project")]);
    }

    #[test]
    fn test_highlight() {
        assert_eq!(
            InlinePattern::Highlight.apply("a ==big== deal").as_deref(),
            Some("a <mark>big</mark> deal")
        );
        assert_eq!(InlinePattern::Highlight.apply("a == b"), None);
        assert_eq!(InlinePattern::Highlight.apply("x ==== y"), None);
    }
}
