//! Link syntax recognition.
//!
//! Finds wiki links (`[[target#anchor|alias]]`), wiki embeds (`![[...]]`),
//! markdown links and images, and bare `http(s)` URLs in text whose code
//! regions were already excised.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::LinkKind;
use crate::utils::path::route::{decode_link, split_path_fragment};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?P<wembed>!)?\[\[(?P<wiki>[^\[\]\n]+)\]\]"#,
        r#"|(?P<membed>!)?\[(?P<label>[^\[\]\n]*)\]\((?P<dest><[^<>\n]+>|[^()\s]+)(?:\s+(?P<title>"[^"\n]*"))?\)"#,
        r#"|(?P<url>https?://[^\s<>()\[\]"'`]+)"#,
    ))
    .expect("valid link regex")
});

/// One link found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    /// Byte range of the whole link syntax.
    pub range: Range<usize>,
    pub kind: LinkKind,
    /// Wiki alias, or the bracket text of a markdown link.
    pub label: Option<String>,
    /// Decoded destination without the fragment.
    pub path: String,
    /// Decoded fragment without `#`; empty when absent.
    pub fragment: String,
    /// Markdown link title, quotes included.
    pub title: Option<String>,
}

impl ParsedLink {
    /// Heading selector, unless the fragment is a block reference.
    pub fn anchor(&self) -> Option<&str> {
        (!self.fragment.is_empty() && !self.fragment.starts_with('^')).then_some(self.fragment.as_str())
    }

    /// Block id without the `^`.
    pub fn block(&self) -> Option<&str> {
        self.fragment.strip_prefix('^').filter(|id| !id.is_empty())
    }

    pub fn raw<'t>(&self, text: &'t str) -> &'t str {
        &text[self.range.clone()]
    }

    /// Text to show for the link when the author gave none.
    pub fn display(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            return label.to_string();
        }
        // Path as written, so `[[a/x]]` and `[[b/x]]` stay distinguishable
        let name = self.path.trim();
        let name = match name.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty() && !stem.ends_with('/') && ext.eq_ignore_ascii_case("md") =>
            {
                stem
            }
            _ => name,
        };
        match (name.is_empty(), self.fragment.is_empty()) {
            (_, true) => name.to_string(),
            (true, false) => self.fragment.trim_start_matches('^').to_string(),
            (false, false) => format!("{name} > {}", self.fragment.trim_start_matches('^')),
        }
    }
}

/// All links in `text`, in order of appearance.
pub fn find_links(text: &str) -> Vec<ParsedLink> {
    LINK.captures_iter(text).filter_map(|caps| parse(&caps)).collect()
}

fn parse(caps: &Captures<'_>) -> Option<ParsedLink> {
    let whole = caps.get(0)?;

    if let Some(inner) = caps.name("wiki") {
        let (target, alias) = match inner.as_str().split_once('|') {
            // `\|` escapes the pipe inside tables
            Some((target, alias)) => (target.trim_end_matches('\\'), Some(alias.trim().to_string())),
            None => (inner.as_str(), None),
        };
        let (path, fragment) = split_path_fragment(target.trim());
        let kind = if caps.name("wembed").is_some() {
            LinkKind::Embed
        } else {
            LinkKind::Wiki
        };
        return Some(ParsedLink {
            range: whole.range(),
            kind,
            label: alias,
            path: path.trim().to_string(),
            fragment: fragment.trim().to_string(),
            title: None,
        });
    }

    if let Some(dest) = caps.name("dest") {
        let dest = dest.as_str();
        let dest = dest
            .strip_prefix('<')
            .and_then(|d| d.strip_suffix('>'))
            .unwrap_or(dest);
        let (path, fragment) = split_path_fragment(dest);
        let kind = if caps.name("membed").is_some() {
            LinkKind::Embed
        } else {
            LinkKind::Markdown
        };
        return Some(ParsedLink {
            range: whole.range(),
            kind,
            label: caps.name("label").map(|l| l.as_str().to_string()),
            path: decode_link(path).into_owned(),
            fragment: decode_link(fragment).into_owned(),
            title: caps.name("title").map(|t| t.as_str().to_string()),
        });
    }

    let url = caps.name("url")?;
    let trimmed = url.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
    Some(ParsedLink {
        range: url.start()..url.start() + trimmed.len(),
        kind: LinkKind::RawUrl,
        label: None,
        path: trimmed.to_string(),
        fragment: String::new(),
        title: None,
    })
}

/// Replace each link's range with the text `rewrite` returns.
///
/// `None` keeps the original syntax.
pub fn rewrite_links(
    text: &str,
    links: &[ParsedLink],
    mut rewrite: impl FnMut(&ParsedLink) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for link in links {
        out.push_str(&text[last..link.range.start]);
        match rewrite(link) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(link.raw(text)),
        }
        last = link.range.end;
    }
    out.push_str(&text[last..]);
    out
}
