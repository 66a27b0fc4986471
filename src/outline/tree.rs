//! Heading tree.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SlugMode;
use crate::utils::path::slug::slugify;

/// Index of a section inside an [`Outline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A line of text or a nested section, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Line(String),
    Child(NodeId),
}

#[derive(Debug, Clone)]
pub struct Section {
    /// 0 for the virtual root.
    pub level: usize,
    pub title: String,
    pub slug: String,
    pub content: Vec<Content>,
    pub parent: Option<NodeId>,
}

/// Unique slug allocation within one document.
///
/// The first claim of a slug gets it as is; later claims get `_1`, `_2`, ...
#[derive(Debug, Default)]
pub struct SlugSet {
    seen: FxHashSet<String>,
}

impl SlugSet {
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "section" } else { base };
        if self.seen.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Parsed heading structure of one document.
#[derive(Debug, Clone)]
pub struct Outline {
    nodes: Vec<Section>,
    by_slug: FxHashMap<String, NodeId>,
    mode: SlugMode,
}

impl Outline {
    pub const ROOT: NodeId = NodeId(0);

    /// Parse a body whose code regions are already stripped.
    pub fn parse(body: &str, mode: SlugMode) -> Self {
        let mut outline = Self {
            nodes: vec![Section {
                level: 0,
                title: String::new(),
                slug: String::new(),
                content: Vec::new(),
                parent: None,
            }],
            by_slug: FxHashMap::default(),
            mode,
        };
        let mut slugs = SlugSet::default();
        let mut current = Self::ROOT;

        for line in body.lines() {
            let Some((level, title)) = parse_heading(line) else {
                outline.nodes[current.0].content.push(Content::Line(line.to_string()));
                continue;
            };

            // Walk up to the nearest ancestor with a lower level
            let mut parent = current;
            while outline.nodes[parent.0].level >= level {
                parent = outline.nodes[parent.0].parent.unwrap_or(Self::ROOT);
            }

            let slug = slugs.claim(&slugify(title, mode));
            let id = NodeId(outline.nodes.len());
            outline.nodes.push(Section {
                level,
                title: title.to_string(),
                slug: slug.clone(),
                content: Vec::new(),
                parent: Some(parent),
            });
            outline.nodes[parent.0].content.push(Content::Child(id));
            outline.by_slug.insert(slug, id);
            current = id;
        }

        outline
    }

    pub fn node(&self, id: NodeId) -> &Section {
        &self.nodes[id.0]
    }

    pub fn find_slug(&self, slug: &str) -> Option<NodeId> {
        self.by_slug.get(slug).copied()
    }

    /// Headings in document order (root excluded).
    pub fn headings(&self) -> impl Iterator<Item = &Section> {
        self.nodes.iter().skip(1)
    }

    /// Resolve a `a#b#c` selector.
    ///
    /// Each segment is slugified like the headings were. The first segment
    /// matches anywhere in the document, every following one is searched
    /// depth-first below the previous match.
    pub fn get_subtree(&self, selector: &str) -> Option<NodeId> {
        let mut segments = selector
            .split('#')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| self.selector_slug(s));

        let mut found = self.find_slug(&segments.next()?)?;
        for slug in segments {
            found = self.find_descendant(found, &slug)?;
        }
        Some(found)
    }

    /// Re-emit markdown for a section and everything below it.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        if node.level > 0 {
            out.push_str(&"#".repeat(node.level));
            out.push(' ');
            out.push_str(&node.title);
            out.push('\n');
        }
        for item in &node.content {
            match item {
                Content::Line(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Content::Child(child) => self.render_into(*child, out),
            }
        }
    }

    /// Accept both raw titles and already slugified selectors (`intro_1`).
    fn selector_slug(&self, segment: &str) -> String {
        if self.by_slug.contains_key(segment) {
            segment.to_string()
        } else {
            slugify(segment, self.mode)
        }
    }

    fn find_descendant(&self, from: NodeId, slug: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(from).rev().collect();
        while let Some(id) = stack.pop() {
            if self.node(id).slug == slug {
                return Some(id);
            }
            stack.extend(self.children(id).rev());
        }
        None
    }

    fn children(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.node(id).content.iter().filter_map(|item| match item {
            Content::Child(child) => Some(*child),
            Content::Line(_) => None,
        })
    }
}

/// `## Title ##` → `(2, "Title")`. At most six `#`, followed by a space.
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let title = rest.trim();
    let title = title.trim_end_matches('#').trim_end();
    Some((hashes, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
intro text
# Intro
first
## Setup
steps
### Details
fine print
## Usage
use it
# Intro
again
";

    #[test]
    fn test_duplicate_headings_get_suffix() {
        let outline = Outline::parse(DOC, SlugMode::Full);
        let slugs: Vec<_> = outline.headings().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["intro", "setup", "details", "usage", "intro_1"]);
    }

    #[test]
    fn test_slug_set_claims() {
        let mut set = SlugSet::default();
        assert_eq!(set.claim("a"), "a");
        assert_eq!(set.claim("a"), "a_1");
        assert_eq!(set.claim("a"), "a_2");
        assert_eq!(set.claim("a_1"), "a_1_1");
        assert_eq!(set.claim(""), "section");
    }

    #[test]
    fn test_nesting() {
        let outline = Outline::parse(DOC, SlugMode::Full);
        let setup = outline.find_slug("setup").unwrap();
        let intro = outline.find_slug("intro").unwrap();
        assert_eq!(outline.node(setup).parent, Some(intro));
        let usage = outline.find_slug("usage").unwrap();
        assert_eq!(outline.node(usage).parent, Some(intro));
        let second = outline.find_slug("intro_1").unwrap();
        assert_eq!(outline.node(second).parent, Some(Outline::ROOT));
    }

    #[test]
    fn test_get_subtree_selectors() {
        let outline = Outline::parse(DOC, SlugMode::Full);
        let details = outline.find_slug("details").unwrap();
        assert_eq!(outline.get_subtree("Intro#Details"), Some(details));
        assert_eq!(outline.get_subtree("intro#setup#details"), Some(details));
        assert_eq!(outline.get_subtree("Details"), Some(details));
        assert_eq!(outline.get_subtree("usage#details"), None);
        assert_eq!(outline.get_subtree("nothing"), None);
        assert_eq!(outline.get_subtree(""), None);
    }

    #[test]
    fn test_render_subtree() {
        let outline = Outline::parse(DOC, SlugMode::Full);
        let setup = outline.get_subtree("setup").unwrap();
        assert_eq!(
            outline.render(setup),
            "## Setup\nsteps\n### Details\nfine print\n"
        );
    }

    #[test]
    fn test_render_root_round_trips() {
        let outline = Outline::parse(DOC, SlugMode::Full);
        assert_eq!(outline.render(Outline::ROOT), DOC);
    }

    #[test]
    fn test_parse_heading_rules() {
        assert_eq!(parse_heading("# Title"), Some((1, "Title")));
        assert_eq!(parse_heading("### Closed ###"), Some((3, "Closed")));
        assert_eq!(parse_heading("#tag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("plain"), None);
    }
}
