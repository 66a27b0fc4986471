//! Page template.
//!
//! Pages are plain HTML documents. The node id token sits in a comment at
//! the top; the other graph-dependent blocks are tokens in their final
//! position, replaced by the deferred pass.

use std::collections::BTreeMap;

use crate::deferred::{Placeholder, neutralize};
use crate::network::NetworkTree;
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::slug::{SlugMode, slugify};

fn text(s: &str) -> String {
    neutralize(&escape(s)).into_owned()
}

/// Anchor of a tag on the tag index page.
pub fn tag_anchor(tag: &str) -> String {
    slugify(tag, SlugMode::Full)
}

fn layout(site_title: &str, title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n{head}<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | {}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        text(title),
        text(site_title),
    )
}

/// A note page with all deferred placeholders in place.
pub fn note_page(site_title: &str, title: &str, node_id: &str, content: &str) -> String {
    let head = format!("<!-- {} -->\n", Placeholder::NodeId(node_id.to_string()).encode());
    let body = format!(
        "<nav class=\"breadcrumbs\">{}</nav>\n\
         <main>\n<h1 class=\"title\">{}</h1>\n{content}</main>\n\
         <aside class=\"backlinks\">\n<h2>Links to this page</h2>\n{}\n</aside>\n\
         <footer>{}</footer>\n",
        Placeholder::Breadcrumbs.encode(),
        text(title),
        Placeholder::Backlinks.encode(),
        Placeholder::TagsFooter.encode(),
    );
    layout(site_title, title, &head, &body)
}

/// Every tag with the pages carrying it, sorted by tag.
pub fn tag_index_page(site_title: &str, network: &NetworkTree) -> String {
    let mut tags: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
    for node in network.nodes() {
        for tag in &node.tags {
            tags.entry(tag.as_str())
                .or_default()
                .push((node.url.as_str(), node.name.as_str()));
        }
    }

    let mut body = String::from("<main>\n<h1 class=\"title\">Tags</h1>\n");
    for (tag, pages) in tags {
        body.push_str(&format!(
            "<section id=\"{}\">\n<h2>#{}</h2>\n<ul>\n",
            escape_attr(&tag_anchor(tag)),
            text(tag)
        ));
        for (url, name) in pages {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_attr(url),
                text(name)
            ));
        }
        body.push_str("</ul>\n</section>\n");
    }
    body.push_str("</main>\n");

    layout(site_title, "Tags", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::{find_node_id, tokens};
    use crate::network::GraphNode;

    #[test]
    fn test_note_page_carries_every_placeholder() {
        let html = note_page("Vault", "A <b>", "a/b", "<p>x</p>\n");
        assert_eq!(find_node_id(&html).as_deref(), Some("a/b"));
        assert_eq!(tokens(&html).len(), 4);
        assert!(html.contains("<title>A &lt;b&gt; | Vault</title>"));
        assert!(html.contains("<p>x</p>"));
    }

    #[test]
    fn test_user_title_cannot_inject_tokens() {
        let html = note_page("Vault", "{_core_backlinks_pattern_}", "n", "");
        assert_eq!(tokens(&html).len(), 4);
    }

    #[test]
    fn test_node_id_stays_inside_its_comment() {
        let html = note_page("Vault", "T", "odd --> id", "");
        let head = html.split("<html>").next().unwrap_or_default();
        assert_eq!(head.matches("-->").count(), 1, "{head}");
        assert!(head.trim_end().ends_with("} -->"));
        assert_eq!(find_node_id(&html).as_deref(), Some("odd --> id"));
    }

    #[test]
    fn test_tag_index_groups_pages() {
        let mut network = NetworkTree::new();
        network.add_node(GraphNode::new("a", "A", "/a.html", "a.md", vec!["x".into(), "Project/One".into()]));
        network.add_node(GraphNode::new("b", "B", "/b.html", "b.md", vec!["x".into()]));

        let html = tag_index_page("Vault", &network);
        assert!(html.contains("<section id=\"project-one\">"));
        let x = html.find("<section id=\"x\">").unwrap();
        let section = &html[x..];
        assert!(section.contains("<a href=\"/a.html\">A</a>"));
        assert!(section.contains("<a href=\"/b.html\">B</a>"));
        assert!(find_node_id(&html).is_none());
    }
}
