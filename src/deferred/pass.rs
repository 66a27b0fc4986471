//! The second pass over emitted pages.

use std::fs;

use super::token::{Placeholder, Qualifier, find_node_id, neutralize, substitute};
use crate::config::SiteConfig;
use crate::context::BuildContext;
use crate::core::BuildError;
use crate::logger::ProgressLine;
use crate::network::{GraphNode, NetworkTree};
use crate::search::SearchIndex;
use crate::transform::tag_anchor;
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::route::page_url;
use crate::utils::path::slug::slugify;
use crate::utils::plural_count;
use crate::vault::VaultIndex;
use crate::{debug, log};

/// Read-only view of everything the second pass consults.
pub struct GraphView<'a> {
    pub config: &'a SiteConfig,
    pub index: &'a VaultIndex,
    pub network: &'a NetworkTree,
    pub search: &'a dyn SearchIndex,
}

impl<'a> GraphView<'a> {
    pub fn from_context(ctx: &'a BuildContext) -> Self {
        Self {
            config: &ctx.config,
            index: &ctx.index,
            network: &ctx.network,
            search: ctx.search.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Every placeholder substituted. The text may equal the input.
    Resolved(String),
    /// No node id token: the page is left as is.
    MissingToken,
    /// The node id names no graph node.
    UnknownNode(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeferredStats {
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// Substitute the placeholders of one page.
///
/// The node id token is kept, every other token is replaced by content or
/// by an empty marker, so running this on its own output changes nothing.
pub fn resolve_page(text: &str, view: &GraphView<'_>) -> PageOutcome {
    let Some(node_id) = find_node_id(text) else {
        return PageOutcome::MissingToken;
    };
    // Ids written by hand may differ from the node id in case or spacing
    let node = view
        .network
        .node(&node_id)
        .or_else(|| view.network.node_by_slug(&slugify(&node_id, view.config.build.slug.path)));
    let Some(node) = node else {
        return PageOutcome::UnknownNode(node_id);
    };

    let resolved = substitute(text, |placeholder| match placeholder {
        Placeholder::NodeId(_) => None,
        Placeholder::Backlinks => Some(backlinks(node, view)),
        Placeholder::Breadcrumbs => Some(breadcrumbs(node, view)),
        Placeholder::TagsFooter => Some(tags_footer(node, view)),
        Placeholder::SearchQuery { qualifier, query } => {
            Some(search_results(*qualifier, query, view))
        }
    });
    PageOutcome::Resolved(resolved)
}

/// Run the second pass over every page emitted by Stage B.
pub fn run(ctx: &mut BuildContext, progress: Option<&ProgressLine>) -> Result<DeferredStats, BuildError> {
    let mut stats = DeferredStats::default();
    let mut problems = Vec::new();

    {
        let view = GraphView::from_context(ctx);
        for path in &ctx.emitted {
            let text = fs::read_to_string(path).map_err(BuildError::io(path))?;
            match resolve_page(&text, &view) {
                PageOutcome::Resolved(resolved) if resolved == text => stats.unchanged += 1,
                PageOutcome::Resolved(resolved) => {
                    fs::write(path, resolved).map_err(BuildError::io(path))?;
                    stats.rewritten += 1;
                }
                PageOutcome::MissingToken => {
                    stats.skipped += 1;
                    problems.push(format!("{}: no node id, left unresolved", path.display()));
                }
                PageOutcome::UnknownNode(id) => {
                    stats.skipped += 1;
                    problems.push(format!("{}: unknown node `{id}`, left unresolved", path.display()));
                }
            }
            if let Some(progress) = progress {
                progress.inc("deferred");
            }
        }
    }

    for problem in problems {
        ctx.warn(problem);
    }
    debug!("deferred"; "{} rewritten, {} unchanged", stats.rewritten, stats.unchanged);
    if stats.skipped > 0 {
        log!("deferred"; "skipped {}", plural_count(stats.skipped, "page"));
    }
    Ok(stats)
}

// ============================================================================
// Blocks
// ============================================================================

/// Escaped user text that can never form a token.
fn text(s: &str) -> String {
    neutralize(&escape(s)).into_owned()
}

fn attr(s: &str) -> String {
    neutralize(&escape_attr(s)).into_owned()
}

fn empty(kind: &str) -> String {
    format!("<!-- empty:{kind} -->")
}

fn link(url: &str, label: &str) -> String {
    format!("<a href=\"{}\">{}</a>", attr(url), text(label))
}

fn backlinks(node: &GraphNode, view: &GraphView<'_>) -> String {
    let sources = view.network.backlinks(&node.id);
    if sources.is_empty() {
        return empty("backlinks");
    }

    let mut html = String::from("<ul class=\"backlinks\">\n");
    for source in sources {
        html.push_str(&format!("<li>{}</li>\n", link(&source.url, &source.name)));
    }
    html.push_str("</ul>");
    html
}

/// Home, then one crumb per ancestor folder of the source note.
///
/// A folder with a rendered folder note links to it; other folders are
/// plain text. The entry page has no trail.
fn breadcrumbs(node: &GraphNode, view: &GraphView<'_>) -> String {
    let index = view.index;
    let own = index.lookup(&node.path);
    let entry = index.lookup(&view.config.vault.entrypoint);
    if own.is_some() && own == entry {
        return empty("breadcrumbs");
    }

    let base = view.config.url_base();
    let mut crumbs = vec![link(&page_url(&base, "index.html"), &view.config.site.title)];

    let folders: Vec<&str> = node.path.split('/').collect();
    let extension = &view.config.vault.default_extension;
    for depth in 1..folders.len() {
        let folder = folders[..depth].join("/");
        let name = folders[depth - 1];
        let target = index
            .folder_note(&folder, extension)
            .filter(|&id| Some(id) != own)
            .map(|id| index.get(id))
            .filter(|doc| doc.processed_page);

        match target.and_then(|doc| doc.page_path.as_deref().map(|p| (doc, p))) {
            Some((doc, page_path)) => crumbs.push(link(&page_url(&base, page_path), &doc.title())),
            None => crumbs.push(format!("<span>{}</span>", text(name))),
        }
    }

    let mut html = String::from("<ol class=\"breadcrumbs\">");
    for crumb in crumbs {
        html.push_str(&format!("<li>{crumb}</li>"));
    }
    html.push_str("</ol>");
    html
}

fn tags_footer(node: &GraphNode, view: &GraphView<'_>) -> String {
    if node.tags.is_empty() {
        return empty("tags_footer");
    }

    let base = view.config.url_base();
    let mut html = String::from("<ul class=\"tags\">");
    for tag in &node.tags {
        let label = format!("#{tag}");
        if view.config.build.tag_index {
            let url = format!("{}#{}", page_url(&base, "tags/"), tag_anchor(tag));
            html.push_str(&format!("<li class=\"tag\">{}</li>", link(&url, &label)));
        } else {
            html.push_str(&format!("<li class=\"tag\">{}</li>", text(&label)));
        }
    }
    html.push_str("</ul>");
    html
}

fn search_results(qualifier: Qualifier, query: &str, view: &GraphView<'_>) -> String {
    let hits = match qualifier {
        Qualifier::Tag => view.search.search(&format!("tag:{query}")),
        Qualifier::Content => view.search.search(query),
    };
    if hits.is_empty() {
        return empty("search_query");
    }

    let mut html = String::from("<ul class=\"search-results\">\n");
    for hit in hits {
        html.push_str(&format!("<li>{}</li>\n", link(&hit.url, &hit.title)));
    }
    html.push_str("</ul>");
    html
}
