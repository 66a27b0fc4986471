//! Stage B: intermediate markdown → page.

use std::fs;

use super::include;
use super::links::{ParsedLink, find_links, rewrite_links};
use super::template::note_page;
use crate::context::BuildContext;
use crate::core::{BuildError, LinkKind, LinkTarget};
use crate::network::{GraphLink, GraphNode, LinkType};
use crate::outline::BLOCK_ID;
use crate::resolve::Resolution;
use crate::search::SearchDocument;
use crate::utils::path::route::{encode_link, page_url};
use crate::utils::path::slug::slugify;
use crate::vault::meta::split_front_matter;
use crate::vault::{CodeRegions, DocId, Source};
use crate::debug;

/// Run Stage B on one note. Returns the notes its page links to or includes.
///
/// The graph node is registered before anything else so that inclusion
/// and reference links always start from a known id.
pub fn render_page(ctx: &mut BuildContext, id: DocId) -> Result<Vec<DocId>, BuildError> {
    let md_path = ctx.md_path(id);
    let source = fs::read_to_string(&md_path).map_err(BuildError::io(&md_path))?;
    let body = split_front_matter(&source).map_or(source.as_str(), |fm| fm.body);

    let (node_id, title, rel_path, tags) = {
        let doc = ctx.index.get(id);
        (doc.node_id(), doc.title(), doc.rel_path.clone(), doc.meta.tags.clone())
    };
    let page_path = ctx.claim_page_path(id);
    let url = page_url(&ctx.config.url_base(), &page_path);
    ctx.network
        .add_node(GraphNode::new(&node_id, &title, &url, &rel_path, tags.clone()));

    let (expanded, mut follow) = include::expand(ctx, id, body)?;

    let (stripped, code) = CodeRegions::strip(&expanded);
    let links = find_links(&stripped);
    let mut failure = None;
    let rewritten = rewrite_links(&stripped, &links, |link| {
        match rewrite_link(ctx, &node_id, &rel_path, link, &mut follow) {
            Ok(replacement) => replacement,
            Err(err) => {
                failure.get_or_insert(err);
                None
            }
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let anchored = BLOCK_ID.replace_all(&rewritten, "${1}<a id=\"^${2}\" class=\"block-anchor\"></a>");
    let markdown = code.restore(&anchored);
    ctx.index.get_mut(id).code = code;

    let rendered = ctx.renderer.render(&markdown, &ctx.render_context());
    ctx.search.add_document(SearchDocument {
        id: node_id.clone(),
        title: title.clone(),
        url,
        tags,
        body: rendered.text,
    });

    let html = note_page(&ctx.config.site.title, &title, &node_id, &rendered.html);
    let out_path = ctx.html_path(&page_path);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(&out_path, html).map_err(BuildError::io(&out_path))?;
    debug!("page"; "{rel_path} -> {page_path}");

    if !ctx.emitted.contains(&out_path) {
        ctx.emitted.push(out_path);
    }
    Ok(follow)
}

/// Point a link of the intermediate text at its final URL.
fn rewrite_link(
    ctx: &mut BuildContext,
    node_id: &str,
    current: &str,
    link: &ParsedLink,
    follow: &mut Vec<DocId>,
) -> Result<Option<String>, BuildError> {
    if !matches!(link.kind, LinkKind::Markdown | LinkKind::Embed) {
        return Ok(None);
    }

    if link.path.is_empty() {
        if link.fragment.is_empty() {
            return Ok(None);
        }
        let fragment = fragment_id(&link.fragment, ctx);
        return Ok(Some(markdown_link(link, &format!("#{fragment}"))));
    }

    // Stage A wrote exact vault-root paths; anything else is the author's own
    let target = match LinkTarget::parse(&link.path) {
        LinkTarget::External(_) | LinkTarget::Fragment(_) => None,
        LinkTarget::Root(path) => ctx
            .index
            .lookup(path.trim_start_matches('/'))
            .or_else(|| resolve_doc(ctx, &link.path, current)),
        LinkTarget::Relative(path) | LinkTarget::Bare(path) => resolve_doc(ctx, path, current),
    };
    let Some(mut target) = target else {
        return Ok(None);
    };

    let doc = ctx.index.get(target);
    if !doc.is_note() {
        let rel = doc.rel_path.clone();
        if let Source::File(source) = &doc.source {
            let source = source.clone();
            let dest = ctx.config.html_dir().join(&rel);
            ctx.copier.copy(&source, &dest)?;
        }
        let href = page_url(&ctx.config.url_base(), &rel);
        return Ok(Some(markdown_link(link, &href)));
    }

    if !doc.processed_note {
        // Beyond the crawl depth: no page will exist
        debug!("page"; "{current}: {} was not crawled", doc.rel_path);
        match ctx.not_found() {
            Some(not_found) => target = not_found,
            None => return Ok(None),
        }
    }

    let target_id = ctx.index.get(target).node_id();
    ctx.network
        .add_link(GraphLink::new(node_id, &target_id, LinkType::Reference));
    follow.push(target);

    let mut href = ctx.page_url(target);
    if !link.fragment.is_empty() {
        href.push('#');
        href.push_str(&fragment_id(&link.fragment, ctx));
    }
    Ok(Some(markdown_link(link, &href)))
}

fn resolve_doc(ctx: &mut BuildContext, raw: &str, current: &str) -> Option<DocId> {
    match ctx.resolver.resolve(&ctx.index, raw, Some(current)) {
        Resolution::Found(target) => Some(target.doc),
        Resolution::External | Resolution::NotFound => None,
    }
}

/// HTML id for a fragment: block ids are kept, headings are slugified
/// like the renderer does. For `a#b` the last heading is the target.
fn fragment_id(fragment: &str, ctx: &BuildContext) -> String {
    if fragment.starts_with('^') {
        return encode_link(fragment);
    }
    let last = fragment.rsplit('#').next().unwrap_or(fragment);
    encode_link(&slugify(last, ctx.config.build.slug.fragment))
}

fn markdown_link(link: &ParsedLink, href: &str) -> String {
    let bang = if link.kind == LinkKind::Embed { "!" } else { "" };
    let label = link.label.as_deref().unwrap_or_default();
    match &link.title {
        Some(title) => format!("{bang}[{label}](<{href}> {title})"),
        None => format!("{bang}[{label}](<{href}>)"),
    }
}
