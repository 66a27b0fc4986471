//! Stage A: note → intermediate markdown.
//!
//! Every wiki link, embed and markdown link is resolved once and rewritten
//! to a vault-root link (`/folder/Note.md#Anchor`). Note embeds become
//! `<inclusion>` tags, media is copied into the intermediate tree, and
//! unresolved note links point at the not-found page.

use std::fs;

use super::links::{ParsedLink, find_links, rewrite_links};
use crate::context::BuildContext;
use crate::core::{BuildError, LinkKind};
use crate::resolve::Resolution;
use crate::deferred::neutralize;
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::route::{encode_link, is_external_link};
use crate::vault::meta::{NoteMeta, extract, inline_tags, split_front_matter};
use crate::vault::{CodeRegions, DocId, LinkOccurrence, NOT_FOUND_PATH, Source};

/// Run Stage A on one note. Returns the notes it links to.
pub fn transform_note(ctx: &mut BuildContext, id: DocId) -> Result<Vec<DocId>, BuildError> {
    let (rel_path, source) = {
        let doc = ctx.index.get(id);
        (doc.rel_path.clone(), doc.read_source()?)
    };

    // A malformed block is shown in the page; the run goes on
    let (mut meta, body, problem) = match extract(&source, &rel_path) {
        Ok((meta, body)) => (meta, body, None),
        Err(err @ BuildError::FrontMatter { .. }) => {
            let body = split_front_matter(&source).map_or(source.as_str(), |fm| fm.body);
            (NoteMeta::default(), body, Some(err.to_string()))
        }
        Err(err) => return Err(err),
    };
    let (stripped, code) = CodeRegions::strip(body);
    meta.add_tags(inline_tags(&stripped));

    let links = find_links(&stripped);
    let mut occurrences = Vec::with_capacity(links.len());
    let mut discovered = Vec::new();
    let mut failure = None;

    let rewritten = rewrite_links(&stripped, &links, |link| {
        match rewrite_link(ctx, &rel_path, link, &mut discovered) {
            Ok((replacement, target)) => {
                occurrences.push(occurrence(link, &stripped, target));
                replacement
            }
            Err(err) => {
                failure.get_or_insert(err);
                None
            }
        }
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let front = meta.to_front_matter().map_err(|e| BuildError::FrontMatter {
        path: rel_path.clone(),
        message: e.to_string(),
    })?;
    let error = match problem {
        Some(problem) => {
            let html = format!(
                "<p class=\"front-matter-error\">{}</p>\n\n",
                neutralize(&escape(&problem))
            );
            ctx.warn(problem);
            html
        }
        None => String::new(),
    };
    let output = format!("{front}{error}{}", code.restore(&rewritten));

    let md_path = ctx.md_path(id);
    if let Some(parent) = md_path.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    fs::write(&md_path, output).map_err(BuildError::io(&md_path))?;

    let doc = ctx.index.get_mut(id);
    doc.meta = meta;
    doc.code = code;
    doc.links = occurrences;
    Ok(discovered)
}

fn occurrence(link: &ParsedLink, text: &str, target: Option<DocId>) -> LinkOccurrence {
    LinkOccurrence {
        raw: link.raw(text).to_string(),
        kind: link.kind,
        alias: link.label.clone(),
        anchor: link.anchor().map(str::to_string),
        block: link.block().map(str::to_string),
        target,
    }
}

/// New text for one link (`None` keeps it) and the document it reached.
fn rewrite_link(
    ctx: &mut BuildContext,
    current: &str,
    link: &ParsedLink,
    discovered: &mut Vec<DocId>,
) -> Result<(Option<String>, Option<DocId>), BuildError> {
    if link.kind == LinkKind::RawUrl {
        return Ok((None, None));
    }

    if link.path.is_empty() {
        // `[[#Heading]]` points into the same note
        let rewritten = (link.kind == LinkKind::Wiki && !link.fragment.is_empty())
            .then(|| markdown_link(link, &format!("#{}", encode_link(&link.fragment))));
        return Ok((rewritten, None));
    }

    if is_external_link(&link.path) {
        let rewritten = (link.kind == LinkKind::Wiki).then(|| markdown_link(link, &link.path));
        return Ok((rewritten, None));
    }

    match ctx.resolver.resolve(&ctx.index, &link.path, Some(current)) {
        Resolution::Found(target) => {
            let doc = ctx.index.get(target.doc);
            if doc.is_note() {
                discovered.push(target.doc);
                let href = format!("/{}{}", encode_link(&target.canonical), fragment_suffix(link));
                let text = match link.kind {
                    LinkKind::Embed => format!("<inclusion href=\"{}\" />", escape_attr(&href)),
                    _ => markdown_link(link, &href),
                };
                return Ok((Some(text), Some(target.doc)));
            }

            if let Source::File(source) = &doc.source {
                let dest = ctx.config.md_dir().join(&target.canonical);
                let source = source.clone();
                ctx.copier.copy(&source, &dest)?;
            }
            let href = format!("/{}", encode_link(&target.canonical));
            Ok((Some(markdown_link(link, &href)), Some(target.doc)))
        }
        Resolution::External => Ok((None, None)),
        Resolution::NotFound => {
            let default_extension = &ctx.config.vault.default_extension;
            if looks_like_media(&link.path, default_extension) {
                ctx.warn(format!("{current}: missing file `{}`", link.path));
                return Ok((None, None));
            }

            ctx.warn(format!("{current}: unresolved link `{}`", link.path));
            let Some(not_found) = ctx.not_found() else {
                return Ok((None, None));
            };
            discovered.push(not_found);
            let href = format!("/{}", encode_link(NOT_FOUND_PATH));
            Ok((Some(markdown_link(link, &href)), None))
        }
    }
}

/// `[label](href "title")`, or `![alt](href)` for embeds.
fn markdown_link(link: &ParsedLink, href: &str) -> String {
    let bang = if link.kind == LinkKind::Embed { "!" } else { "" };
    let label = match link.kind {
        LinkKind::Markdown | LinkKind::Embed if link.label.is_some() => {
            link.label.clone().unwrap_or_default()
        }
        _ => link.display(),
    };
    match &link.title {
        Some(title) => format!("{bang}[{label}]({href} {title})"),
        None => format!("{bang}[{label}]({href})"),
    }
}

fn fragment_suffix(link: &ParsedLink) -> String {
    if link.fragment.is_empty() {
        String::new()
    } else {
        format!("#{}", encode_link(&link.fragment))
    }
}

/// Whether an unresolved target names a file rather than a note.
///
/// Notes are often named with dots (`Meeting 2024.01.05`), so only a short
/// alphabetic extension other than the note extension counts.
fn looks_like_media(path: &str, note_extension: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && (1..=5).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && ext.chars().any(|c| c.is_ascii_alphabetic())
        && !ext.eq_ignore_ascii_case(note_extension)
}
