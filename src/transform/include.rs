//! Inclusion expansion.
//!
//! Stage A turns note embeds into `<inclusion href="/path.md#selector" />`.
//! Stage B replaces each tag with the selected part of the target's
//! intermediate text: the whole note, a heading subtree, or a `^block`
//! paragraph. Nested inclusions expand up to `build.inclusion_depth`.
//! Problems become visible error text in the page.

use std::fs;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::SlugMode;
use crate::context::BuildContext;
use crate::core::BuildError;
use crate::deferred::neutralize;
use crate::network::{GraphLink, LinkType};
use crate::outline::{Outline, find_block};
use crate::utils::html::{attribute, escape};
use crate::utils::path::route::{decode_link, split_path_fragment};
use crate::vault::meta::split_front_matter;
use crate::vault::{CodeRegions, DocId};

static INCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<inclusion\b([^>]*?)/?>(?:[ \t]*</inclusion>)?").expect("valid inclusion regex")
});

/// Expand every inclusion in the body of `owner`.
///
/// Returns the expanded text and the included documents.
pub fn expand(ctx: &mut BuildContext, owner: DocId, body: &str) -> Result<(String, Vec<DocId>), BuildError> {
    let mut stack = vec![owner];
    let mut included = Vec::new();
    let text = expand_at(ctx, body, 0, &mut stack, &mut included)?;
    Ok((text, included))
}

fn expand_at(
    ctx: &mut BuildContext,
    body: &str,
    depth: usize,
    stack: &mut Vec<DocId>,
    included: &mut Vec<DocId>,
) -> Result<String, BuildError> {
    let (stripped, code) = CodeRegions::strip(body);
    if !INCLUSION.is_match(&stripped) {
        return Ok(body.to_string());
    }

    let mut out = String::with_capacity(stripped.len());
    let mut last = 0;
    for caps in INCLUSION.captures_iter(&stripped) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&stripped[last..whole.start]);
        last = whole.end;

        let href = attribute(&caps[1], "href").unwrap_or_default();
        match include_one(ctx, &href, depth, stack, included)? {
            Ok(content) => {
                out.push_str("\n\n");
                out.push_str(content.trim_end());
                out.push_str("\n\n");
            }
            Err(problem) => {
                let including = stack.last().map_or("", |&id| ctx.index.get(id).rel_path.as_str());
                let message = format!("{including}: {problem}");
                ctx.warn(message);
                out.push_str(&format!(
                    "\n\n<p class=\"inclusion-error\">{}</p>\n\n",
                    neutralize(&escape(&problem))
                ));
            }
        }
    }
    out.push_str(&stripped[last..]);

    Ok(code.restore(&out))
}

/// `Ok(Err(problem))` is a recoverable failure shown in the page.
fn include_one(
    ctx: &mut BuildContext,
    href: &str,
    depth: usize,
    stack: &mut Vec<DocId>,
    included: &mut Vec<DocId>,
) -> Result<Result<String, String>, BuildError> {
    let (path, fragment) = split_path_fragment(href);
    let key = decode_link(path.trim_start_matches('/')).into_owned();
    let fragment = decode_link(fragment).into_owned();

    let Some(target) = ctx.index.lookup(&key) else {
        return Ok(Err(format!("could not find note {key}")));
    };
    if stack.contains(&target) {
        return Ok(Err(format!("circular inclusion of {key}")));
    }
    if depth >= ctx.config.build.inclusion_depth {
        return Ok(Err(format!("inclusion depth limit reached at {key}")));
    }
    if !ctx.index.get(target).processed_note {
        return Ok(Err(format!("note {key} was not processed")));
    }

    let md_path = ctx.md_path(target);
    let source = fs::read_to_string(&md_path).map_err(BuildError::io(&md_path))?;
    let body = split_front_matter(&source).map_or(source.as_str(), |fm| fm.body);

    let selected = if fragment.is_empty() {
        body.to_string()
    } else if let Some(block) = fragment.strip_prefix('^') {
        match select_block(body, block) {
            Some(text) => text,
            None => return Ok(Err(format!("could not find block ^{block} in {key}"))),
        }
    } else {
        match select_section(body, &fragment, ctx.config.build.slug.fragment) {
            Some(text) => text,
            None => return Ok(Err(format!("could not find section #{fragment} in {key}"))),
        }
    };

    let including = stack.last().map(|&id| ctx.index.get(id).node_id());
    if let Some(source_id) = including {
        let target_id = ctx.index.get(target).node_id();
        ctx.network
            .add_link(GraphLink::new(source_id, target_id, LinkType::Inclusion));
    }

    stack.push(target);
    let expanded = expand_at(ctx, &selected, depth + 1, stack, included)?;
    stack.pop();

    if !included.contains(&target) {
        included.push(target);
    }
    Ok(Ok(expanded))
}

/// Heading subtree selected by `a#b`, re-emitted as markdown.
pub fn select_section(body: &str, selector: &str, mode: SlugMode) -> Option<String> {
    let (stripped, code) = CodeRegions::strip(body);
    let outline = Outline::parse(&stripped, mode);
    let node = outline.get_subtree(selector)?;
    Some(code.restore(&outline.render(node)))
}

/// Paragraph carrying `^id`, marker removed.
pub fn select_block(body: &str, id: &str) -> Option<String> {
    let (stripped, code) = CodeRegions::strip(body);
    find_block(&stripped, id).map(|text| code.restore(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\
intro

# Setup

install it ^step

## Linux
```sh
# not a heading
apt install
```

# Usage
run it
";

    #[test]
    fn test_select_section_keeps_code() {
        let text = select_section(BODY, "setup#linux", SlugMode::Full).unwrap();
        assert_eq!(text, "## Linux\n```sh\n# not a heading\napt install\n```\n\n");
        assert!(select_section(BODY, "not a heading", SlugMode::Full).is_none());
    }

    #[test]
    fn test_select_section_by_title() {
        let text = select_section(BODY, "Usage", SlugMode::Full).unwrap();
        assert_eq!(text, "# Usage\nrun it\n");
    }

    #[test]
    fn test_select_block() {
        assert_eq!(select_block(BODY, "step").as_deref(), Some("install it"));
        assert_eq!(select_block(BODY, "nope"), None);
    }

    #[test]
    fn test_inclusion_tag_forms() {
        for tag in [
            "<inclusion href=\"/a.md\" />",
            "<inclusion href=\"/a.md\"/>",
            "<inclusion href=\"/a.md\"></inclusion>",
        ] {
            let caps = INCLUSION.captures(tag).unwrap();
            assert_eq!(&caps[0], tag);
            assert_eq!(attribute(&caps[1], "href").as_deref(), Some("/a.md"));
        }
    }
}
