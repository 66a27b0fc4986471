//! Graph crawl.
//!
//! Drives one stage over every document reachable from the roots. Each
//! document moves `undiscovered → discovered → processed` once per stage:
//! its stage flag is set when it is pushed, before it runs, so cycles and
//! self links are visited exactly once. The walk uses an explicit stack
//! in place of recursion and keeps the depth-first order of a recursive
//! walk (targets are visited in link order).

use crate::context::BuildContext;
use crate::core::BuildError;
use crate::logger::ProgressLine;
use crate::vault::{DocId, Document};
use crate::{debug, log};

/// One transform stage driven by the crawl.
pub trait Stage {
    /// Progress counter and log name.
    const NAME: &'static str;

    fn is_processed(doc: &Document) -> bool;

    fn mark(doc: &mut Document);

    /// Documents the stage runs on. Others are never discovered.
    fn accepts(doc: &Document) -> bool {
        doc.is_note()
    }

    /// Process one document, returning the documents it links to.
    fn run(ctx: &mut BuildContext, id: DocId) -> Result<Vec<DocId>, BuildError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub processed: usize,
    /// Links not followed because of `vault.max_depth`.
    pub cut: usize,
}

impl std::ops::AddAssign for CrawlStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.cut += other.cut;
    }
}

/// Walk stage `S` from `roots`.
///
/// Roots sit at depth 0. A document at `vault.max_depth` is processed but
/// its links are not followed.
pub fn crawl<S: Stage>(
    ctx: &mut BuildContext,
    roots: &[DocId],
    progress: Option<&ProgressLine>,
) -> Result<CrawlStats, BuildError> {
    let max_depth = ctx.config.vault.max_depth;
    let mut stats = CrawlStats::default();
    let mut stack: Vec<(DocId, usize)> = Vec::new();

    for &root in roots.iter().rev() {
        if try_discover::<S>(ctx, root) {
            stack.push((root, 0));
        }
    }

    while let Some((id, depth)) = stack.pop() {
        debug!("crawl"; "{} {} (depth {depth})", S::NAME, ctx.index.get(id).rel_path);
        let targets = S::run(ctx, id)?;
        stats.processed += 1;
        if let Some(progress) = progress {
            progress.inc(S::NAME);
        }

        if max_depth.is_some_and(|max| depth >= max) {
            stats.cut += targets
                .iter()
                .filter(|&&t| !S::is_processed(ctx.index.get(t)))
                .count();
            continue;
        }

        // Reverse so the first link is popped first
        for &target in targets.iter().rev() {
            if try_discover::<S>(ctx, target) {
                stack.push((target, depth + 1));
            }
        }
    }

    Ok(stats)
}

/// Run stage `S` on every accepted document it has not reached yet.
pub fn sweep<S: Stage>(
    ctx: &mut BuildContext,
    progress: Option<&ProgressLine>,
) -> Result<CrawlStats, BuildError> {
    let mut stats = CrawlStats::default();
    let pending: Vec<DocId> = ctx
        .index
        .ids()
        .filter(|&id| {
            let doc = ctx.index.get(id);
            S::accepts(doc) && !S::is_processed(doc)
        })
        .collect();

    for id in pending {
        // An earlier sweep root may have reached it
        if S::is_processed(ctx.index.get(id)) {
            continue;
        }
        stats += crawl::<S>(ctx, &[id], progress)?;
    }

    if stats.processed > 0 {
        log!("crawl"; "{}: swept {} unreachable", S::NAME, stats.processed);
    }
    Ok(stats)
}

/// Mark `id` processed for `S` if it qualifies. True when newly marked.
fn try_discover<S: Stage>(ctx: &mut BuildContext, id: DocId) -> bool {
    let doc = ctx.index.get_mut(id);
    if !S::accepts(doc) || S::is_processed(doc) {
        return false;
    }
    S::mark(doc);
    true
}
