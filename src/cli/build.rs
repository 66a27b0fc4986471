//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Init** - entrypoint check, output cleaning, vault scan
//! - **Stage A** - crawl notes into `output/md`
//! - **Stage B** - crawl intermediate notes into `output/html` pages
//! - **Graph** - crosslinks and slug lookup on the network tree
//! - **Deferred** - second pass over every emitted page
//! - **Finalize** - graph export, tag index, summary

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::context::{BuildContext, GRAPH_FILE, TAGS_PAGE};
use crate::core::BuildError;
use crate::crawl::{CrawlStats, crawl, sweep};
use crate::deferred::{self, DeferredStats};
use crate::logger::ProgressLine;
use crate::transform::{NoteStage, PageStage, tag_index_page};
use crate::utils::path::to_vault_key;
use crate::utils::plural_count;
use crate::vault::{DocId, scan_vault};
use crate::{debug, log};

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub notes: CrawlStats,
    pub pages: CrawlStats,
    pub deferred: DeferredStats,
    pub warnings: Vec<String>,
    /// Notes no crawl reached.
    pub unreached: usize,
}

/// Build the site from the vault.
///
/// Pipeline: init -> stage A -> stage B -> graph -> deferred -> finalize
pub fn build_vault(config: &SiteConfig, quiet: bool) -> Result<BuildReport> {
    let mut ctx = init_build(config)?;
    let roots = collect_roots(&mut ctx)?;

    let progress = create_progress(&ctx, quiet);
    let notes = run_note_stage(&mut ctx, &roots, progress.as_ref())?;
    let pages = run_page_stage(&mut ctx, &roots, progress.as_ref())?;
    debug!("resolve"; "{} answered from memo", plural_count(ctx.resolver.memo_hits(), "link"));

    ctx.network.compile_lookup(config.build.slug.path);
    ctx.network.compute_crosslinks();

    let deferred = deferred::run(&mut ctx, progress.as_ref())?;
    if let Some(p) = progress {
        p.finish();
    }

    write_site_files(&ctx)?;
    let unreached = report_unreached(&mut ctx);

    let report = BuildReport {
        notes,
        pages,
        deferred,
        warnings: ctx.warnings,
        unreached,
    };
    if !quiet {
        log_summary(&report);
    }
    Ok(report)
}

// =============================================================================
// Init
// =============================================================================

/// Check the entrypoint, prepare the output and index the vault.
///
/// Nothing is written before the entrypoint is known to exist.
fn init_build(config: &SiteConfig) -> Result<BuildContext> {
    let vault = config.vault_dir();
    if !vault.join(&config.vault.entrypoint).is_file() {
        return Err(BuildError::EntrypointMissing(
            config.vault.entrypoint.clone(),
            vault.to_path_buf(),
        )
        .into());
    }

    let output = &config.build.output;
    if config.build.clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to clean {}", output.display()))?;
        debug!("build"; "cleaned {}", output.display());
    }
    for dir in [config.md_dir(), config.html_dir()] {
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let index = scan_vault(config)?;
    let mut ctx = BuildContext::new(config.clone(), index);
    ctx.inject_not_found();
    Ok(ctx)
}

/// Entrypoint, extra entrypoints and the not-found page, in that order.
fn collect_roots(ctx: &mut BuildContext) -> Result<Vec<DocId>> {
    let entrypoint = ctx.config.vault.entrypoint.clone();
    let entry = lookup_entry(ctx, &entrypoint).ok_or_else(|| {
        BuildError::EntrypointMissing(entrypoint.clone(), ctx.config.vault_dir().to_path_buf())
    })?;
    ctx.set_entry(entry);

    let mut roots = vec![entry];
    for extra in ctx.config.vault.extra_entrypoints.clone() {
        match lookup_entry(ctx, &extra) {
            Some(id) => roots.push(id),
            None => ctx.warn(format!("extra entrypoint `{extra}` is not a note in the vault")),
        }
    }
    roots.extend(ctx.not_found());
    Ok(roots)
}

fn lookup_entry(ctx: &BuildContext, path: &str) -> Option<DocId> {
    let key = to_vault_key(Path::new(path))?;
    ctx.index
        .lookup(&key)
        .filter(|&id| ctx.index.get(id).is_note())
}

/// Create progress display if not quiet
fn create_progress(ctx: &BuildContext, quiet: bool) -> Option<ProgressLine> {
    if quiet {
        return None;
    }
    let notes = ctx.index.note_count();
    Some(ProgressLine::new(&[
        ("notes", notes),
        ("pages", notes),
        ("deferred", notes),
    ]))
}

// =============================================================================
// Stages
// =============================================================================

fn run_note_stage(
    ctx: &mut BuildContext,
    roots: &[DocId],
    progress: Option<&ProgressLine>,
) -> Result<CrawlStats> {
    let mut stats = crawl::<NoteStage>(ctx, roots, progress)?;
    if ctx.config.vault.process_all {
        stats += sweep::<NoteStage>(ctx, progress)?;
    }
    Ok(stats)
}

/// Stage B from the same roots, then a sweep so every intermediate note
/// gets a page: Stage A links may point at notes Stage B reaches only
/// through a path longer than `vault.max_depth`.
fn run_page_stage(
    ctx: &mut BuildContext,
    roots: &[DocId],
    progress: Option<&ProgressLine>,
) -> Result<CrawlStats> {
    let mut stats = crawl::<PageStage>(ctx, roots, progress)?;
    stats += sweep::<PageStage>(ctx, progress)?;
    Ok(stats)
}

// =============================================================================
// Finalize
// =============================================================================

/// `graph.json` and the tag index, as configured.
fn write_site_files(ctx: &BuildContext) -> Result<()> {
    let html_dir = ctx.config.html_dir();

    if ctx.config.build.graph {
        let json = serde_json::to_string_pretty(&ctx.network.export())
            .map_err(|e| BuildError::Serialize("graph", e))?;
        let path = html_dir.join(GRAPH_FILE);
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }

    if ctx.config.build.tag_index {
        let html = tag_index_page(&ctx.config.site.title, &ctx.network);
        let path = html_dir.join(TAGS_PAGE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Warn about notes no crawl reached. Returns their count.
fn report_unreached(ctx: &mut BuildContext) -> usize {
    let unreached: Vec<String> = ctx
        .index
        .documents()
        .filter(|doc| doc.is_note() && !doc.processed_page)
        .map(|doc| doc.rel_path.clone())
        .collect();

    for path in &unreached {
        debug!("build"; "not reached: {path}");
    }
    if !unreached.is_empty() {
        ctx.warn(format!(
            "{} not reachable from any entrypoint (use --process-all)",
            plural_count(unreached.len(), "note")
        ));
    }
    unreached.len()
}

fn log_summary(report: &BuildReport) {
    log!(
        "build";
        "{}, {}, {}",
        plural_count(report.notes.processed, "note"),
        plural_count(report.pages.processed, "page"),
        plural_count(report.warnings.len(), "warning")
    );
    if report.notes.cut > 0 {
        log!("crawl"; "{} not followed past max depth", plural_count(report.notes.cut, "link"));
    }
}

#[cfg(test)]
mod tests;
