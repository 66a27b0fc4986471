//! Build context.
//!
//! One value owns all mutable state of a run: the namespace index, the
//! resolver memo, the graph, and the collaborators. Every stage takes it
//! by `&mut`, which keeps the single-writer rule visible in signatures.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

use crate::asset::{AssetCopier, FsCopier};
use crate::config::SiteConfig;
use crate::log;
use crate::network::NetworkTree;
use crate::render::{MarkdownRenderer, MarkupRenderer, RenderContext};
use crate::resolve::Resolver;
use crate::search::{MemoryIndex, SearchIndex};
use crate::utils::path::route::page_url;
use crate::utils::path::slug::slugify_path;
use crate::vault::{DocId, Document, NOT_FOUND_PATH, VaultIndex};

/// Page of the entrypoint.
pub const ENTRY_PAGE: &str = "index.html";
/// Tag index page.
pub const TAGS_PAGE: &str = "tags/index.html";
/// Graph export.
pub const GRAPH_FILE: &str = "graph.json";

const NOT_FOUND_CONTENT: &str = "\
---
title: Not created yet
---

This note has not been written yet. Links point here when their target
could not be found in the vault.
";

pub struct BuildContext {
    pub config: SiteConfig,
    pub index: VaultIndex,
    pub resolver: Resolver,
    pub network: NetworkTree,
    pub renderer: Box<dyn MarkupRenderer>,
    pub search: Box<dyn SearchIndex>,
    pub copier: Box<dyn AssetCopier>,
    /// Recoverable problems, in the order they were found.
    pub warnings: Vec<String>,
    /// Pages written by Stage B.
    pub emitted: Vec<PathBuf>,
    entry: Option<DocId>,
    not_found: Option<DocId>,
    claimed: FxHashSet<String>,
}

impl BuildContext {
    /// Context with the default collaborators.
    pub fn new(config: SiteConfig, index: VaultIndex) -> Self {
        Self::with_collaborators(
            config,
            index,
            Box::new(MarkdownRenderer::with_extensions()),
            Box::new(MemoryIndex::new()),
            Box::new(FsCopier::new()),
        )
    }

    pub fn with_collaborators(
        config: SiteConfig,
        index: VaultIndex,
        renderer: Box<dyn MarkupRenderer>,
        search: Box<dyn SearchIndex>,
        copier: Box<dyn AssetCopier>,
    ) -> Self {
        let resolver = Resolver::new(&config.site_prefix, &config.vault.default_extension);
        let claimed = [TAGS_PAGE, GRAPH_FILE].into_iter().map(String::from).collect();
        Self {
            config,
            index,
            resolver,
            network: NetworkTree::new(),
            renderer,
            search,
            copier,
            warnings: Vec::new(),
            emitted: Vec::new(),
            entry: None,
            not_found: None,
            claimed,
        }
    }

    /// Log a recoverable problem and keep it for the summary.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log!("warn"; "{message}");
        self.warnings.push(message);
    }

    /// Mark the entrypoint; it always gets [`ENTRY_PAGE`].
    pub fn set_entry(&mut self, id: DocId) {
        self.entry = Some(id);
        self.claimed.insert(ENTRY_PAGE.to_string());
        self.index.get_mut(id).page_path = Some(ENTRY_PAGE.to_string());
    }

    pub const fn entry(&self) -> Option<DocId> {
        self.entry
    }

    /// Register the virtual not-found note.
    ///
    /// Registration bumps the index generation, which drops the resolver
    /// memo on its next use. A vault file with the same path wins.
    pub fn inject_not_found(&mut self) -> DocId {
        let id = self
            .index
            .register(Document::virtual_note(NOT_FOUND_PATH, NOT_FOUND_CONTENT));
        self.not_found = Some(id);
        id
    }

    pub const fn not_found(&self) -> Option<DocId> {
        self.not_found
    }

    /// Output path of a note below the html directory, claimed on first use.
    ///
    /// Paths come from the slugified vault path. A path already taken by
    /// another document gets `_1`, `_2`, ... before the extension.
    pub fn claim_page_path(&mut self, id: DocId) -> String {
        if let Some(path) = &self.index.get(id).page_path {
            return path.clone();
        }

        let doc = self.index.get(id);
        let mut stem = slugify_path(doc.path_without_extension(), self.config.build.slug.path);
        if stem.is_empty() {
            stem = "page".to_string();
        }

        let mut path = format!("{stem}.html");
        let mut n = 1;
        while !self.claimed.insert(path.clone()) {
            path = format!("{stem}_{n}.html");
            n += 1;
        }

        self.index.get_mut(id).page_path = Some(path.clone());
        path
    }

    /// Root-relative URL of a note's page.
    pub fn page_url(&mut self, id: DocId) -> String {
        let path = self.claim_page_path(id);
        page_url(&self.config.url_base(), &path)
    }

    /// Intermediate file of a document.
    pub fn md_path(&self, id: DocId) -> PathBuf {
        self.config.md_dir().join(&self.index.get(id).rel_path)
    }

    /// Page file below the html directory.
    pub fn html_path(&self, page_path: &str) -> PathBuf {
        self.config.html_dir().join(page_path)
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            fragment_slug: self.config.build.slug.fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::vault::{DocKind, Source};

    fn context(paths: &[&str]) -> (BuildContext, Vec<DocId>) {
        let mut index = VaultIndex::new(false);
        let ids = paths
            .iter()
            .map(|p| index.register(Document::new(*p, Source::Virtual(String::new()), DocKind::Note)))
            .collect();
        (BuildContext::new(test_parse_config(""), index), ids)
    }

    #[test]
    fn test_page_paths_are_slugified_and_stable() {
        let (mut ctx, ids) = context(&["Folder/My Note.md"]);
        assert_eq!(ctx.claim_page_path(ids[0]), "folder/my-note.html");
        assert_eq!(ctx.claim_page_path(ids[0]), "folder/my-note.html");
        assert_eq!(ctx.page_url(ids[0]), "/folder/my-note.html");
    }

    #[test]
    fn test_colliding_page_paths_get_suffix() {
        let (mut ctx, ids) = context(&["My Note.md", "my-note.md", "my_note!.md"]);
        assert_eq!(ctx.claim_page_path(ids[0]), "my-note.html");
        assert_eq!(ctx.claim_page_path(ids[1]), "my-note_1.html");
        assert_eq!(ctx.claim_page_path(ids[2]), "my_note.html");
    }

    #[test]
    fn test_entry_owns_index_page() {
        let (mut ctx, ids) = context(&["home.md", "index.md"]);
        ctx.set_entry(ids[0]);
        assert_eq!(ctx.claim_page_path(ids[0]), ENTRY_PAGE);
        assert_eq!(ctx.claim_page_path(ids[1]), "index_1.html");
    }

    #[test]
    fn test_reserved_pages_are_never_claimed() {
        let (mut ctx, ids) = context(&["tags/index.md"]);
        assert_eq!(ctx.claim_page_path(ids[0]), "tags/index_1.html");
    }

    #[test]
    fn test_not_found_injection_bumps_generation() {
        let (mut ctx, _) = context(&["a.md"]);
        let before = ctx.index.generation();
        let id = ctx.inject_not_found();
        assert!(ctx.index.generation() > before);
        assert_eq!(ctx.index.get(id).rel_path, NOT_FOUND_PATH);
        assert_eq!(ctx.not_found(), Some(id));
    }
}
