//! Per-document state.

use std::path::PathBuf;

use super::{CodeRegions, NoteMeta};
use crate::core::{BuildError, LinkKind};

/// Index of a document inside [`VaultIndex`](super::VaultIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(pub(super) u32);

impl DocId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// A markdown note: crawled, transformed and rendered.
    Note,
    /// Anything else: copied next to the pages that reference it.
    Media,
}

/// Where a document's content comes from.
#[derive(Debug, Clone)]
pub enum Source {
    File(PathBuf),
    /// Injected by the build itself (e.g. the not-found page).
    Virtual(String),
}

/// One reference found in a note during Stage A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// Matched text, exactly as written.
    pub raw: String,
    pub kind: LinkKind,
    pub alias: Option<String>,
    /// Heading selector, e.g. `intro#setup`.
    pub anchor: Option<String>,
    /// Block id without the leading `^`.
    pub block: Option<String>,
    /// `None` when the link was external or did not resolve.
    pub target: Option<DocId>,
}

/// A discovered vault file.
#[derive(Debug, Clone)]
pub struct Document {
    /// Canonical vault-relative path with `/` separators, original case.
    pub rel_path: String,
    pub source: Source,
    pub kind: DocKind,
    /// Filled by Stage A.
    pub meta: NoteMeta,
    /// Code regions of the most recent stage, restored before writing.
    pub code: CodeRegions,
    /// Filled by Stage A.
    pub links: Vec<LinkOccurrence>,
    /// Stage A (note → intermediate) done.
    pub processed_note: bool,
    /// Stage B (intermediate → page) done.
    pub processed_page: bool,
    /// Output path below the html directory, claimed on first use.
    pub page_path: Option<String>,
}

impl Document {
    pub fn new(rel_path: impl Into<String>, source: Source, kind: DocKind) -> Self {
        Self {
            rel_path: rel_path.into(),
            source,
            kind,
            meta: NoteMeta::default(),
            code: CodeRegions::default(),
            links: Vec::new(),
            processed_note: false,
            processed_page: false,
            page_path: None,
        }
    }

    pub fn virtual_note(rel_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(rel_path, Source::Virtual(content.into()), DocKind::Note)
    }

    #[inline]
    pub fn is_note(&self) -> bool {
        self.kind == DocKind::Note
    }

    /// Vault path without the final extension: `folder/My Note`.
    pub fn path_without_extension(&self) -> &str {
        let name_start = self.rel_path.rfind('/').map_or(0, |i| i + 1);
        match self.rel_path[name_start..].rfind('.') {
            Some(dot) if dot > 0 => &self.rel_path[..name_start + dot],
            _ => &self.rel_path,
        }
    }

    /// File name without extension: `My Note`.
    pub fn stem(&self) -> &str {
        let path = self.path_without_extension();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Graph node id: front matter `graph_id`, else the extension-less path.
    pub fn node_id(&self) -> String {
        self.meta
            .graph_id()
            .map_or_else(|| self.path_without_extension().to_string(), str::to_string)
    }

    /// Display title: front matter `title`, else the file stem.
    pub fn title(&self) -> String {
        self.meta
            .title()
            .map_or_else(|| self.stem().to_string(), str::to_string)
    }

    /// Read the original note content.
    pub fn read_source(&self) -> Result<String, BuildError> {
        match &self.source {
            Source::File(path) => std::fs::read_to_string(path).map_err(BuildError::io(path)),
            Source::Virtual(content) => Ok(content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(path: &str) -> Document {
        Document::new(path, Source::Virtual(String::new()), DocKind::Note)
    }

    #[test]
    fn test_path_parts() {
        let doc = note("folder/My Note.md");
        assert_eq!(doc.path_without_extension(), "folder/My Note");
        assert_eq!(doc.stem(), "My Note");

        let doc = note("v1.2/readme");
        assert_eq!(doc.path_without_extension(), "v1.2/readme");
        assert_eq!(doc.stem(), "readme");

        let doc = note(".hidden");
        assert_eq!(doc.path_without_extension(), ".hidden");
    }

    #[test]
    fn test_node_id_and_title_defaults() {
        let doc = note("a/b.md");
        assert_eq!(doc.node_id(), "a/b");
        assert_eq!(doc.title(), "b");
    }

    #[test]
    fn test_node_id_override() {
        let mut doc = note("a/b.md");
        doc.meta = NoteMeta::parse_yaml("graph_id: custom\ntitle: Bee").unwrap();
        assert_eq!(doc.node_id(), "custom");
        assert_eq!(doc.title(), "Bee");
    }

    #[test]
    fn test_read_virtual_source() {
        let doc = Document::virtual_note("x.md", "hello");
        assert_eq!(doc.read_source().unwrap(), "hello");
        assert!(doc.is_note());
    }
}
