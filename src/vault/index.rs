//! Namespace index: canonical vault path → document.
//!
//! Documents live in an arena owned by the index and are addressed by
//! [`DocId`]. Registration order is preserved because the resolver's
//! tie-break falls back to it. Every mutation bumps [`VaultIndex::generation`]
//! so memoized resolutions can tell they are stale.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use super::{DocId, Document};

#[derive(Debug, Default)]
pub struct VaultIndex {
    docs: Vec<Document>,
    /// Lookup key per document, parallel to `docs`.
    keys: Vec<String>,
    by_key: FxHashMap<String, DocId>,
    case_insensitive: bool,
    generation: u64,
}

impl VaultIndex {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            case_insensitive,
            ..Self::default()
        }
    }

    /// Apply the case-folding policy to a key.
    #[inline]
    pub fn fold<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if self.case_insensitive {
            Cow::Owned(key.to_lowercase())
        } else {
            Cow::Borrowed(key)
        }
    }

    pub const fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Register a document under its `rel_path`.
    ///
    /// Registering a key that is already present keeps the first document
    /// and returns its id.
    pub fn register(&mut self, doc: Document) -> DocId {
        let key = self.fold(&doc.rel_path).into_owned();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }

        let id = DocId(self.docs.len() as u32);
        self.by_key.insert(key.clone(), id);
        self.keys.push(key);
        self.docs.push(doc);
        self.generation += 1;
        id
    }

    /// Exact lookup; `path` is folded with the index's policy.
    pub fn lookup(&self, path: &str) -> Option<DocId> {
        self.by_key.get(self.fold(path).as_ref()).copied()
    }

    /// Exact lookup of an already folded key.
    pub(crate) fn lookup_folded(&self, key: &str) -> Option<DocId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, id: DocId) -> &Document {
        &self.docs[id.index()]
    }

    pub fn get_mut(&mut self, id: DocId) -> &mut Document {
        &mut self.docs[id.index()]
    }

    /// Folded keys with their ids, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = (DocId, &str)> {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, key)| (DocId(i as u32), key.as_str()))
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = DocId> + use<> {
        (0..self.docs.len() as u32).map(DocId)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Changes whenever the namespace changes.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of notes (excluding media).
    pub fn note_count(&self) -> usize {
        self.docs.iter().filter(|d| d.is_note()).count()
    }

    /// Find the note describing a folder: `folder/index.md`,
    /// `folder/<name>.md`, or `folder.md` next to it.
    pub fn folder_note(&self, folder: &str, extension: &str) -> Option<DocId> {
        let name = folder.rsplit('/').next().unwrap_or(folder);
        [
            format!("{folder}/index.{extension}"),
            format!("{folder}/{name}.{extension}"),
            format!("{folder}.{extension}"),
        ]
        .iter()
        .find_map(|candidate| self.lookup(candidate))
        .filter(|&id| self.get(id).is_note())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{DocKind, Source};

    fn doc(path: &str) -> Document {
        Document::new(path, Source::Virtual(String::new()), DocKind::Note)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut index = VaultIndex::new(false);
        let a = index.register(doc("a/b.md"));
        let c = index.register(doc("c.md"));

        assert_eq!(index.lookup("a/b.md"), Some(a));
        assert_eq!(index.lookup("c.md"), Some(c));
        assert_eq!(index.lookup("A/B.md"), None);
        assert_eq!(index.get(a).rel_path, "a/b.md");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_case_insensitive_folding() {
        let mut index = VaultIndex::new(true);
        let id = index.register(doc("Notes/Hello.md"));
        assert_eq!(index.lookup("notes/hello.md"), Some(id));
        assert_eq!(index.lookup("NOTES/HELLO.MD"), Some(id));
        // Canonical path keeps its case
        assert_eq!(index.get(id).rel_path, "Notes/Hello.md");
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut index = VaultIndex::new(true);
        let first = index.register(doc("Note.md"));
        let generation = index.generation();
        let second = index.register(doc("note.md"));
        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
        assert_eq!(index.generation(), generation);
    }

    #[test]
    fn test_generation_bumps_on_register() {
        let mut index = VaultIndex::new(false);
        let before = index.generation();
        index.register(doc("x.md"));
        assert!(index.generation() > before);
    }

    #[test]
    fn test_keys_in_registration_order() {
        let mut index = VaultIndex::new(false);
        index.register(doc("z.md"));
        index.register(doc("a.md"));
        let keys: Vec<_> = index.keys().map(|(_, k)| k).collect();
        assert_eq!(keys, vec!["z.md", "a.md"]);
    }

    #[test]
    fn test_folder_note() {
        let mut index = VaultIndex::new(false);
        let projects = index.register(doc("projects.md"));
        let area = index.register(doc("areas/areas.md"));
        let home = index.register(doc("home/index.md"));

        assert_eq!(index.folder_note("projects", "md"), Some(projects));
        assert_eq!(index.folder_note("areas", "md"), Some(area));
        assert_eq!(index.folder_note("home", "md"), Some(home));
        assert_eq!(index.folder_note("missing", "md"), None);
    }
}
