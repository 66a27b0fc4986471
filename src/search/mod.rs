//! Search index collaborator.
//!
//! Stage B feeds every rendered page into a [`SearchIndex`]; the deferred
//! pass queries it for embedded search blocks. [`MemoryIndex`] ranks with
//! BM25 over title, tags and body text.

use rustc_hash::FxHashMap;

/// Fields indexed for one page.
#[derive(Debug, Clone, Default)]
pub struct SearchDocument {
    /// Graph node id; re-adding the same id replaces the entry.
    pub id: String,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    /// Plain text of the rendered page.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: f64,
}

pub trait SearchIndex {
    fn add_document(&mut self, doc: SearchDocument);

    /// Ranked results for a query.
    ///
    /// `tag:<name>` selects pages carrying the tag (or a nested tag below
    /// it). Anything else is a full-text query matching pages that contain
    /// every term.
    fn search(&self, query: &str) -> Vec<SearchHit>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// In-memory BM25 index
// ============================================================================

const K1: f64 = 1.5;
const B: f64 = 0.75;
/// Each title term counts this many times.
const TITLE_WEIGHT: u32 = 5;

#[derive(Debug)]
struct Entry {
    doc: SearchDocument,
    terms: FxHashMap<String, u32>,
    length: usize,
    /// Lowercased tags for tag queries.
    tags: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: Vec<Entry>,
    by_id: FxHashMap<String, usize>,
    /// Number of entries containing each term.
    doc_freq: FxHashMap<String, usize>,
    total_length: usize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_stats(&mut self, pos: usize) {
        let entry = &self.entries[pos];
        self.total_length -= entry.length;
        for term in entry.terms.keys() {
            if let Some(count) = self.doc_freq.get_mut(term) {
                *count -= 1;
            }
        }
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.entries.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn search_tag(&self, tag: &str) -> Vec<SearchHit> {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if tag.is_empty() {
            return Vec::new();
        }
        let nested = format!("{tag}/");
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .tags
                    .iter()
                    .any(|t| *t == tag || t.starts_with(&nested))
            })
            .map(|entry| hit(entry, 1.0))
            .collect()
    }

    fn search_text(&self, query: &str) -> Vec<SearchHit> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let avg_length = self.total_length as f64 / self.entries.len().max(1) as f64;
        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| terms.iter().all(|t| entry.terms.contains_key(t)))
            .map(|(pos, entry)| {
                let norm = 1.0 - B + B * (entry.length as f64 / avg_length.max(1.0));
                let score = terms
                    .iter()
                    .map(|term| {
                        let tf = f64::from(entry.terms[term]);
                        self.idf(term) * (tf * (K1 + 1.0)) / (tf + K1 * norm)
                    })
                    .sum();
                (pos, score)
            })
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
            .into_iter()
            .map(|(pos, score)| hit(&self.entries[pos], score))
            .collect()
    }
}

impl SearchIndex for MemoryIndex {
    fn add_document(&mut self, doc: SearchDocument) {
        let mut terms: FxHashMap<String, u32> = FxHashMap::default();
        let mut length = 0;
        for term in tokenize(&doc.body) {
            *terms.entry(term).or_default() += 1;
            length += 1;
        }
        for term in tokenize(&doc.title) {
            *terms.entry(term).or_default() += TITLE_WEIGHT;
            length += TITLE_WEIGHT as usize;
        }
        for tag in &doc.tags {
            for term in tokenize(tag) {
                *terms.entry(term).or_default() += 1;
                length += 1;
            }
        }

        let entry = Entry {
            tags: doc.tags.iter().map(|t| t.to_lowercase()).collect(),
            doc,
            terms,
            length,
        };

        for term in entry.terms.keys() {
            *self.doc_freq.entry(term.clone()).or_default() += 1;
        }
        self.total_length += entry.length;

        match self.by_id.get(&entry.doc.id).copied() {
            Some(pos) => {
                self.remove_stats(pos);
                self.entries[pos] = entry;
            }
            None => {
                self.by_id.insert(entry.doc.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    fn search(&self, query: &str) -> Vec<SearchHit> {
        match query.trim().strip_prefix("tag:") {
            Some(tag) => self.search_tag(tag),
            None => self.search_text(query),
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn hit(entry: &Entry, score: f64) -> SearchHit {
    SearchHit {
        id: entry.doc.id.clone(),
        title: entry.doc.title.clone(),
        url: entry.doc.url.clone(),
        score,
    }
}

/// Lowercased alphanumeric runs.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, tags: &[&str], body: &str) -> SearchDocument {
        SearchDocument {
            id: id.into(),
            title: title.into(),
            url: format!("/{id}.html"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: body.into(),
        }
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.id.as_str()).collect()
    }

    #[test]
    fn test_full_text_requires_every_term() {
        let mut index = MemoryIndex::new();
        index.add_document(doc("a", "Alpha", &[], "rust borrow checker"));
        index.add_document(doc("b", "Beta", &[], "rust macros"));

        let hits = index.search("rust");
        let mut both = ids(&hits);
        both.sort_unstable();
        assert_eq!(both, vec!["a", "b"]);
        assert_eq!(ids(&index.search("Rust Borrow")), vec!["a"]);
        assert!(index.search("python").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_title_outranks_body() {
        let mut index = MemoryIndex::new();
        index.add_document(doc("body", "Notes", &[], "gardening tips and more"));
        index.add_document(doc("title", "Gardening", &[], "tips"));
        assert_eq!(ids(&index.search("gardening")), vec!["title", "body"]);
    }

    #[test]
    fn test_tag_query() {
        let mut index = MemoryIndex::new();
        index.add_document(doc("a", "A", &["Project"], ""));
        index.add_document(doc("b", "B", &["project/alpha"], ""));
        index.add_document(doc("c", "C", &["projects"], ""));

        assert_eq!(ids(&index.search("tag:project")), vec!["a", "b"]);
        assert_eq!(ids(&index.search("tag: #project/alpha")), vec!["b"]);
        assert!(index.search("tag:").is_empty());
    }

    #[test]
    fn test_readding_replaces_entry() {
        let mut index = MemoryIndex::new();
        index.add_document(doc("a", "A", &[], "old words"));
        index.add_document(doc("a", "A", &[], "new words"));

        assert_eq!(index.len(), 1);
        assert!(index.search("old").is_empty());
        assert_eq!(ids(&index.search("new")), vec!["a"]);
        assert_eq!(index.doc_freq.get("old"), Some(&0));
    }
}
