//! Reference resolver.
//!
//! Turns the short, ambiguous link text authors write (`[[note]]`,
//! `[x](../a/b.md)`) into a canonical vault path:
//!
//! 1. strip `./` / `../` markers and the site prefix
//! 2. external URLs resolve to [`Resolution::External`]
//! 3. fold case per the index policy
//! 4. exact match
//! 5. tail-segment match, fewest segments wins, ties go to the last registered
//! 6. no match: retry 4-5 with the default extension appended
//!
//! Results are memoized per (query, folding policy, index generation).
//! Links starting with `./` or `../` first try the path relative to the
//! current note; those lookups are cheap and never memoized.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::utils::path::{
    route::{is_external_link, is_relative_link, strip_relative_markers, strip_site_prefix},
    to_vault_key,
};
use crate::vault::{DocId, VaultIndex};

/// A resolved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Canonical vault path, original case.
    pub canonical: String,
    pub doc: DocId,
}

/// Outcome of resolving one link. Failure is a value, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Target),
    /// Carries a URL scheme; the caller leaves it as is.
    External,
    NotFound,
}

impl Resolution {
    pub fn doc(&self) -> Option<DocId> {
        match self {
            Self::Found(target) => Some(target.doc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    query: String,
    folded: bool,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Resolver {
    /// Site prefix stripped from root-relative links, without slashes.
    site_prefix: String,
    /// Extension appended on retry, without the dot.
    default_extension: String,
    memo: FxHashMap<MemoKey, Resolution>,
    /// Generation the memo entries were computed against.
    memo_generation: u64,
    hits: usize,
}

impl Resolver {
    pub fn new(site_prefix: impl Into<String>, default_extension: impl Into<String>) -> Self {
        Self {
            site_prefix: site_prefix.into().trim_matches('/').to_string(),
            default_extension: default_extension.into(),
            ..Self::default()
        }
    }

    /// Resolve a link path (fragment already split off).
    ///
    /// `current` is the vault path of the note containing the link.
    pub fn resolve(&mut self, index: &VaultIndex, raw: &str, current: Option<&str>) -> Resolution {
        let raw = raw.trim();

        if is_relative_link(raw)
            && let Some(current) = current
            && let Some(target) = self.resolve_relative(index, raw, current)
        {
            return Resolution::Found(target);
        }

        let cleaned = strip_site_prefix(strip_relative_markers(raw), &self.site_prefix);
        if is_external_link(cleaned) {
            return Resolution::External;
        }
        if cleaned.is_empty() {
            return Resolution::NotFound;
        }

        if self.memo_generation != index.generation() {
            self.memo.clear();
            self.memo_generation = index.generation();
        }

        let key = MemoKey {
            query: cleaned.to_string(),
            folded: index.case_insensitive(),
            generation: index.generation(),
        };
        if let Some(hit) = self.memo.get(&key) {
            self.hits += 1;
            return hit.clone();
        }

        let result = self.resolve_uncached(index, cleaned);
        self.memo.insert(key, result.clone());
        result
    }

    /// Number of resolutions answered from the memo.
    pub const fn memo_hits(&self) -> usize {
        self.hits
    }

    fn resolve_uncached(&self, index: &VaultIndex, cleaned: &str) -> Resolution {
        let query = index.fold(cleaned);

        if let Some(found) = match_query(index, &query) {
            return found;
        }

        let suffix = format!(".{}", self.default_extension);
        let has_extension = query
            .to_ascii_lowercase()
            .ends_with(&suffix.to_ascii_lowercase());
        if !has_extension && !self.default_extension.is_empty() {
            let retry = format!("{query}{suffix}");
            let retry = index.fold(&retry);
            if let Some(found) = match_query(index, &retry) {
                return found;
            }
        }

        Resolution::NotFound
    }

    /// Exact path relative to the current note's folder.
    fn resolve_relative(&self, index: &VaultIndex, raw: &str, current: &str) -> Option<Target> {
        let folder = Path::new(current).parent().unwrap_or(Path::new(""));
        let joined = to_vault_key(&folder.join(raw))?;

        let with_extension = format!("{joined}.{}", self.default_extension);
        [joined.as_str(), with_extension.as_str()]
            .into_iter()
            .find_map(|candidate| index.lookup(candidate))
            .map(|doc| target(index, doc))
    }
}

/// Exact match, then tail-segment match.
fn match_query(index: &VaultIndex, query: &str) -> Option<Resolution> {
    if let Some(doc) = index.lookup_folded(query) {
        return Some(Resolution::Found(target(index, doc)));
    }

    let query_segments: Vec<&str> = query.split('/').filter(|s| !s.is_empty()).collect();
    if query_segments.is_empty() {
        return None;
    }

    let mut best: Option<(usize, DocId)> = None;
    for (doc, key) in index.keys() {
        let key_segments: Vec<&str> = key.split('/').collect();
        if !key_segments.ends_with(&query_segments) {
            continue;
        }
        // Fewer segments replaces; on a tie the later registration wins
        if best.is_none_or(|(len, _)| key_segments.len() <= len) {
            best = Some((key_segments.len(), doc));
        }
    }

    best.map(|(_, doc)| Resolution::Found(target(index, doc)))
}

fn target(index: &VaultIndex, doc: DocId) -> Target {
    Target {
        canonical: index.get(doc).rel_path.clone(),
        doc,
    }
}
