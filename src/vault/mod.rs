//! The vault: documents, their metadata and the namespace they live in.
//!
//! - [`document`]: per-file state carried through both stages
//! - [`index`]: the namespace index (canonical path → document)
//! - [`meta`]: front matter and inline tags
//! - [`code`]: code regions excised while links are rewritten
//! - [`scan`]: filling the index from disk

pub mod code;
pub mod document;
pub mod index;
pub mod meta;
pub mod scan;

pub use code::CodeRegions;
pub use document::{DocId, DocKind, Document, LinkOccurrence, Source};
pub use index::VaultIndex;
pub use meta::NoteMeta;
pub use scan::scan_vault;

/// Vault path of the virtual page every unresolved note link points to.
pub const NOT_FOUND_PATH: &str = "not_created.md";
