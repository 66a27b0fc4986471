//! The two document stages.
//!
//! ```text
//! vault note ──(Stage A: note)──> output/md/<path>.md
//!                                      │
//!            ┌──────(Stage B: page)────┘
//!            ▼
//! output/html/<slug>.html  (with deferred placeholders)
//! ```
//!
//! Stage A resolves links once against the vault namespace. Stage B only
//! reads what Stage A wrote, so it runs after every reachable note has
//! been through Stage A.

mod include;
mod links;
mod note;
mod page;
mod template;

pub use template::{tag_anchor, tag_index_page};

use note::transform_note;
use page::render_page;

use crate::context::BuildContext;
use crate::core::BuildError;
use crate::crawl::Stage;
use crate::vault::{DocId, Document};

// =============================================================================
// Stages
// =============================================================================

/// Stage A as a crawl stage.
pub struct NoteStage;

impl Stage for NoteStage {
    const NAME: &'static str = "notes";

    fn is_processed(doc: &Document) -> bool {
        doc.processed_note
    }

    fn mark(doc: &mut Document) {
        doc.processed_note = true;
    }

    fn run(ctx: &mut BuildContext, id: DocId) -> Result<Vec<DocId>, BuildError> {
        transform_note(ctx, id)
    }
}

/// Stage B as a crawl stage. Only notes that went through Stage A qualify.
pub struct PageStage;

impl Stage for PageStage {
    const NAME: &'static str = "pages";

    fn is_processed(doc: &Document) -> bool {
        doc.processed_page
    }

    fn mark(doc: &mut Document) {
        doc.processed_page = true;
    }

    fn accepts(doc: &Document) -> bool {
        doc.is_note() && doc.processed_note
    }

    fn run(ctx: &mut BuildContext, id: DocId) -> Result<Vec<DocId>, BuildError> {
        render_page(ctx, id)
    }
}
