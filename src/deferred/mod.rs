//! Deferred resolution.
//!
//! Stage B cannot know a page's backlinks, breadcrumbs or embedded search
//! results until every page has been rendered, so it writes placeholder
//! tokens instead ([`token`]). Once the crawl is complete the second pass
//! ([`pass`]) re-opens each emitted page and substitutes them.

mod pass;
mod token;

pub use pass::{DeferredStats, GraphView, PageOutcome, resolve_page, run};
pub use token::{Placeholder, Qualifier, TOKEN_OPEN, find_node_id, neutralize, substitute, tokens};
