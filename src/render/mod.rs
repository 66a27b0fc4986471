//! Markup renderer collaborator.
//!
//! Stage B hands intermediate markdown (links already rewritten, code
//! restored) to a [`MarkupRenderer`] and gets final HTML back, plus the
//! plain text fed to the search index.
//!
//! Extensions are a closed capability set: a renderer implementing
//! [`Extensible`] accepts [`BlockHandler`] and [`InlinePattern`] variants.

mod extensions;
mod markdown;

pub use extensions::{BlockHandler, InlinePattern};
pub use markdown::MarkdownRenderer;

use crate::config::SlugMode;

/// Output of one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Text content without markup, for search.
    pub text: String,
}

/// Per-page settings passed along with the text.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Slug mode for heading ids.
    pub fragment_slug: SlugMode,
}

pub trait MarkupRenderer {
    fn render(&self, text: &str, ctx: &RenderContext) -> Rendered;
}

pub trait Extensible {
    fn register_block_handler(&mut self, handler: BlockHandler);
    fn register_inline_pattern(&mut self, pattern: InlinePattern);
}
