//! Core types shared across the pipeline.

mod error;
mod link;

pub use error::BuildError;
pub use link::{LinkKind, LinkTarget};
