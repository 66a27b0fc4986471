//! Utility modules shared by the vault pipeline.
//!
//! - [`html`]: HTML escaping and attribute parsing
//! - [`path`]: path normalization, link classification, slugs
//! - [`plural`]: count formatting for log output

pub mod html;
pub mod path;
mod plural;

pub use plural::plural_count;
