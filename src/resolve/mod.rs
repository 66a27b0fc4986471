//! Reference resolution against the namespace index.

mod resolver;

pub use resolver::{Resolution, Resolver};
