//! Fatal build errors.
//!
//! Anything recoverable (unresolved links, missing sections, orphan pages)
//! is a warning on the build context, not a variant here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("entrypoint `{0}` not found in vault `{1}`")]
    EntrypointMissing(String, PathBuf),

    #[error("invalid front matter in `{path}`: {message}")]
    FrontMatter { path: String, message: String },

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to serialize {0}")]
    Serialize(&'static str, #[source] serde_json::Error),
}

impl BuildError {
    /// Shorthand for wrapping an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |err| Self::Io(path, err)
    }
}
