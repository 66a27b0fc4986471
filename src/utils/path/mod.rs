//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `to_vault_key`)
//! - [`route`]: URL utilities (`is_external_link`, `split_path_fragment`, `strip_relative_markers`)
//! - [`slug`]: Slugification (`slugify`, `slugify_path`)

pub mod fs;
pub mod route;
pub mod slug;

pub use fs::{normalize_path, to_vault_key};
