//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vaultpress.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `vault` | `[vault]`    | Vault location, entrypoints, crawl policy |
//! | `site`  | `[site]`     | Title and public URL                     |
//! | `build` | `[build]`    | Output paths, slugs, optional artifacts  |

pub mod build;
pub mod site;
pub mod vault;

pub use build::{BuildSectionConfig, SlugConfig, SlugMode};
pub use site::SiteSectionConfig;
pub use vault::VaultConfig;
