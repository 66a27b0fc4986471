//! `vaultpress resolve`: resolve one link against the vault.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::resolve::{Resolution, Resolver};
use crate::vault::scan_vault;

/// Print the canonical path of `link`, `external` or `unresolved`.
pub fn resolve_link(config: &SiteConfig, link: &str, from: Option<&str>) -> Result<()> {
    println!("{}", resolve_to_string(config, link, from)?);
    Ok(())
}

fn resolve_to_string(config: &SiteConfig, link: &str, from: Option<&str>) -> Result<String> {
    let index = scan_vault(config)?;
    let mut resolver = Resolver::new(&config.site_prefix, &config.vault.default_extension);

    Ok(match resolver.resolve(&index, link, from) {
        Resolution::Found(target) => target.canonical,
        Resolution::External => "external".to_string(),
        Resolution::NotFound => "unresolved".to_string(),
    })
}
