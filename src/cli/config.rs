//! `vaultpress config`: print resolved settings.

use anyhow::{Result, bail};

use crate::config::SiteConfig;

/// Print the value at `path`, or the whole resolved config.
pub fn print_config(config: &SiteConfig, path: Option<&str>) -> Result<()> {
    println!("{}", config_value(config, path)?);
    Ok(())
}

fn config_value(config: &SiteConfig, path: Option<&str>) -> Result<String> {
    let path = path.unwrap_or_default();
    let Some(value) = config.lookup(path) else {
        bail!("no config value at `{path}`");
    };
    Ok(format_value(&value)?)
}

/// Scalars print bare, tables as TOML and arrays inline.
fn format_value(value: &toml::Value) -> Result<String, toml::ser::Error> {
    Ok(match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(table) => toml::to_string_pretty(table)?.trim_end().to_string(),
        other => other.to_string(),
    })
}
