//! vaultpress - compile a vault of wiki-linked notes into a static site.

mod asset;
mod cli;
mod config;
mod context;
mod core;
mod crawl;
mod deferred;
mod logger;
mod network;
mod outline;
mod render;
mod resolve;
mod search;
mod transform;
mod utils;
mod vault;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SiteConfig::load(cli)?;

    match &cli.command {
        Commands::Build { .. } => cli::build::build_vault(&config, false).map(|_| ()),
        Commands::Config { path } => cli::config::print_config(&config, path.as_deref()),
        Commands::Resolve { link, from } => {
            cli::resolve::resolve_link(&config, link, from.as_deref())
        }
    }
}
