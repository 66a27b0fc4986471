//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Compile a vault of wiki-linked notes into a cross-referenced static site
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Vault directory path (relative to project root)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub vault: Option<PathBuf>,

    /// Config file path (default: vaultpress.toml)
    #[arg(short = 'C', long, global = true, default_value = "vaultpress.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Crawl the vault from its entrypoint and emit the site
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print a resolved config value by dotted path (e.g. `vault.max_depth`)
    #[command(visible_alias = "c")]
    Config {
        /// Dotted path; omit to print the whole config
        path: Option<String>,
    },

    /// Resolve one link against the vault and print its canonical path
    #[command(visible_alias = "r")]
    Resolve {
        /// Link text as written inside `[[...]]` or `(...)`
        link: String,

        /// Vault-relative path of the note containing the link
        #[arg(short, long)]
        from: Option<String>,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Entry note (relative to the vault root)
    #[arg(short, long)]
    pub entrypoint: Option<String>,

    /// Override site URL; its path component becomes the link prefix.
    ///
    /// Example: deploying to a GitHub Pages project site:
    ///   vaultpress build --site-url "https://example.github.io/notes"
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Also render notes not reachable from any entrypoint
    #[arg(short = 'a', long)]
    pub process_all: bool,

    /// Stop following links past this depth
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::parse_from([
            "vaultpress",
            "build",
            "--clean",
            "--max-depth",
            "2",
            "--process-all",
            "-e",
            "Home.md",
        ]);
        let Commands::Build { build_args } = &cli.command else {
            panic!("expected build");
        };
        assert!(build_args.clean);
        assert!(build_args.process_all);
        assert_eq!(build_args.max_depth, Some(2));
        assert_eq!(build_args.entrypoint.as_deref(), Some("Home.md"));
        assert_eq!(cli.config, PathBuf::from("vaultpress.toml"));
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from(["vaultpress", "resolve", "x", "--from", "a/entry.md"]);
        let Commands::Resolve { link, from } = &cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(link, "x");
        assert_eq!(from.as_deref(), Some("a/entry.md"));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["vaultpress", "config", "vault.root", "--vault", "notes"]);
        assert!(matches!(cli.command, Commands::Config { .. }));
        assert_eq!(cli.vault, Some(PathBuf::from("notes")));
    }
}
