//! Command-line interface module.

mod args;
pub mod build;
pub mod config;
pub mod resolve;

pub use args::{BuildArgs, Cli, Commands};
