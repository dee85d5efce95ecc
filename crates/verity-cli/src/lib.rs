//! Verity CLI library.
//!
//! Command-line access to the confidence engine: one-shot intervals, Beta
//! posterior sampling, and a simulated enrichment session over a page
//! fixture.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod source;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
