//! Command-line definition for the `sitestock` binary.

use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Reconstruct per-purchase material consumption from exported rows
#[derive(Parser, Debug)]
#[command(name = "sitestock")]
#[command(about = "Allocate material usage to purchases and report consumption")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to $SITESTOCK_CONFIG_PATH, then sitestock.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print consumed quantity per purchase
    Allocate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print consumed versus purchased quantity for every purchase
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Exit with an error if any purchase is over-consumed
        #[arg(long)]
        strict: bool,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON array of purchase rows, oldest first
    #[arg(short, long)]
    pub purchases: PathBuf,

    /// JSON array of usage rows; omitted means no usage
    #[arg(short, long)]
    pub usage: Option<PathBuf>,

    /// Output format (overrides configuration)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}
