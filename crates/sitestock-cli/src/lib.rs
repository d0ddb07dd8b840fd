//! Command-line harness for the SiteStock allocator
//!
//! Reads purchase and usage rows exported as JSON, runs the allocation and
//! prints the per-purchase result or a consumption report. Configuration,
//! logging and error reporting live here; the allocator itself has none.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod tracing_setup;

pub use cli::{Cli, Command, InputArgs};
pub use commands::{CommandOutput, execute};
pub use config::{ConfigSource, OutputFormat, SiteStockConfig};
pub use error::SiteStockError;
