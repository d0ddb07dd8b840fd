//! Error handling for the SiteStock command-line harness
//!
//! The allocator itself cannot fail. Everything here happens around it:
//! reading input files, parsing rows and configuration, and enforcing limits.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing input for, or reporting on, an allocation run
#[derive(Error, Debug)]
pub enum SiteStockError {
    /// Input or configuration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not a JSON array of rows
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Output could not be serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration file or override is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// Input is larger than the configured limit
    #[error("{} has {actual} rows, more than the limit of {limit}", path.display())]
    LimitExceeded { path: PathBuf, actual: usize, limit: usize },

    /// Strict report found purchases consumed beyond their quantity
    #[error("{} purchase(s) over-consumed: {}", purchase_ids.len(), purchase_ids.join(", "))]
    OverConsumption { purchase_ids: Vec<String> },
}

impl SiteStockError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SiteStockError::Io { .. } => "io",
            SiteStockError::Parse { .. } => "parse",
            SiteStockError::Serialization { .. } => "serialization",
            SiteStockError::Configuration { .. } => "configuration",
            SiteStockError::LimitExceeded { .. } => "limit",
            SiteStockError::OverConsumption { .. } => "over_consumption",
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            SiteStockError::OverConsumption { .. } => 2,
            _ => 1,
        }
    }

    pub fn configuration(message: impl Into<String>, setting: Option<&str>) -> Self {
        SiteStockError::Configuration {
            message: message.into(),
            setting: setting.map(str::to_string),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteStockError>;
