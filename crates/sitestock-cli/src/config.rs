use crate::error::{Result, SiteStockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "SITESTOCK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "sitestock.toml";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SiteStockError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(SiteStockError::configuration(
                format!("unknown output format '{other}', expected 'text' or 'json'"),
                Some("output.format"),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// `[logging]`: subscriber filter and output shape.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

/// `[limits]`: input size guards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LimitsConfig {
    /// Rows accepted from a single input file
    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_records_per_file: default_max_records_per_file() }
    }
}

/// `[output]`: how command results are rendered.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Decimal places in text output
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { precision: default_precision(), format: OutputFormat::default() }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SiteStockConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl SiteStockConfig {
    /// Loads configuration from `explicit`, `SITESTOCK_CONFIG_PATH` or `sitestock.toml`.
    ///
    /// An explicitly named file must exist. The default file is optional and
    /// built-in defaults are used when it is absent. Environment overrides are
    /// applied on top in both cases.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let (config, source) = match named {
            Some(path) => (Self::from_file(&path)?, ConfigSource::File(path)),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    (Self::from_file(&path)?, ConfigSource::File(path))
                } else {
                    (Self::default(), ConfigSource::Defaults)
                }
            }
        };

        Ok((config.apply_env_overrides()?, source))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|source| SiteStockError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| SiteStockError::configuration(e.to_string(), None))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SiteStockError::configuration(e.to_string(), None))
    }

    /// Applies `SITESTOCK_*` environment variable overrides.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed by environment variable name.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(filter) = lookup("SITESTOCK_LOG_FILTER") {
            self.logging.filter = filter;
        }
        if let Some(json) = lookup("SITESTOCK_LOG_JSON") {
            self.logging.json = parse_setting(&json, "SITESTOCK_LOG_JSON")?;
        }
        if let Some(max_records) = lookup("SITESTOCK_MAX_RECORDS") {
            self.limits.max_records_per_file =
                parse_setting(&max_records, "SITESTOCK_MAX_RECORDS")?;
        }
        if let Some(precision) = lookup("SITESTOCK_OUTPUT_PRECISION") {
            self.output.precision = parse_setting(&precision, "SITESTOCK_OUTPUT_PRECISION")?;
        }
        if let Some(format) = lookup("SITESTOCK_OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_records_per_file == 0 {
            return Err(SiteStockError::configuration(
                "max_records_per_file must be greater than zero",
                Some("limits.max_records_per_file"),
            ));
        }
        if self.output.precision > MAX_PRECISION {
            return Err(SiteStockError::configuration(
                format!("precision must be at most {MAX_PRECISION}"),
                Some("output.precision"),
            ));
        }
        Ok(())
    }
}

const MAX_PRECISION: usize = 12;

fn parse_setting<T: FromStr>(value: &str, setting: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SiteStockError::configuration(format!("invalid value '{value}'"), Some(setting))
    })
}

fn default_log_filter() -> String {
    "sitestock=info".to_string()
}
fn default_max_records_per_file() -> usize {
    1_000_000
}
fn default_precision() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let config = SiteStockConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteStockConfig::default());
        assert_eq!(config.logging.filter, "sitestock=info");
        assert_eq!(config.limits.max_records_per_file, 1_000_000);
        assert_eq!(config.output.precision, 3);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SiteStockConfig::from_toml_str(
            r#"
[logging]
json = true

[output]
format = "json"
"#,
        )
        .unwrap();
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "sitestock=info");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.precision, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SiteStockConfig::from_toml_str("[limits]\nmax_records_per_file = 0").is_err());
        assert!(SiteStockConfig::from_toml_str("[output]\nprecision = 40").is_err());
        assert!(SiteStockConfig::from_toml_str("[output]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SITESTOCK_LOG_FILTER", "sitestock=trace"),
            ("SITESTOCK_LOG_JSON", "true"),
            ("SITESTOCK_MAX_RECORDS", "10"),
            ("SITESTOCK_OUTPUT_PRECISION", "1"),
            ("SITESTOCK_OUTPUT_FORMAT", "JSON"),
        ]);
        let config = SiteStockConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.logging.filter, "sitestock=trace");
        assert!(config.logging.json);
        assert_eq!(config.limits.max_records_per_file, 10);
        assert_eq!(config.output.precision, 1);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn unparseable_override_names_the_setting() {
        let err = SiteStockConfig::default()
            .apply_overrides(|key| (key == "SITESTOCK_MAX_RECORDS").then(|| "lots".to_string()))
            .unwrap_err();
        match err {
            SiteStockError::Configuration { setting, .. } => {
                assert_eq!(setting.as_deref(), Some("SITESTOCK_MAX_RECORDS"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn toml_round_trip_is_stable() {
        let config = SiteStockConfig::default();
        let rendered = config.to_toml().unwrap();
        assert_eq!(SiteStockConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
