use clap::Parser;
use sitestock_cli::tracing_setup::{VERBOSE_FILTER, init_tracing};
use sitestock_cli::{Cli, ConfigSource, SiteStockConfig, execute};
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, source) = SiteStockConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.logging.filter = VERBOSE_FILTER.to_string();
    }
    init_tracing(&config.logging)?;

    match &source {
        ConfigSource::File(path) => debug!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Defaults => debug!("No configuration file found, using defaults"),
    }

    let output = match execute(&cli, &config) {
        Ok(output) => output,
        Err(err) => {
            error!(category = err.category(), "{err}");
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if let Some(failure) = output.failure {
        error!(category = failure.category(), "{failure}");
        return Ok(ExitCode::from(failure.exit_code()));
    }

    Ok(ExitCode::SUCCESS)
}
