//! Command implementations. Each returns the text destined for stdout.

use crate::cli::{Cli, Command, InputArgs};
use crate::config::{LimitsConfig, OutputFormat, SiteStockConfig};
use crate::error::{Result, SiteStockError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sitestock_core::{
    AllocationOutcome, AllocationStats, ConsumptionReport, PurchaseUsageAllocator,
    PurchaseUsageMap,
};
use sitestock_types::{AllocationRequest, records_from_json};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// What a command printed, and whether the process should still fail.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub failure: Option<SiteStockError>,
}

impl CommandOutput {
    fn ok(stdout: String) -> Self {
        Self { stdout, failure: None }
    }
}

/// Runs the parsed command against the effective configuration.
pub fn execute(cli: &Cli, config: &SiteStockConfig) -> Result<CommandOutput> {
    match &cli.command {
        Command::Allocate { input } => allocate_command(input, config).map(CommandOutput::ok),
        Command::Report { input, strict } => report_command(input, *strict, config),
        Command::Config => config.to_toml().map(CommandOutput::ok),
    }
}

#[instrument(skip_all, fields(purchases = %input.purchases.display()))]
pub fn allocate_command(input: &InputArgs, config: &SiteStockConfig) -> Result<String> {
    let request = load_request(input, &config.limits)?;
    let outcome =
        PurchaseUsageAllocator::new().allocate_with_stats(&request.purchases, &request.usage);
    info!(
        purchases = request.purchases.len(),
        usage_rows = request.usage.len(),
        allocated_purchases = outcome.usage.len(),
        dropped_quantity = outcome.stats.dropped_quantity,
        "Allocation finished"
    );

    let format = input.format.unwrap_or(config.output.format);
    render_allocation(&outcome, format, config.output.precision)
}

#[instrument(skip_all, fields(purchases = %input.purchases.display(), strict = strict))]
pub fn report_command(
    input: &InputArgs,
    strict: bool,
    config: &SiteStockConfig,
) -> Result<CommandOutput> {
    let request = load_request(input, &config.limits)?;
    let usage = PurchaseUsageAllocator::new().allocate(&request.purchases, &request.usage);
    let report = ConsumptionReport::build(&request.purchases, &usage);
    let over_consumed: Vec<String> = report.over_consumed().map(str::to_string).collect();
    info!(
        purchases = report.lines.len(),
        materials = report.materials.len(),
        over_consumed = over_consumed.len(),
        "Consumption report built"
    );

    let format = input.format.unwrap_or(config.output.format);
    let stdout = render_report(&report, &over_consumed, format, config.output.precision)?;

    let failure = (strict && !over_consumed.is_empty())
        .then(|| SiteStockError::OverConsumption { purchase_ids: over_consumed });
    Ok(CommandOutput { stdout, failure })
}

/// Reads the purchase and usage files named in `input`.
pub fn load_request(input: &InputArgs, limits: &LimitsConfig) -> Result<AllocationRequest> {
    let purchases = load_rows(&input.purchases, limits.max_records_per_file)?;
    let usage = match &input.usage {
        Some(path) => load_rows(path, limits.max_records_per_file)?,
        None => Vec::new(),
    };
    Ok(AllocationRequest { purchases, usage })
}

/// Reads a JSON array of rows. A file containing `null` has no rows.
pub fn load_rows<T: DeserializeOwned>(path: &Path, limit: usize) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .map_err(|source| SiteStockError::Io { path: path.to_path_buf(), source })?;
    let rows: Vec<T> = records_from_json(&contents).map_err(|e| SiteStockError::Parse {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })?;

    if rows.len() > limit {
        return Err(SiteStockError::LimitExceeded {
            path: path.to_path_buf(),
            actual: rows.len(),
            limit,
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded rows");
    Ok(rows)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationDocument<'a> {
    generated_at: DateTime<Utc>,
    usage: &'a PurchaseUsageMap,
    stats: &'a AllocationStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a ConsumptionReport,
    over_consumed: &'a [String],
}

/// Renders an allocation as `id<TAB>total` lines plus a summary, or as JSON.
pub fn render_allocation(
    outcome: &AllocationOutcome,
    format: OutputFormat,
    precision: usize,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&AllocationDocument {
            generated_at: Utc::now(),
            usage: &outcome.usage,
            stats: &outcome.stats,
        }),
        OutputFormat::Text => {
            let mut out = String::new();
            for (purchase_id, total) in outcome.usage.iter() {
                let _ = writeln!(out, "{purchase_id}\t{total:.precision$}");
            }
            let _ = writeln!(
                out,
                "# {} purchase(s), {:.p$} allocated, {:.p$} dropped",
                outcome.usage.len(),
                outcome.usage.total(),
                outcome.stats.dropped_quantity,
                p = precision
            );
            Ok(out)
        }
    }
}

/// Renders a report as an aligned table, or as JSON.
pub fn render_report(
    report: &ConsumptionReport,
    over_consumed: &[String],
    format: OutputFormat,
    precision: usize,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            to_json(&ReportDocument { generated_at: Utc::now(), report, over_consumed })
        }
        OutputFormat::Text => {
            let id_width = report.lines.iter().map(|l| l.purchase_id.len()).max().unwrap_or(0);
            let id_width = id_width.max("purchase".len());
            let material_width = report
                .lines
                .iter()
                .filter_map(|l| l.material_id.as_ref().map(String::len))
                .max()
                .unwrap_or(0)
                .max("material".len());

            let mut out = String::new();
            let _ = writeln!(
                out,
                "{:<id_width$}  {:<material_width$}  {:>14}  {:>14}  {:>14}",
                "purchase", "material", "purchased", "consumed", "remaining"
            );
            for line in &report.lines {
                let _ = writeln!(
                    out,
                    "{:<id_width$}  {:<material_width$}  {:>14.p$}  {:>14.p$}  {:>14.p$}{}",
                    line.purchase_id,
                    line.material_id.as_deref().unwrap_or("-"),
                    line.purchased,
                    line.consumed,
                    line.remaining,
                    if line.over_consumed { "  OVER" } else { "" },
                    p = precision
                );
            }
            if !over_consumed.is_empty() {
                let _ = writeln!(out, "# over-consumed: {}", over_consumed.join(", "));
            }
            Ok(out)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| SiteStockError::Serialization { message: e.to_string() })
}
