//! Report rendering: aligned table, CSV or JSON

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use pkgtrail_pkg::{ManagerKind, PackageRecord};
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// Comma-separated values with every field quoted
    Csv,
    /// Pretty-printed array of objects
    Json,
}

/// Time zone used to display timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayTz {
    /// System local time
    #[default]
    Local,
    /// UTC
    Utc,
}

/// Format epoch seconds as `YYYY-MM-DD HH:MM:SS`
pub fn format_time(ts: i64, tz: DisplayTz) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp(ts, 0) else {
        return ts.to_string();
    };
    match tz {
        DisplayTz::Local => utc.with_timezone(&Local).format(TIME_FORMAT).to_string(),
        DisplayTz::Utc => utc.format(TIME_FORMAT).to_string(),
    }
}

/// Render already-sorted records in the requested format
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn render(
    records: &[PackageRecord],
    format: OutputFormat,
    tz: DisplayTz,
) -> eyre::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(records, tz)),
        OutputFormat::Csv => Ok(render_csv(records, tz)),
        OutputFormat::Json => render_json(records, tz),
    }
}

fn table_row(name: &str, version: &str, time: &str, manager: &str) -> String {
    format!("{name:<40} {version:<16} {time:<25} {manager}")
}

fn render_table(records: &[PackageRecord], tz: DisplayTz) -> String {
    std::iter::once(table_row("NAME", "VERSION", "INSTALLED_AT", "MANAGER"))
        .chain(records.iter().map(|r| {
            table_row(
                &r.name,
                &r.version,
                &format_time(r.timestamp, tz),
                r.manager.as_str(),
            )
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn render_csv(records: &[PackageRecord], tz: DisplayTz) -> String {
    std::iter::once("NAME,VERSION,INSTALLED_AT,MANAGER".to_string())
        .chain(records.iter().map(|r| {
            [
                csv_field(&r.name),
                csv_field(&r.version),
                csv_field(&format_time(r.timestamp, tz)),
                csv_field(r.manager.as_str()),
            ]
            .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct JsonRow<'a> {
    name: &'a str,
    version: &'a str,
    installed_at: String,
    manager: ManagerKind,
    epoch: i64,
}

fn render_json(records: &[PackageRecord], tz: DisplayTz) -> eyre::Result<String> {
    let rows: Vec<JsonRow<'_>> = records
        .iter()
        .map(|r| JsonRow {
            name: &r.name,
            version: &r.version,
            installed_at: format_time(r.timestamp, tz),
            manager: r.manager,
            epoch: r.timestamp,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
