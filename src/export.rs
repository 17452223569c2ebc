//! CSV export of every log matching the current filters.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::AppError;
use crate::filter::LogFilters;
use crate::models::LogRecord;
use crate::query::LogQuery;
use crate::store::LogStore;

pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Action",
    "User",
    "IP Address",
    "User Agent",
    "Timestamp",
    "Metadata",
];

const USER_AGENT_MAX_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
    pub rows: usize,
}

/// Fetches the whole filtered result set in one request, using the same
/// predicates as the paged list, and encodes it.
pub async fn export_logs(
    store: &dyn LogStore,
    filters: &LogFilters,
    now: DateTime<Utc>,
) -> Result<CsvExport, AppError> {
    let logs = store.query(&LogQuery::export(filters)).await?;
    Ok(CsvExport {
        filename: export_filename(now),
        body: encode_csv(&logs),
        rows: logs.len(),
    })
}

/// `debug-logs-2024-05-01T12:30:00.000Z.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "debug-logs-{}.csv",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Header line followed by one line per record, joined with `\n`.
pub fn encode_csv(logs: &[LogRecord]) -> String {
    let mut lines = Vec::with_capacity(logs.len() + 1);
    lines.push(join_row(CSV_HEADER.iter().map(|s| s.to_string())));
    for log in logs {
        lines.push(join_row(row_fields(log)));
    }
    lines.join("\n")
}

fn row_fields(log: &LogRecord) -> [String; 7] {
    [
        log.id.to_string(),
        log.user_action.clone(),
        log.user_name.clone().unwrap_or_else(|| "Unknown".to_string()),
        log.ip_address.clone().unwrap_or_else(|| "N/A".to_string()),
        log.user_agent
            .as_deref()
            .map(|ua| ua.chars().take(USER_AGENT_MAX_CHARS).collect())
            .unwrap_or_else(|| "N/A".to_string()),
        format_timestamp(log.created_at),
        log.metadata.to_string(),
    ]
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn join_row(fields: impl IntoIterator<Item = String>) -> String {
    fields
        .into_iter()
        .map(|f| csv_escape(&f))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
