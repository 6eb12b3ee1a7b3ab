//! High-level pipeline API: export bytes to nested attendance report.
//!
//! Every call recomputes the report from scratch; nothing is cached between
//! runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use attendance::api::logs::RequestLog;
//! use attendance::fetch::{FetchOptions, SourceFetcher};
//! use attendance::transform::pipeline::generate_attendance;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = SourceFetcher::new(FetchOptions::default())?;
//!     let result = generate_attendance(&fetcher, RequestLog::default()).await?;
//!     println!("{}", serde_json::to_string_pretty(&result.report)?);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use super::grouper::group_attendance;
use super::timestamp::parse_session_date;
use crate::api::logs::{LogEntry, RequestLog};
use crate::error::{AttendanceError, ParseError};
use crate::fetch::SourceFetcher;
use crate::models::{AttendanceRecord, AttendanceReport, ParsedRecord};
use crate::parser::{detect_delimiter, parse_attendance, parse_bytes_auto, parse_file_auto, strip_bom, ParsedTable};

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Nested date -> class -> students report
    pub report: AttendanceReport,

    /// Export parsing metadata
    pub csv_info: CsvInfo,

    /// Rows grouped under the unknown-date bucket
    pub unparseable_dates: usize,
}

/// Export file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Pair each record with the date of its start timestamp.
pub fn attach_session_dates(records: Vec<AttendanceRecord>) -> Vec<ParsedRecord> {
    records
        .into_iter()
        .map(|record| {
            let date = parse_session_date(&record.start_time);
            ParsedRecord { record, date }
        })
        .collect()
}

/// Transform already-decoded export text.
///
/// A leading BOM is dropped and the delimiter is auto-detected from the
/// header line.
pub fn transform_text(content: &str) -> Result<AttendanceReport, ParseError> {
    let content = strip_bom(content);
    let records = parse_attendance(content, detect_delimiter(content))?;
    Ok(group_attendance(&attach_session_dates(records)))
}

/// Transform raw export bytes with encoding and delimiter detection.
pub fn transform_bytes(bytes: &[u8]) -> Result<PipelineResult, AttendanceError> {
    let table = parse_bytes_auto(bytes)?;
    Ok(transform_parsed(table, RequestLog::default()))
}

/// Transform an export file on disk.
pub fn transform_file(path: &Path) -> Result<PipelineResult, AttendanceError> {
    let table = parse_file_auto(path)?;
    Ok(transform_parsed(table, RequestLog::default()))
}

/// Download the export and transform it.
///
/// Fails only if the download fails or the export is structurally unusable.
/// Every step is logged through `log`.
pub async fn generate_attendance(
    fetcher: &SourceFetcher,
    log: RequestLog<'_>,
) -> Result<PipelineResult, AttendanceError> {
    log.info(format!("📥 Fetching attendance export from {}", fetcher.source_url()));
    let bytes = fetcher.fetch_bytes().await?;
    log.success(format!("Downloaded {} bytes", bytes.len()));

    let table = parse_bytes_auto(&bytes)?;
    Ok(transform_parsed(table, log))
}

/// Internal: date and group parsed rows
fn transform_parsed(table: ParsedTable, log: RequestLog<'_>) -> PipelineResult {
    log.log(LogEntry::success(format!("Detected encoding: {}", table.encoding)).with_indent(1));
    log.log(LogEntry::success(format!("Detected separator: '{}'", format_delimiter(table.delimiter))).with_indent(1));
    log.success(format!("Read {} rows", table.records.len()));

    let csv_info = CsvInfo {
        encoding: table.encoding,
        delimiter: table.delimiter,
        headers: table.headers,
        row_count: table.records.len(),
    };

    let parsed = attach_session_dates(table.records);
    let unparseable_dates = parsed.iter().filter(|r| !r.date.is_parsed()).count();
    if unparseable_dates > 0 {
        log.warning(format!(
            "{} rows have an unparseable start time, grouped under \"unknown\"",
            unparseable_dates
        ));
    }

    log.info("📦 Grouping by date and class...");
    let report = group_attendance(&parsed);
    let class_count: usize = report.iter().map(|(_, day)| day.classes.len()).sum();
    log.success(format!("{} dates, {} classes", report.len(), class_count));

    PipelineResult {
        report,
        csv_info,
        unparseable_dates,
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
