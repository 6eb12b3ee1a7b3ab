//! # SGS Attendance - attendance export reshaping service
//!
//! Downloads the academy's tabular attendance export and serves it as nested
//! JSON grouped by date and class.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV export  │────▶│   Parser    │────▶│  Timestamp  │────▶│   Grouper   │
//! │  (remote)   │     │ (clean rows)│     │ (date, day) │     │(date/class) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use attendance::transform_text;
//!
//! let report = transform_text(&export_csv)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Retrieval and parse error types
//! - [`models`] - Records and the nested report
//! - [`parser`] - CSV parsing and field cleaning
//! - [`fetch`] - Export download
//! - [`transform`] - Timestamp parsing, grouping, and pipeline
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Input
pub mod fetch;
pub mod parser;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{AttendanceError, ParseError, RetrievalError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AttendanceRecord,
    AttendanceReport,
    ClassSummary,
    DaySummary,
    OrderedMap,
    ParsedRecord,
    SessionDate,
    StudentEntry,
    UNKNOWN_DATE_KEY,
};

// =============================================================================
// Re-exports - Parsing & Fetching
// =============================================================================

pub use parser::{
    parse_attendance,
    parse_bytes_auto,
    parse_file_auto,
    strip_bom,
    strip_timezone_suffix,
    ParsedTable,
    REQUIRED_COLUMNS,
};

pub use fetch::{FetchOptions, SourceFetcher, DEFAULT_SOURCE_URL};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    attach_session_dates,
    generate_attendance,
    transform_bytes,
    transform_file,
    transform_text,
    CsvInfo,
    PipelineResult,
};

pub use transform::{group_attendance, parse_session_date, weekday_name};

// Server
pub mod server {
    pub use crate::api::server::{build_router, start_server, AppState, ServerConfig};
}
