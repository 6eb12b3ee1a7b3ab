//! Error types for the attendance pipeline.
//!
//! Only structural failures are errors here:
//!
//! - [`RetrievalError`] - the export could not be downloaded
//! - [`ParseError`] - the export is not a readable attendance table
//! - [`AttendanceError`] - tagged union of the two, returned by the pipeline
//! - [`ServerError`] - HTTP server startup failures
//!
//! Per-row anomalies (empty cells, bad timestamps) never surface as errors;
//! they are neutralized during cleaning.

use thiserror::Error;

// =============================================================================
// Retrieval Errors
// =============================================================================

/// Errors while downloading the attendance export.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The configured source URL cannot be used.
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),

    /// The remote answered with a non-success status.
    #[error("Source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The download did not complete in time.
    #[error("Source request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RetrievalError::Timeout
        } else if err.is_builder() {
            RetrievalError::InvalidUrl(err.to_string())
        } else if err.is_body() || err.is_decode() {
            RetrievalError::Body(err.to_string())
        } else {
            RetrievalError::Network(err.to_string())
        }
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

/// Errors while reading the export as an attendance table.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Nothing to parse, not even a header row.
    #[error("Attendance export is empty")]
    Empty,

    /// One or more required columns are absent from the header row.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The tabular structure is unreadable.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Local file could not be read.
    #[error("Cannot read file: {0}")]
    Io(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        ParseError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io(err.to_string())
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Failure of a whole fetch -> clean -> group run.
///
/// Matched explicitly by the HTTP layer to pick a status code.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl AttendanceError {
    /// Short machine-readable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AttendanceError::Retrieval(_) => "retrieval",
            AttendanceError::Parse(_) => "parse",
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server startup errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid source configuration: {0}")]
    Source(#[from] RetrievalError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type RetrievalResult<T> = Result<T, RetrievalError>;

pub type ParseResult<T> = Result<T, ParseError>;

pub type AttendanceResult<T> = Result<T, AttendanceError>;
