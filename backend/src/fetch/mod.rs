//! Attendance export download.
//!
//! One GET per pipeline run, no retries and no caching. A bounded timeout
//! is applied to the whole request.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use attendance::fetch::{FetchOptions, SourceFetcher};
//!
//! let fetcher = SourceFetcher::new(FetchOptions::default())?;
//! let bytes = fetcher.fetch_bytes().await?;
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RetrievalError;

/// Google Drive download link of the attendance export.
pub const DEFAULT_SOURCE_URL: &str =
    "https://drive.google.com/uc?export=download&id=1lHpFWrloby5BMN3BChYnKdhpIFodMVNO";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to download the export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Export URL
    pub source_url: String,

    /// Whole-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client bound to one export URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl SourceFetcher {
    /// Build a fetcher, validating the URL up front.
    pub fn new(options: FetchOptions) -> Result<Self, RetrievalError> {
        let url = reqwest::Url::parse(&options.source_url)
            .map_err(|e| RetrievalError::InvalidUrl(format!("{}: {}", options.source_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RetrievalError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                options.source_url,
                url.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    pub fn source_url(&self) -> &str {
        self.url.as_str()
    }

    /// Download the export body.
    ///
    /// Any non-2xx status is a [`RetrievalError::Status`].
    pub async fn fetch_bytes(&self) -> Result<Vec<u8>, RetrievalError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
