//! Client building blocks for endpoint2file: configuration, the report
//! fetcher and the file sink.

use async_trait::async_trait;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod sink;

#[derive(Debug, Error)]
pub enum Endpoint2FileError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("filesystem failure at {path}: {source}")]
    Filesystem {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid polling interval: {0}")]
    InvalidInterval(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// One fetched report: the resolved request URL, the HTTP status code and
/// the raw response body. Held only for the duration of one pass iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedReport {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait ReportClient: Send + Sync + 'static {
    /// Fetch the report byte stream for one line identifier.
    ///
    /// The body is returned whatever the response status; callers that
    /// care about non-success statuses can inspect [`FetchedReport::status`].
    async fn fetch_report(&self, line: &str) -> Result<FetchedReport, Endpoint2FileError>;
}
