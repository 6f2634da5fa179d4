//! HTTP fetcher for the report endpoint.
//!
//! This module provides a reqwest-based implementation of the
//! [`ReportClient`](crate::ReportClient) trait.

use crate::{Endpoint2FileError, FetchedReport, ReportClient};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// Client for the report endpoint using reqwest.
///
/// One instance serves every line identifier; the URL, the bearer token and
/// the fixed query parameters are identical across lines apart from the
/// `bane` value.
#[derive(Clone, Debug)]
pub struct ReqwestReportClient {
    node: String,
    endpoint: String,
    token: SecretString,
    client: reqwest::Client,
}

impl ReqwestReportClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `node` - hostname of the node instance (e.g. "ac6f6566.sesam.cloud")
    /// * `endpoint` - endpoint path appended to the node (e.g. "/api/publishers/report-1-endpoint/csv")
    /// * `token` - the JWT sent as the bearer authorization header
    pub fn new(node: impl Into<String>, endpoint: impl Into<String>, token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            node: node.into(),
            endpoint: endpoint.into(),
            token,
            client,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(&config.node, config.endpoint.clone(), config.token.clone())
    }

    /// Request URL: fixed `https://` prefix, node, endpoint path. A node
    /// that already carries a scheme is used as-is so local test servers
    /// can be targeted.
    fn report_url(&self) -> Result<reqwest::Url, Endpoint2FileError> {
        let raw = if self.node.contains("://") {
            format!("{}{}", self.node.trim_end_matches('/'), self.endpoint)
        } else {
            format!("https://{}{}", self.node, self.endpoint)
        };
        reqwest::Url::parse(&raw)
            .map_err(|e| Endpoint2FileError::InvalidRequest(format!("malformed url {raw}: {e}")))
    }

    /// The endpoint expects the lowercase `bearer` scheme.
    fn auth_header(&self) -> Result<HeaderValue, Endpoint2FileError> {
        HeaderValue::from_str(&format!("bearer {}", self.token.expose_secret())).map_err(|_| {
            Endpoint2FileError::InvalidRequest(
                "token contains characters not allowed in an authorization header".into(),
            )
        })
    }
}

#[async_trait]
impl ReportClient for ReqwestReportClient {
    async fn fetch_report(&self, line: &str) -> Result<FetchedReport, Endpoint2FileError> {
        let url = self.report_url()?;
        tracing::debug!(%url, bane = line, segmented = "true", "fetching report");

        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.auth_header()?)
            .query(&[("bane", line), ("segmented", "true")])
            .send()
            .await?;

        let status = resp.status();
        let resolved = resp.url().to_string();
        tracing::info!(url = %resolved, status = status.as_u16(), "report endpoint responded");
        if !status.is_success() {
            // Non-2xx bodies are still handed back and end up on disk.
            tracing::warn!(
                url = %resolved,
                status = status.as_u16(),
                "non-success response, body will be written anyway"
            );
        }

        let body = resp.bytes().await?.to_vec();
        tracing::debug!(bytes = body.len(), "report body received");
        tracing::debug!(body = %String::from_utf8_lossy(&body), "report body");

        Ok(FetchedReport {
            url: resolved,
            status: status.as_u16(),
            body,
        })
    }
}
