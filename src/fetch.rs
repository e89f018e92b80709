use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::{validate_envelope, ReportEnvelope};
use crate::error::FetchError;

/// Total request timeout applied to every fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of a raw response body ends up in diagnostic logs.
const BODY_LOG_LIMIT: usize = 300;

/// HTTP client for the upstream report API.
///
/// Holds one connection pool configured at construction (base URL, bounded
/// total timeout). One fetch is one attempt; there are no retries.
pub struct ReportClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReportClient {
    /// Create a client against `base_url` with the given total timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one report and validate it into a [`ReportEnvelope`].
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies are
    /// classified into [`FetchError`] here; the raw body is captured as text
    /// before any decode attempt so failures can be logged with it. The body
    /// of a non-2xx response is logged but never parsed.
    pub async fn fetch_report(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ReportEnvelope, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, ?query, "Fetching report");

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "Report request failed to complete");
            FetchError::Network {
                status: None,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Network {
            status: Some(status.as_u16()),
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            warn!(%url, %status, body = %truncate(&body), "Report request returned error status");
            return Err(FetchError::Network {
                status: Some(status.as_u16()),
                reason: format!("unexpected status {status}"),
            });
        }

        let raw: Value = serde_json::from_str(&body).map_err(|e| {
            warn!(%url, body = %truncate(&body), error = %e, "Report body is not valid JSON");
            FetchError::Decode(e.to_string())
        })?;

        validate_envelope(&raw)
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= BODY_LOG_LIMIT {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_LOG_LIMIT).collect();
        format!("{cut}…")
    }
}
