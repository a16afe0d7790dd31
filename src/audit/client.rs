//! Async client for the performance-audit endpoint, wrapping reqwest.
//!
//! Not a browser — one GET per audit, caching disabled so a fresh report
//! is produced every time. No retries: a failed audit is terminal for
//! that invocation.

use crate::config::Config;
use crate::registry::types::Strategy;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single audit request.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit request timed out")]
    Timeout,

    #[error("audit request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("audit endpoint returned HTTP {status}")]
    Http { status: u16 },

    #[error("audit payload was not valid JSON: {0}")]
    Payload(#[source] reqwest::Error),
}

/// Raw audit payload as returned by the endpoint.
///
/// Every level is optional: the extractor decides which absences are fatal
/// and which degrade to an unavailable metric.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditPayload {
    #[serde(default)]
    pub result: Option<AuditReport>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    #[serde(default)]
    pub lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: Option<Categories>,
    #[serde(default)]
    pub audits: HashMap<String, AuditEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub performance: Option<PerformanceCategory>,
}

/// The performance category. `score` is a ratio in [0, 1].
#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceCategory {
    #[serde(default)]
    pub score: Option<f64>,
}

/// One entry of the `audits` map.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub numeric_value: Option<f64>,
}

/// HTTP client for the audit endpoint.
#[derive(Debug, Clone)]
pub struct PsiClient {
    endpoint: String,
    client: reqwest::Client,
}

impl PsiClient {
    /// Create a client from the shared config.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: format!("{}/pageSpeedInsights", config.api_base),
            client,
        }
    }

    /// Fetch a fresh audit for `(url, strategy)`.
    ///
    /// The URL must already be validated by the caller. No state is
    /// mutated here; the payload (or the typed failure) is the whole
    /// result.
    pub async fn fetch_audit(
        &self,
        url: &str,
        strategy: Strategy,
    ) -> Result<AuditPayload, AuditError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url), ("strategy", strategy.as_str())])
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuditError::Timeout
                } else {
                    AuditError::Network(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuditError::Http {
                status: status.as_u16(),
            });
        }

        resp.json::<AuditPayload>().await.map_err(|e| {
            if e.is_timeout() {
                AuditError::Timeout
            } else {
                AuditError::Payload(e)
            }
        })
    }
}
