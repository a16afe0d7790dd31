//! Normalization of raw audit payloads into a fixed metrics record.
//!
//! Pure functions only — no I/O, no state.

use crate::audit::client::{AuditPayload, LighthouseResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audit keys consumed from the `audits` map.
pub const AUDIT_LCP: &str = "largest-contentful-paint";
pub const AUDIT_FID: &str = "first-input-delay";
pub const AUDIT_CLS: &str = "cumulative-layout-shift";
pub const AUDIT_FCP: &str = "first-contentful-paint";
pub const AUDIT_TBT: &str = "total-blocking-time";
pub const AUDIT_SI: &str = "speed-index";
pub const AUDIT_FCI: &str = "first-cpu-idle";
pub const AUDIT_EIL: &str = "estimated-input-latency";
pub const AUDIT_FMP: &str = "first-meaningful-paint";
pub const AUDIT_TTI: &str = "interactive";

/// A payload missing one of the levels the score is derived from.
///
/// Absent per-metric audit keys are never an error — deprecated metrics
/// (FID, EIL, FCI) are routinely missing from real reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("audit payload missing required field: {0}")]
    MissingField(&'static str),
}

/// Normalized audit output.
///
/// `fcp` (human-readable) and `lcp` (milliseconds) are the two metrics the
/// registry persists alongside the score; the rest are transient display
/// values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Performance score in [0, 100], `round(performance.score × 100)`.
    pub score: f64,
    /// First Contentful Paint, display form (e.g. `"1.2 s"`).
    pub fcp: Option<String>,
    /// Largest Contentful Paint in milliseconds.
    pub lcp: Option<f64>,
    /// Cumulative Layout Shift.
    pub cls: Option<String>,
    /// First Input Delay (deprecated upstream, usually absent).
    pub fid: Option<String>,
    /// Total Blocking Time.
    pub tbt: Option<String>,
    /// Speed Index.
    pub si: Option<String>,
    /// First CPU Idle (deprecated upstream, usually absent).
    pub fci: Option<String>,
    /// Estimated Input Latency (deprecated upstream, usually absent).
    pub eil: Option<String>,
    /// First Meaningful Paint.
    pub fmp: Option<String>,
    /// Time To Interactive.
    pub tti: Option<String>,
}

/// Extract the normalized metrics from a raw payload.
///
/// Fails only when the score itself cannot be derived: `result`,
/// `lighthouseResult`, the performance category, or its `score` is absent.
/// Rounding rule: `f64::round` (half away from zero), clamped to [0, 100].
pub fn extract(payload: &AuditPayload) -> Result<MetricsRecord, ExtractionError> {
    let report = payload
        .result
        .as_ref()
        .ok_or(ExtractionError::MissingField("result"))?;
    let lighthouse = report
        .lighthouse_result
        .as_ref()
        .ok_or(ExtractionError::MissingField("lighthouseResult"))?;
    let performance = lighthouse
        .categories
        .as_ref()
        .and_then(|c| c.performance.as_ref())
        .ok_or(ExtractionError::MissingField("categories.performance"))?;
    let ratio = performance
        .score
        .ok_or(ExtractionError::MissingField("performance.score"))?;

    let score = (ratio * 100.0).round().clamp(0.0, 100.0);

    Ok(MetricsRecord {
        score,
        fcp: display_value(lighthouse, AUDIT_FCP),
        lcp: numeric_value(lighthouse, AUDIT_LCP),
        cls: display_value(lighthouse, AUDIT_CLS),
        fid: display_value(lighthouse, AUDIT_FID),
        tbt: display_value(lighthouse, AUDIT_TBT),
        si: display_value(lighthouse, AUDIT_SI),
        fci: display_value(lighthouse, AUDIT_FCI),
        eil: display_value(lighthouse, AUDIT_EIL),
        fmp: display_value(lighthouse, AUDIT_FMP),
        tti: display_value(lighthouse, AUDIT_TTI),
    })
}

fn display_value(lighthouse: &LighthouseResult, key: &str) -> Option<String> {
    lighthouse
        .audits
        .get(key)
        .and_then(|a| a.display_value.clone())
}

fn numeric_value(lighthouse: &LighthouseResult, key: &str) -> Option<f64> {
    lighthouse.audits.get(key).and_then(|a| a.numeric_value)
}
