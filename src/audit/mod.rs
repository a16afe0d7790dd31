//! Audit acquisition — the external performance-audit API and the
//! normalization of its reports.

pub mod client;
pub mod metrics;

pub use client::{AuditError, AuditPayload, PsiClient};
pub use metrics::{extract, ExtractionError, MetricsRecord};
