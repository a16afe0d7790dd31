//! Runtime configuration, read from the environment.
//!
//! One base URL serves both external collaborators: the audit endpoint
//! lives at `{base}/pageSpeedInsights` and the page registry at
//! `{base}/pageList`.

/// Default API base when `BEACON_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:4000";

/// Default audit request timeout. Full audits routinely take tens of seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Endpoint and transport settings shared by both HTTP clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the audit and registry endpoints, no trailing slash.
    pub api_base: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Config {
    /// Build a config from `BEACON_API_BASE` / `BEACON_TIMEOUT_MS`,
    /// falling back to the defaults.
    pub fn from_env() -> Self {
        let api_base = std::env::var("BEACON_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout_ms = std::env::var("BEACON_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Self::with_timeout(api_base, timeout_ms)
    }

    /// Config pointing at an explicit base URL with the default timeout.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_timeout(api_base, DEFAULT_TIMEOUT_MS)
    }

    /// Config with an explicit base URL and timeout.
    pub fn with_timeout(api_base: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            timeout_ms,
        }
    }
}
