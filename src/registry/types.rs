//! Wire and domain types for the page registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device profile an audit is run for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    /// Query-string form of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(format!("unknown strategy `{other}` (expected mobile or desktop)")),
        }
    }
}

/// A monitored page as known to the client.
///
/// `id` is assigned by the registry on creation; 0 means "not yet
/// persisted". `score` and `date` always change together: both describe the
/// most recent successful audit for the record's current `strategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub score: f64,
    /// RFC 3339 timestamp of the most recent successful audit.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub strategy: Strategy,
}

/// Creation payload for `POST {base}/pageList`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPage {
    pub name: Option<String>,
    pub url: String,
    pub score: f64,
    pub date: String,
    pub strategy: Strategy,
}

/// Update payload for `PATCH {base}/pageList/{id}`.
///
/// `date` travels with `score` so the persisted record never holds one
/// without the other.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePatch {
    pub score: f64,
    pub date: String,
}
