//! CRUD client for the remote page registry.
//!
//! Four thin contracts against `{base}/pageList`, identified by `id`.
//! The client never touches roster state; callers decide what a failure
//! means for the in-memory list.

use crate::config::Config;
use crate::registry::types::{NewPage, PageRecord, ScorePatch};
use std::time::Duration;
use thiserror::Error;

/// Failures of a registry CRUD call.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("page {0} not found in registry")]
    NotFound(i64),

    #[error("registry returned HTTP {status}")]
    Http { status: u16 },

    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the page registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    endpoint: String,
    client: reqwest::Client,
}

impl RegistryClient {
    /// Create a client from the shared config.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            endpoint: format!("{}/pageList", config.api_base),
            client,
        }
    }

    /// Persist a new page. The registry assigns the id.
    pub async fn create(&self, page: &NewPage) -> Result<PageRecord, RegistryError> {
        let resp = self.client.post(&self.endpoint).json(page).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<PageRecord>().await?)
    }

    /// Fetch all persisted pages, in registry order.
    pub async fn list_all(&self) -> Result<Vec<PageRecord>, RegistryError> {
        let resp = self.client.get(&self.endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<Vec<PageRecord>>().await?)
    }

    /// Update the score (and its date) of an existing page.
    pub async fn patch(&self, id: i64, patch: &ScorePatch) -> Result<(), RegistryError> {
        let url = format!("{}/{id}", self.endpoint);
        let resp = self.client.patch(&url).json(patch).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(id));
        }
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    /// Delete a page. Deleting an already-deleted id is a typed miss,
    /// not a crash.
    pub async fn remove(&self, id: i64) -> Result<(), RegistryError> {
        let url = format!("{}/{id}", self.endpoint);
        let resp = self.client.delete(&url).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(id));
        }
        if !status.is_success() {
            return Err(RegistryError::Http {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_shape() {
        let client = RegistryClient::new(&Config::new("http://localhost:4000/"));
        assert_eq!(client.endpoint, "http://localhost:4000/pageList");
    }
}
