//! The orchestrating controller: register, refresh, remove, load-all.
//!
//! Rows are addressed by their stable registry `id`, never by positional
//! index, so a refresh that completes after the roster changed cannot write
//! into a shifted slot. The lock is released before every network call and
//! re-acquired to commit; a row removed during the suspension causes the
//! late result to be discarded.

use crate::audit::client::{AuditError, PsiClient};
use crate::audit::metrics::{self, ExtractionError, MetricsRecord};
use crate::config::Config;
use crate::events::{EventBus, PageEvent};
use crate::registry::client::{RegistryClient, RegistryError};
use crate::registry::types::{NewPage, PageRecord, ScorePatch, Strategy};
use crate::roster::validate::{self, InvalidUrl};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Per-row state. Global `Loading` holds while any row is `Refreshing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Idle,
    Refreshing,
}

/// Failures of a roster operation. Each maps to exactly one taxonomy seam;
/// every failure leaves the roster and the registry unmutated.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("no page with id {0} in the roster")]
    UnknownPage(i64),

    #[error("page {0} already has a refresh in flight")]
    RefreshInFlight(i64),
}

#[derive(Default)]
struct RosterState {
    /// Display order, separately maintained from the id-keyed map.
    order: Vec<i64>,
    pages: HashMap<i64, PageRecord>,
    refreshing: HashSet<i64>,
    /// Last-known metrics per device profile. Switching strategy never
    /// discards the other profile's result.
    cache: HashMap<Strategy, HashMap<i64, MetricsRecord>>,
    loaded: bool,
}

/// The client-visible page collection and its registry synchronization.
pub struct PageRoster {
    psi: PsiClient,
    registry: RegistryClient,
    events: EventBus,
    state: RwLock<RosterState>,
}

impl PageRoster {
    /// Build a roster with clients derived from the shared config.
    pub fn new(config: &Config) -> Self {
        Self {
            psi: PsiClient::new(config),
            registry: RegistryClient::new(config),
            events: EventBus::default(),
            state: RwLock::new(RosterState::default()),
        }
    }

    /// The event bus this roster emits on. Subscribe before mutating.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// One-shot initial load from the registry.
    ///
    /// The first call appends every persisted record in registry order and
    /// returns the count; later calls are no-ops returning 0, so a double
    /// invocation can never duplicate rows.
    pub async fn load_all(&self) -> Result<usize, RosterError> {
        {
            let state = self.state.read().await;
            if state.loaded {
                return Ok(0);
            }
        }

        let records = self.registry.list_all().await?;

        let mut state = self.state.write().await;
        // Re-check after the suspension: a concurrent first load may have won.
        if state.loaded {
            return Ok(0);
        }

        let mut added = 0usize;
        for record in records {
            let id = record.id;
            if !state.pages.contains_key(&id) {
                state.order.push(id);
                added += 1;
            }
            state.pages.insert(id, record);
        }
        state.loaded = true;
        drop(state);

        info!(count = added, "roster loaded from registry");
        self.events.emit(PageEvent::RosterLoaded { count: added });
        Ok(added)
    }

    /// Register a page: audit it, persist it, append it to the roster.
    ///
    /// On any failure — validation, audit, extraction, registry — the
    /// registration is abandoned with zero state created anywhere.
    /// Registering the same URL twice yields two distinct records.
    pub async fn register(
        &self,
        name: Option<String>,
        raw_url: &str,
        strategy: Strategy,
    ) -> Result<PageRecord, RosterError> {
        let url = validate::normalize_url(raw_url)?;
        debug!(%url, %strategy, "registering page");

        let payload = self.psi.fetch_audit(&url, strategy).await?;
        let metrics = metrics::extract(&payload)?;
        let date = Utc::now().to_rfc3339();

        let created = self
            .registry
            .create(&NewPage {
                name,
                url: url.clone(),
                score: metrics.score,
                date: date.clone(),
                strategy,
            })
            .await?;

        let mut state = self.state.write().await;
        if !state.pages.contains_key(&created.id) {
            state.order.push(created.id);
        }
        state.pages.insert(created.id, created.clone());
        state
            .cache
            .entry(strategy)
            .or_default()
            .insert(created.id, metrics);
        drop(state);

        info!(id = created.id, %url, score = created.score, "page registered");
        self.events.emit(PageEvent::PageRegistered {
            id: created.id,
            url: created.url.clone(),
            score: created.score,
        });
        Ok(created)
    }

    /// Re-audit one row and commit the new score/date atomically.
    ///
    /// The row keeps its old value, marked `Refreshing`, until the registry
    /// patch succeeds; only then are `score`, `date`, and `strategy`
    /// committed together. A second refresh on the same row while one is in
    /// flight is rejected instead of letting the last response win.
    pub async fn refresh(&self, id: i64, strategy: Strategy) -> Result<PageRecord, RosterError> {
        let url = {
            let mut state = self.state.write().await;
            let page = state.pages.get(&id).ok_or(RosterError::UnknownPage(id))?;
            let url = page.url.clone();
            if !state.refreshing.insert(id) {
                return Err(RosterError::RefreshInFlight(id));
            }
            url
        };

        self.events.emit(PageEvent::RefreshStarted {
            id,
            strategy: strategy.to_string(),
        });

        let outcome = self.audit_and_patch(id, &url, strategy).await;

        let mut state = self.state.write().await;
        state.refreshing.remove(&id);

        match outcome {
            Ok((metrics, date)) => {
                let Some(page) = state.pages.get_mut(&id) else {
                    // Removed while the audit was in flight. The patch can
                    // only have succeeded before the registry delete, so
                    // discarding the result leaves both sides consistent.
                    drop(state);
                    warn!(id, "row removed mid-refresh, result discarded");
                    return Err(RosterError::UnknownPage(id));
                };
                page.score = metrics.score;
                page.date = Some(date.clone());
                page.strategy = strategy;
                let updated = page.clone();
                state.cache.entry(strategy).or_default().insert(id, metrics);
                drop(state);

                info!(id, score = updated.score, "refresh committed");
                self.events.emit(PageEvent::RefreshCommitted {
                    id,
                    score: updated.score,
                    date,
                });
                Ok(updated)
            }
            Err(e) => {
                drop(state);
                warn!(id, error = %e, "refresh failed, row untouched");
                self.events.emit(PageEvent::RefreshFailed {
                    id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Network half of a refresh, run without the lock held.
    async fn audit_and_patch(
        &self,
        id: i64,
        url: &str,
        strategy: Strategy,
    ) -> Result<(MetricsRecord, String), RosterError> {
        let payload = self.psi.fetch_audit(url, strategy).await?;
        let metrics = metrics::extract(&payload)?;
        let date = Utc::now().to_rfc3339();
        self.registry
            .patch(
                id,
                &ScorePatch {
                    score: metrics.score,
                    date: date.clone(),
                },
            )
            .await?;
        Ok((metrics, date))
    }

    /// Delete a row from the registry, then from the roster.
    ///
    /// The roster is only mutated after the registry confirms the delete;
    /// a `NotFound` or transport failure leaves the in-memory list intact.
    pub async fn remove(&self, id: i64) -> Result<(), RosterError> {
        {
            let state = self.state.read().await;
            if !state.pages.contains_key(&id) {
                return Err(RosterError::UnknownPage(id));
            }
        }

        self.registry.remove(id).await?;

        let mut state = self.state.write().await;
        state.pages.remove(&id);
        state.order.retain(|p| *p != id);
        for per_strategy in state.cache.values_mut() {
            per_strategy.remove(&id);
        }
        drop(state);

        info!(id, "page removed");
        self.events.emit(PageEvent::PageRemoved { id });
        Ok(())
    }

    /// The roster in display order.
    pub async fn snapshot(&self) -> Vec<PageRecord> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.pages.get(id).cloned())
            .collect()
    }

    /// Per-row state, `None` for unknown ids.
    pub async fn row_state(&self, id: i64) -> Option<RowState> {
        let state = self.state.read().await;
        if !state.pages.contains_key(&id) {
            return None;
        }
        Some(if state.refreshing.contains(&id) {
            RowState::Refreshing
        } else {
            RowState::Idle
        })
    }

    /// Global loading state: true while any row is refreshing.
    pub async fn is_loading(&self) -> bool {
        !self.state.read().await.refreshing.is_empty()
    }

    /// Last-known metrics for a row under the given device profile.
    pub async fn cached_metrics(&self, id: i64, strategy: Strategy) -> Option<MetricsRecord> {
        let state = self.state.read().await;
        state.cache.get(&strategy).and_then(|m| m.get(&id)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.order.is_empty()
    }
}
