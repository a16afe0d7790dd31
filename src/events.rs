// Copyright 2026 Beacon Contributors
// SPDX-License-Identifier: Apache-2.0

//! Beacon event bus — typed events from every roster transition.
//!
//! The bus is a `tokio::sync::broadcast` channel carrying [`PageEvent`]
//! values. Any consumer — CLI progress output, tests, log sinks — can
//! subscribe independently. When no subscribers exist, events are silently
//! dropped (zero overhead).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Every event the roster emits. Serialized to JSON for machine consumers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageEvent {
    /// A page passed its first audit and was persisted to the registry.
    PageRegistered { id: i64, url: String, score: f64 },
    /// A per-row refresh started; the row shows its old score until commit.
    RefreshStarted { id: i64, strategy: String },
    /// A refresh committed: score and date changed together.
    RefreshCommitted { id: i64, score: f64, date: String },
    /// A refresh failed; the row was left untouched.
    RefreshFailed { id: i64, error: String },
    /// A page was deleted from the registry and the roster.
    PageRemoved { id: i64 },
    /// The roster finished its one-shot load from the registry.
    RosterLoaded { count: usize },
}

/// Broadcast bus for [`PageEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PageEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Fire-and-forget: errors (no subscribers) are ignored.
    pub fn emit(&self, event: PageEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.emit(PageEvent::PageRemoved { id: 7 });
        match rx.recv().await {
            Ok(PageEvent::PageRemoved { id }) => assert_eq!(id, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::default();
        bus.emit(PageEvent::RosterLoaded { count: 0 });
    }

    #[test]
    fn test_event_json_tag() {
        let json = serde_json::to_value(PageEvent::RefreshCommitted {
            id: 3,
            score: 87.0,
            date: "2026-01-01T00:00:00Z".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "RefreshCommitted");
        assert_eq!(json["id"], 3);
    }
}
