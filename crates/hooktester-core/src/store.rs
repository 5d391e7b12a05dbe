//! In-memory call log.
//!
//! Records every webhook payload under the event it arrived on, in arrival
//! order. A [`CallLog`] is a cheap handle: clones share the same underlying
//! map, so one instance is created at startup (or per test) and handed to
//! each request handler through router state.
//!
//! A single lock guards the whole map. Every operation takes it once and
//! performs one synchronous mutation or read, so concurrent handlers observe
//! a total order of appends and clears.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::EventName;

/// Shared handle to the recorded webhook calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<RwLock<BTreeMap<EventName, Vec<Value>>>>,
}

/// Point-in-time copy of the call log.
///
/// Serializes as a JSON object keyed by event name. Events that never
/// received a call are absent rather than mapped to an empty array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallSnapshot(BTreeMap<EventName, Vec<Value>>);

impl CallLog {
    /// Creates an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `payload` to the calls recorded for `event`.
    ///
    /// The sequence for `event` is created empty on first use. Returns the
    /// number of calls now recorded for that event.
    pub async fn append(&self, event: EventName, payload: Value) -> usize {
        let mut calls = self.calls.write().await;
        let sequence = calls.entry(event).or_default();
        sequence.push(payload);
        sequence.len()
    }

    /// Removes every recorded call in place.
    ///
    /// Returns how many calls were discarded; clearing an empty log is a
    /// no-op that returns zero.
    pub async fn clear(&self) -> usize {
        let mut calls = self.calls.write().await;
        let discarded = calls.values().map(Vec::len).sum();
        calls.clear();
        discarded
    }

    /// Copies the current state without mutating it.
    pub async fn snapshot(&self) -> CallSnapshot {
        CallSnapshot(self.calls.read().await.clone())
    }

    /// Calls recorded for one event, empty if none arrived since the last
    /// clear.
    pub async fn calls(&self, event: EventName) -> Vec<Value> {
        self.calls.read().await.get(&event).cloned().unwrap_or_default()
    }

    /// Total number of recorded calls across all events.
    pub async fn len(&self) -> usize {
        self.calls.read().await.values().map(Vec::len).sum()
    }

    /// Whether nothing has been recorded since startup or the last clear.
    pub async fn is_empty(&self) -> bool {
        self.calls.read().await.is_empty()
    }
}

impl CallSnapshot {
    /// Payloads recorded for `event`, empty when the event is absent.
    pub fn get(&self, event: EventName) -> &[Value] {
        self.0.get(&event).map(Vec::as_slice).unwrap_or_default()
    }

    /// Events with at least one recorded call.
    pub fn events(&self) -> impl Iterator<Item = EventName> + '_ {
        self.0.keys().copied()
    }

    /// Whether the snapshot holds no events.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn fresh_log_snapshots_as_empty_object() {
        let log = CallLog::new();

        assert!(log.is_empty().await);
        assert_eq!(serde_json::to_value(log.snapshot().await).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn append_preserves_arrival_order() {
        let log = CallLog::new();

        assert_eq!(log.append(EventName::IncidentAdded, json!({"id": 1})).await, 1);
        assert_eq!(log.append(EventName::IncidentAdded, json!({"id": 2})).await, 2);

        assert_eq!(log.calls(EventName::IncidentAdded).await, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[tokio::test]
    async fn absent_event_reads_as_empty() {
        let log = CallLog::new();
        log.append(EventName::IncidentAdded, json!({"id": 1})).await;

        assert!(log.calls(EventName::IncidentAttached).await.is_empty());

        let snapshot = log.snapshot().await;
        assert!(snapshot.get(EventName::IncidentAttached).is_empty());
        assert_eq!(snapshot.events().collect::<Vec<_>>(), vec![EventName::IncidentAdded]);
    }

    #[tokio::test]
    async fn snapshot_matches_wire_format() {
        let log = CallLog::new();
        log.append(EventName::IncidentAdded, json!({"id": 1})).await;
        log.append(EventName::IncidentAdded, json!({"id": 2})).await;
        log.append(EventName::IncidentUpdated, json!({"id": 3})).await;

        let value = serde_json::to_value(log.snapshot().await).unwrap();

        assert_eq!(
            value,
            json!({
                "incidentAdded": [{"id": 1}, {"id": 2}],
                "incidentUpdated": [{"id": 3}],
            })
        );
    }

    #[tokio::test]
    async fn clear_resets_shared_state() {
        let log = CallLog::new();
        let handle = log.clone();
        log.append(EventName::IncidentAdded, json!({"id": 1})).await;
        log.append(EventName::IncidentAttached, json!({"id": 2})).await;

        assert_eq!(handle.clear().await, 2);

        assert!(log.is_empty().await);
        assert_eq!(log.len().await, 0);
        assert_eq!(handle.clear().await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_appends() {
        let log = CallLog::new();
        log.append(EventName::IncidentUpdated, json!("first")).await;

        let snapshot = log.snapshot().await;
        log.append(EventName::IncidentUpdated, json!("second")).await;

        assert_eq!(snapshot.get(EventName::IncidentUpdated), &[json!("first")]);
        assert_eq!(log.len().await, 2);
    }
}
