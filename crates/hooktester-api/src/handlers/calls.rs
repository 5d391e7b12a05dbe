//! Inspection and reset of recorded calls.

use axum::{extract::State, http::StatusCode, Json};
use hooktester_core::{CallLog, CallSnapshot};
use tracing::{debug, info, instrument};

/// Acknowledgement body for a cleared log.
pub const CLEARED_ACK: &str = "Cleared";

/// Returns every recorded call grouped by event name.
///
/// Events without calls are omitted, so a fresh or cleared log renders as
/// `{}`.
#[instrument(name = "list_calls", skip(log))]
pub async fn list_calls(State(log): State<CallLog>) -> Json<CallSnapshot> {
    let snapshot = log.snapshot().await;
    debug!(events = snapshot.events().count(), "Serving call snapshot");

    Json(snapshot)
}

/// Discards every recorded call.
#[instrument(name = "clear_calls", skip(log))]
pub async fn clear_calls(State(log): State<CallLog>) -> (StatusCode, &'static str) {
    let discarded = log.clear().await;
    info!(discarded, "Cleared recorded calls");

    (StatusCode::OK, CLEARED_ACK)
}
