//! Webhook endpoints.
//!
//! One route per [`EventName`]; each appends the request body to that
//! event's calls and acknowledges with a plain `updated`.

use axum::http::StatusCode;
use hooktester_core::{CallLog, EventName};
use tracing::{debug, info, instrument};

use crate::payload::WebhookPayload;

/// Acknowledgement body for a recorded webhook.
pub const RECORDED_ACK: &str = "updated";

/// Records one webhook call for `event`.
#[instrument(name = "record_call", skip(log, payload), fields(event = %event))]
pub async fn record_call(
    event: EventName,
    log: CallLog,
    WebhookPayload(payload): WebhookPayload,
) -> (StatusCode, &'static str) {
    debug!(payload = %payload, "Webhook payload received");

    let count = log.append(event, payload).await;
    info!(count, "Recorded {event} call");

    (StatusCode::OK, RECORDED_ACK)
}
