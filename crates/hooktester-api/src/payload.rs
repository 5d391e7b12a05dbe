//! Webhook body extraction.
//!
//! Turns a request body into the structured value stored in the call log.
//! Parsing is driven by `Content-Type`:
//!
//! - `application/json` and `+json` types are parsed as JSON. The top-level
//!   value must be an object or an array, and a zero-length body reads as
//!   `{}`.
//! - `application/x-www-form-urlencoded` becomes an object of strings; a key
//!   repeated in the body maps to an array of its values in order. Decoding
//!   is lenient: a broken percent escape is kept as literal text and invalid
//!   UTF-8 becomes U+FFFD, so a form body is never rejected.
//! - Anything else is left unparsed and recorded as `{}`.

use axum::{
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Structured webhook payload extracted from the request body.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload(pub Value);

/// Reasons a webhook body is rejected before reaching the call log.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body claimed to be JSON but did not parse (E4001).
    #[error("[E4001] Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// JSON body parsed to a scalar instead of an object or array (E4002).
    #[error("[E4002] JSON body must be an object or an array")]
    NotStructured,

    /// Body exceeded the configured size limit (E4004).
    #[error("[E4004] Payload too large")]
    TooLarge,

    /// Body could not be read from the connection (E4005).
    #[error("[E4005] Failed to read request body: {0}")]
    Unreadable(String),
}

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code: `E4001`, `E4002`, `E4004` or `E4005`
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

impl PayloadError {
    /// Stable error code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "E4001",
            Self::NotStructured => "E4002",
            Self::TooLarge => "E4004",
            Self::Unreadable(_) => "E4005",
        }
    }

    /// HTTP status for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PayloadError {
    fn into_response(self) -> Response {
        warn!(code = self.code(), error = %self, "Rejected webhook body");

        let body = ErrorResponse {
            error: ErrorDetail { code: self.code().to_string(), message: self.to_string() },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Body encodings the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Unparsed,
}

impl BodyKind {
    fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return Self::Unparsed;
        };

        let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        if essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json")) {
            Self::Json
        } else if essence == "application/x-www-form-urlencoded" {
            Self::Form
        } else {
            Self::Unparsed
        }
    }
}

impl<S> FromRequest<S> for WebhookPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = BodyKind::from_content_type(
            req.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
        );

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                PayloadError::TooLarge
            } else {
                PayloadError::Unreadable(rejection.body_text())
            }
        })?;

        let payload = match kind {
            BodyKind::Json => parse_json(&body)?,
            BodyKind::Form => parse_form(&body),
            BodyKind::Unparsed => Value::Object(Map::new()),
        };

        Ok(Self(payload))
    }
}

/// Parses a JSON body, accepting only objects and arrays.
pub fn parse_json(body: &[u8]) -> Result<Value, PayloadError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(body)? {
        value @ (Value::Object(_) | Value::Array(_)) => Ok(value),
        _ => Err(PayloadError::NotStructured),
    }
}

/// Parses a form body into an object, folding repeated keys into arrays.
pub fn parse_form(body: &[u8]) -> Value {
    // Pairs of strings always deserialize; malformed escapes decode lossily.
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap_or_default();

    let mut fields = Map::new();
    for (key, value) in pairs {
        match fields.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            },
            None => {
                fields.insert(key, Value::String(value));
            },
        }
    }

    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn content_type_detection() {
        assert_eq!(BodyKind::from_content_type(Some("application/json")), BodyKind::Json);
        assert_eq!(BodyKind::from_content_type(Some("Application/JSON; charset=utf-8")), BodyKind::Json);
        assert_eq!(BodyKind::from_content_type(Some("application/vnd.api+json")), BodyKind::Json);
        assert_eq!(
            BodyKind::from_content_type(Some("application/x-www-form-urlencoded")),
            BodyKind::Form
        );
        assert_eq!(BodyKind::from_content_type(Some("text/plain")), BodyKind::Unparsed);
        assert_eq!(BodyKind::from_content_type(None), BodyKind::Unparsed);
    }

    #[test]
    fn json_objects_and_arrays_are_kept_verbatim() {
        let body = br#"{"incident":"7","nested":{"tags":["a","b"]},"n":null}"#;
        assert_eq!(
            parse_json(body).unwrap(),
            json!({"incident": "7", "nested": {"tags": ["a", "b"]}, "n": null})
        );
        assert_eq!(parse_json(b"[1,2]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn empty_json_body_reads_as_empty_object() {
        assert_eq!(parse_json(b"").unwrap(), json!({}));
    }

    #[test]
    fn whitespace_only_json_body_is_rejected() {
        let err = parse_json(b" \n").unwrap_err();
        assert_eq!(err.code(), "E4001");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn json_scalars_are_rejected() {
        assert!(matches!(parse_json(b"42"), Err(PayloadError::NotStructured)));
        assert!(matches!(parse_json(br#""text""#), Err(PayloadError::NotStructured)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_json(b"{\"id\":").unwrap_err();
        assert_eq!(err.code(), "E4001");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn form_bodies_become_objects() {
        let value = parse_form(b"to=foobar%40email.com&subject=Incident+Created");
        assert_eq!(value, json!({"to": "foobar@email.com", "subject": "Incident Created"}));
    }

    #[test]
    fn repeated_form_keys_fold_into_arrays() {
        let value = parse_form(b"tag=a&tag=b&id=1&tag=c");
        assert_eq!(value, json!({"tag": ["a", "b", "c"], "id": "1"}));
    }

    #[test]
    fn undecodable_form_pairs_are_kept_lossily() {
        let value = parse_form(b"a=%ZZ&b=%FF%FE&c");
        assert_eq!(value, json!({"a": "%ZZ", "b": "\u{FFFD}\u{FFFD}", "c": ""}));
    }

    #[test]
    fn too_large_maps_to_413() {
        assert_eq!(PayloadError::TooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(PayloadError::TooLarge.code(), "E4004");
    }
}
