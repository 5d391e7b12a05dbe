//! Test infrastructure for the webhook recorder.
//!
//! Wraps a router and its call log so integration tests can issue requests
//! in-process and inspect both the HTTP responses and the recorded state.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use hooktester_api::{create_router, Config};
use hooktester_core::{CallLog, EventName};
use serde_json::Value;
use tower::ServiceExt;

/// In-process application with its own call log.
///
/// Every `TestApp` owns a fresh [`CallLog`], so tests never observe each
/// other's calls.
pub struct TestApp {
    log: CallLog,
    router: Router,
}

/// Buffered response from a [`TestApp`] request.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
}

impl TestApp {
    /// Creates an app with default configuration and an empty call log.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates an app with the given configuration and an empty call log.
    pub fn with_config(config: &Config) -> Self {
        let log = CallLog::new();
        let router = create_router(log.clone(), config);
        Self { log, router }
    }

    /// Shared handle to the call log behind the router.
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Sends an arbitrary request through the router.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response =
            self.router.clone().oneshot(request).await.expect("router should not fail");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");

        TestResponse { status, headers, body }
    }

    /// Sends `method path` with an optional content type and body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        self.request(builder.body(body.into()).expect("valid request")).await
    }

    /// Posts `payload` as JSON to the endpoint for `event`.
    pub async fn post_event(&self, event: EventName, payload: &Value) -> TestResponse {
        self.post_json(&event.path(), payload).await
    }

    /// Posts `payload` as JSON to `path`.
    pub async fn post_json(&self, path: &str, payload: &Value) -> TestResponse {
        self.send(Method::POST, path, Some("application/json"), payload.to_string()).await
    }

    /// Posts a URL-encoded form body to `path`.
    pub async fn post_form(&self, path: &str, form: &str) -> TestResponse {
        self.send(Method::POST, path, Some("application/x-www-form-urlencoded"), form.to_string())
            .await
    }

    /// Fetches `GET /calls`.
    pub async fn get_calls(&self) -> TestResponse {
        self.send(Method::GET, "/calls", None, Body::empty()).await
    }

    /// Fetches `GET /calls` and returns the decoded JSON, asserting success.
    pub async fn calls_json(&self) -> Value {
        let response = self.get_calls().await;
        assert_eq!(response.status, StatusCode::OK, "GET /calls should succeed");
        response.json()
    }

    /// Sends `DELETE /calls`.
    pub async fn delete_calls(&self) -> TestResponse {
        self.send(Method::DELETE, "/calls", None, Body::empty()).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestResponse {
    /// Body decoded as UTF-8 text.
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body should be UTF-8")
    }

    /// Body decoded as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be valid JSON")
    }

    /// Value of a response header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
