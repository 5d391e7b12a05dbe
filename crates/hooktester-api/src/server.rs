//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. `x-request-id` assignment (uuid v4) and propagation to the response
//! 2. Request/response logging
//! 3. Timeout enforcement
//! 4. Body size limit
//! 5. Handler execution
//!
//! Paths outside the route table fall through to axum's default 404, and a
//! known path hit with the wrong method gets its default 405.

use std::{future::Future, io, net::SocketAddr};

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use hooktester_core::{CallLog, EventName};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{config::Config, handlers, payload::WebhookPayload};

/// Creates the Axum router with all routes and middleware.
///
/// Sets up:
/// - `POST /incidentAdded`, `POST /incidentUpdated`, `POST /incidentAttached`
/// - `GET /calls` and `DELETE /calls`
/// - Request ids, tracing, timeout and body limit from `config`
/// - The shared call log as router state
///
/// # Example
///
/// ```no_run
/// use hooktester_api::{create_router, Config};
/// use hooktester_core::CallLog;
///
/// let app = create_router(CallLog::new(), &Config::default());
/// // Serve the app...
/// ```
pub fn create_router(log: CallLog, config: &Config) -> Router {
    let mut hook_routes: Router<CallLog> = Router::new();
    for event in EventName::ALL {
        hook_routes = hook_routes.route(
            &event.path(),
            post(move |State(log): State<CallLog>, payload: WebhookPayload| {
                handlers::record_call(event, log, payload)
            }),
        );
    }

    let call_routes = Router::new()
        .route("/calls", get(handlers::list_calls).delete(handlers::clear_calls));

    // Last layer added runs first: the id is set before tracing sees the
    // request and copied onto whatever response comes back.
    Router::new()
        .merge(hook_routes)
        .merge(call_routes)
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(log)
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the configured address and records webhooks into `log` until
/// CTRL+C or SIGTERM arrives.
///
/// # Errors
///
/// Returns an error if:
/// - The configured host and port do not form a socket address
/// - The port is already in use
/// - The network interface is unavailable
pub async fn start_server(log: CallLog, config: &Config) -> Result<()> {
    let addr = config.parse_server_addr()?;
    let app = create_router(log.clone(), config);

    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;

    serve(listener, app, shutdown_signal()).await.context("HTTP server failed")?;

    let discarded = log.len().await;
    if discarded > 0 {
        warn!(discarded, "Recorder stopped with unread calls");
    }
    info!("Recorder stopped");
    Ok(())
}

/// Serves `app` on an already-bound listener until `shutdown` resolves.
///
/// Tests bind port 0 and pass the listener here to learn the actual port.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr: SocketAddr = listener.local_addr()?;
    info!(%local_addr, "Recording webhooks");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

/// Resolves on CTRL+C, or on SIGTERM where the platform has it.
///
/// A signal handler that cannot be installed never fires, so the recorder
/// keeps running instead of stopping straight away.
async fn shutdown_signal() {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                warn!(error = %e, "CTRL+C handler unavailable");
                std::future::pending().await
            },
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            },
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending().await
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    info!(signal = received, "Shutting down, draining in-flight requests");
}
