//! Webhook recorder for incident-management integration tests.
//!
//! Main entry point. Loads configuration, installs tracing and serves the
//! recording endpoints until shutdown.

use anyhow::{Context, Result};
use hooktester_api::Config;
use hooktester_core::CallLog;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config)?;

    info!(
        host = %config.host,
        port = config.port,
        body_limit_bytes = config.body_limit_bytes,
        "Configuration loaded"
    );

    let log = CallLog::new();
    hooktester_api::start_server(log, &config).await?;

    info!("hooktester shutdown complete");
    Ok(())
}

/// Initializes tracing from `RUST_LOG`, falling back to the configured
/// filter.
fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .context("Invalid log filter")?;

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
