//! Configuration for the webhook recorder.

use std::{net::SocketAddr, path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "hooktester.toml";
const ENV_PREFIX: &str = "HOOKTESTER_";

/// Server configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables prefixed with `HOOKTESTER_` (highest priority)
/// 2. Configuration file (`hooktester.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The defaults reproduce the fixed fixture the incident test suite expects:
/// every interface on port 5000.
///
/// # Example
///
/// ```no_run
/// use hooktester_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Recording webhooks on {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address.
    ///
    /// Environment variable: `HOOKTESTER_HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `HOOKTESTER_PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted webhook body in bytes.
    ///
    /// Environment variable: `HOOKTESTER_BODY_LIMIT_BYTES`
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `HOOKTESTER_REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Log filter used when `RUST_LOG` is unset.
    ///
    /// Environment variable: `HOOKTESTER_RUST_LOG`
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Like [`Config::load`], reading the file layer from `path`. A missing
    /// file contributes nothing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.body_limit_bytes == 0 {
            anyhow::bail!("body_limit_bytes must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            request_timeout: default_request_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    100 * 1024
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
