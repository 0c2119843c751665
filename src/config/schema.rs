//! Configuration schema definitions.
//!
//! Feature toggles are deserialized from TOML with camelCase keys. Listener
//! settings come from the process environment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::ConfigError;

/// Default host label used when `HOST` is unset.
pub const DEFAULT_HOST: &str = "http://localhost";

/// Default listening port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default Prometheus exporter port, bound on every interface.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Feature toggles for one application instance.
///
/// Toggles are independent of each other. The only cross-rule lives in the
/// listener: a WebSocket server can only be bound while `websocket_enabled`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Reserved for response caching. Carried but not acted on.
    pub cache_enabled: bool,

    /// Install the CORS middleware.
    pub cors_enabled: bool,

    /// Connect to the document store during application construction.
    pub database_enabled: bool,

    /// Write JSON log files under `logs/`.
    pub logs_enabled: bool,

    /// Allow a WebSocket server to be bound to the listener.
    pub websocket_enabled: bool,

    /// Install the Prometheus exporter and request metrics.
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            cors_enabled: false,
            database_enabled: true,
            logs_enabled: true,
            websocket_enabled: false,
            metrics_enabled: false,
        }
    }
}

/// Configuration handle shared between components.
///
/// Writers replace the whole snapshot; readers load whatever snapshot is
/// current. Last write wins.
pub type SharedConfig = Arc<ArcSwap<AppConfig>>;

/// Wrap a configuration value into a shareable handle.
pub fn share(config: AppConfig) -> SharedConfig {
    Arc::new(ArcSwap::from_pointee(config))
}

/// Listener settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Host label used in log output (e.g. `http://localhost`).
    pub host: String,

    /// Port to listen on. `0` asks the OS for a free port.
    pub port: u16,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Bind address for the metrics exporter.
    pub metrics_address: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            metrics_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_METRICS_PORT)),
        }
    }
}

impl ServerSettings {
    /// Resolve settings through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => defaults.port,
        };

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                name: "REQUEST_TIMEOUT_SECS",
                value: raw.clone(),
            })?,
            None => defaults.request_timeout_secs,
        };

        let metrics_address = match lookup("METRICS_ADDRESS") {
            Some(raw) => raw.trim().parse::<SocketAddr>().map_err(|_| ConfigError::InvalidVar {
                name: "METRICS_ADDRESS",
                value: raw.clone(),
            })?,
            None => defaults.metrics_address,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            request_timeout_secs,
            metrics_address,
        })
    }

    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(crate::config::loader::env_var)
    }
}
