//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration from an optional TOML file
//! - Initialize logging, metrics and signal handling
//! - Compose the application and bind the listener
//! - Wait for the listener to close, then release the database
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener starts last (traffic only when composed)
//! - Interrupt hooks run newest first, so the listener closes before the database

use std::path::PathBuf;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::app::{root_path, AppError, Application, ApplicationArgs};
use crate::config::loader::env_var;
use crate::config::{load_config, resolve_environment, AppConfig, ConfigError};
use crate::http::server::{ServerError, WebServer};
use crate::http::websocket::WebSocketServer;
use crate::lifecycle::signals;
use crate::observability::logging::{init_logging, LoggingError};
use crate::observability::metrics::init_metrics;

/// Error type for process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Application(#[from] AppError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("server is not listening")]
    NotListening,
}

/// Options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    /// TOML file with feature toggles. Defaults apply when absent.
    pub config_path: Option<PathBuf>,
    /// Environment label overriding `APP_ENV`.
    pub environment: Option<String>,
}

/// Run the service until the listener closes.
pub async fn start(options: StartOptions) -> Result<(), StartupError> {
    let config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let environment = resolve_environment(options.environment.as_deref(), env_var);

    init_logging(&config, &environment, &root_path().join("logs"))?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %environment,
        config = ?options.config_path,
        "todo-api starting"
    );

    signals::install();

    let app = Application::new(ApplicationArgs {
        config: Some(config.clone()),
        environment: Some(environment),
        ..Default::default()
    })
    .await?;

    if config.metrics_enabled {
        init_metrics(app.settings().metrics_address)?;
    }

    let mut server = WebServer::new(app);
    if config.websocket_enabled {
        server.bind_websocket_server(WebSocketServer::new())?;
        server.set_socket_listening(true);
    }
    server.close_on_interrupt();

    server.turn_on().await;
    if !server.is_listening() {
        server.app().database().close().await;
        return Err(StartupError::NotListening);
    }

    server.closed().await;

    if let Some(socket) = server.websocket_client() {
        socket.close().await;
        server.set_socket_listening(false);
    }
    server.app().database().close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
