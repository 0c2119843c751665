//! Structured logging.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber
//! - Console output filtered by `RUST_LOG` or an environment default
//! - JSON log files per environment when `logs_enabled` is set
//!
//! # Design Decisions
//! - Console is silent in the `test` environment
//! - `{env}.log` receives debug and above, `{env}-error.log` errors only

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::AppConfig;

/// Error type for logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Default console directives for `environment` when `RUST_LOG` is unset.
pub fn default_directives(environment: &str) -> &'static str {
    match environment {
        "production" => "error",
        _ => "todo_api=debug,tower_http=debug",
    }
}

/// Path of the combined log file for `environment`.
pub fn log_file(log_dir: &Path, environment: &str) -> PathBuf {
    log_dir.join(format!("{environment}.log"))
}

/// Path of the error-only log file for `environment`.
pub fn error_log_file(log_dir: &Path, environment: &str) -> PathBuf {
    log_dir.join(format!("{environment}-error.log"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(
    config: &AppConfig,
    environment: &str,
    log_dir: &Path,
) -> Result<(), LoggingError> {
    let console = (environment != "test").then(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(environment)));
        fmt::layer().with_target(true).with_filter(filter)
    });

    let (combined, errors) = if config.logs_enabled {
        fs::create_dir_all(log_dir).map_err(|source| LoggingError::File {
            path: log_dir.to_path_buf(),
            source,
        })?;
        let combined = open_append(log_file(log_dir, environment))?;
        let errors = open_append(error_log_file(log_dir, environment))?;
        (
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Mutex::new(combined))
                    .with_filter(LevelFilter::DEBUG),
            ),
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Mutex::new(errors))
                    .with_filter(LevelFilter::ERROR),
            ),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(combined)
        .with(errors)
        .try_init()?;

    if environment != "production" {
        tracing::debug!(environment, "Logging initialized at debug level");
    }
    Ok(())
}

fn open_append(path: PathBuf) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::File { path, source })
}
