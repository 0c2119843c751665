//! Application composition.
//!
//! # Data Flow
//! ```text
//! ApplicationArgs (config, database, route provider, environment)
//!     → Application::new
//!         1. resolve environment, keep config
//!         2. database connect (databaseEnabled)
//!         3. listener settings (HOST, PORT, METRICS_ADDRESS)
//!         4. CORS (corsEnabled) and request metrics (metricsEnabled)
//!         5. `/ws` upgrade route + route provider as the fallback service,
//!            wrapped in timeout, request-id and trace layers
//!     → WebServer (http/server.rs)
//! ```
//!
//! Logging (logsEnabled) is installed by `lifecycle::startup` before the
//! application is composed.

pub mod application;

pub use application::{root_path, AppError, Application, ApplicationArgs};
