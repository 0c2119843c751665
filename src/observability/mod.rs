//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (tracing events: console + JSON files)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout, logs/{env}.log, logs/{env}-error.log
//!     → Prometheus scrape endpoint (metricsEnabled)
//! ```

pub mod logging;
pub mod metrics;
