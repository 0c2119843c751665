//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Logging → Compose application → Bind listener → Wait
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs hooks (newest first) → exit 0
//!
//! Shutdown (shutdown.rs):
//!     Weakly held interrupt hooks, one per database manager or listener
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{HookId, InterruptHook, ShutdownRegistry};
pub use startup::{start, StartOptions, StartupError};
