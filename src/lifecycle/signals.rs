//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGTERM and SIGINT (Ctrl+C on non-unix targets)
//! - Run the registered interrupt hooks once
//! - Exit the process with status 0
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The listener task is installed at most once per process, no matter how
//!   many components ask for it

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;

use crate::lifecycle::shutdown;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install the process-wide signal listener.
///
/// Returns `true` only for the call that actually installed it. Calls made
/// outside a Tokio runtime install nothing.
pub fn install() -> bool {
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            tracing::warn!("No Tokio runtime available, signal handling not installed");
            return false;
        }
    };

    if INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return false;
    }

    handle.spawn(async {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Termination signal received");

        shutdown::global().run().await;

        tracing::info!("Cleanup finished, exiting");
        std::process::exit(0);
    });

    tracing::debug!("Signal handling installed");
    true
}

/// Whether the process-wide listener has been installed.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

/// Wait for the first termination signal and return its name.
#[cfg(unix)]
pub async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut terminate, mut interrupt) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(terminate), Ok(interrupt)) => (terminate, interrupt),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "Failed to register signal handlers, falling back to Ctrl+C");
                return ctrl_c().await;
            }
        };

    tokio::select! {
        _ = terminate.recv() => "SIGTERM",
        _ = interrupt.recv() => "SIGINT",
    }
}

/// Wait for the first termination signal and return its name.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_requires_runtime() {
        // No runtime on a plain test thread.
        assert!(!install());
    }

    #[tokio::test]
    async fn installs_at_most_once() {
        install();
        assert!(is_installed());
        assert!(!install());
        assert!(!install());
    }
}
