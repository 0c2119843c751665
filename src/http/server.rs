//! HTTP listener lifecycle.
//!
//! # Responsibilities
//! - Bind the application's router to `0.0.0.0:PORT`
//! - Track the listener through `Unbound → Listening → Stopped`
//! - Stop accepting and drain in-flight requests on shutdown
//! - Optionally share the port with a [`WebSocketServer`]
//! - Close the listener before the process exits on SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{oneshot, watch};

use crate::app::Application;
use crate::http::websocket::{WebSocketServer, WEBSOCKET_PATH};
use crate::lifecycle::shutdown::{self, HookId, InterruptHook};
use crate::net::listener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The application configuration does not allow WebSocket servers.
    #[error("Unable to bind websocket to existing server")]
    WebsocketDisabled,
}

/// Observable state of the HTTP listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// `turn_on` has not been called yet.
    Unbound,
    /// Accepting connections.
    Listening,
    /// No longer accepting; in-flight requests have drained.
    Stopped,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerState::Unbound => write!(f, "unbound"),
            ListenerState::Listening => write!(f, "listening"),
            ListenerState::Stopped => write!(f, "stopped"),
        }
    }
}

struct RunningServer {
    stop: oneshot::Sender<()>,
    local_addr: SocketAddr,
}

/// Listener control shared with the serve task and the interrupt registry.
struct ServerControl {
    id: HookId,
    running: Mutex<Option<RunningServer>>,
    state: watch::Sender<ListenerState>,
    starting: AtomicBool,
}

impl ServerControl {
    fn running(&self) -> MutexGuard<'_, Option<RunningServer>> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Signal the serve task to stop. Returns `false` if nothing was running.
    fn stop(&self) -> bool {
        match self.running().take() {
            Some(running) => {
                let _ = running.stop.send(());
                true
            }
            None => false,
        }
    }

    async fn wait_stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state != ListenerState::Listening).await;
    }

    /// Claim the right to bind. `None` while another `turn_on` holds it.
    fn claim_start(&self) -> Option<StartClaim<'_>> {
        self.starting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| StartClaim { control: self })
    }
}

/// Held for the duration of one `turn_on`; released on every exit path.
struct StartClaim<'a> {
    control: &'a ServerControl,
}

impl Drop for StartClaim<'_> {
    fn drop(&mut self) {
        self.control.starting.store(false, Ordering::Release);
    }
}

#[async_trait]
impl InterruptHook for ServerControl {
    fn name(&self) -> &'static str {
        "http-listener"
    }

    async fn on_interrupt(&self) {
        if self.stop() {
            self.wait_stopped().await;
        }
    }
}

/// HTTP listener for one [`Application`].
pub struct WebServer {
    app: Application,
    host: String,
    port: u16,
    control: Arc<ServerControl>,
    socket_listening: bool,
}

impl WebServer {
    /// Wrap `app`. Host and port are copied from the application's settings.
    pub fn new(app: Application) -> Self {
        let settings = app.settings();
        let (state, _) = watch::channel(ListenerState::Unbound);
        Self {
            host: settings.host.clone(),
            port: settings.port,
            app,
            control: Arc::new(ServerControl {
                id: HookId::new(),
                running: Mutex::new(None),
                state,
                starting: AtomicBool::new(false),
            }),
            socket_listening: false,
        }
    }

    /// Bind the listener and start serving in the background.
    ///
    /// Bind failures are logged and leave the server in its previous state;
    /// check [`WebServer::is_listening`] afterwards. Calls made while another
    /// `turn_on` is still binding return without binding.
    pub async fn turn_on(&self) {
        let Some(_claim) = self.control.claim_start() else {
            tracing::warn!("Server is already starting");
            return;
        };
        if self.is_listening() {
            tracing::warn!("Server is already listening");
            return;
        }

        let tcp = match listener::bind(listener::bind_address(self.port)).await {
            Ok(tcp) => tcp,
            Err(e) => {
                tracing::error!(error = %e, "Error occurred while turning on server");
                return;
            }
        };
        let local_addr = match tcp.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::error!(error = %e, "Error occurred while turning on server");
                return;
            }
        };

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        *self.control.running() = Some(RunningServer {
            stop: stop_tx,
            local_addr,
        });
        self.control.state.send_replace(ListenerState::Listening);

        tracing::info!(
            "Application is running on {}:{} in {} mode ...",
            self.host,
            local_addr.port(),
            self.app.environment()
        );
        tracing::info!("To shutdown press CTRL+C");

        let service = self
            .app
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();
        let control = Arc::clone(&self.control);

        tokio::spawn(async move {
            let result = axum::serve(tcp, service)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }

            control.running().take();
            control.state.send_replace(ListenerState::Stopped);
            tracing::info!("Application is closing ..");
        });
    }

    /// Stop accepting connections. In-flight requests drain in the
    /// background; await [`WebServer::closed`] to observe completion.
    /// A no-op when the server is not listening.
    pub fn shutdown(&self) {
        let address = self.local_addr();
        if self.control.stop() {
            tracing::info!(address = ?address, "Listener shutting down");
        }
    }

    /// Resolve once the listener is no longer accepting and has drained.
    /// Returns immediately when the server never started or already stopped.
    pub async fn closed(&self) {
        self.control.wait_stopped().await;
    }

    /// Identity used for interrupt hook registration.
    pub fn id(&self) -> HookId {
        self.control.id
    }

    pub fn subscribe(&self) -> watch::Receiver<ListenerState> {
        self.control.state.subscribe()
    }

    pub fn state(&self) -> ListenerState {
        *self.control.state.borrow()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == ListenerState::Listening
    }

    /// Address the listener is bound to while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.control.running().as_ref().map(|running| running.local_addr)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    /// Share the listener's port with `socket`, served on [`WEBSOCKET_PATH`].
    ///
    /// Fails with [`ServerError::WebsocketDisabled`] unless the current
    /// configuration has `websocket_enabled`; on failure the socket
    /// listening flag is cleared.
    pub fn bind_websocket_server(&mut self, socket: WebSocketServer) -> Result<(), ServerError> {
        if !self.app.config().websocket_enabled {
            self.socket_listening = false;
            tracing::error!("Unable to bind websocket to existing server");
            return Err(ServerError::WebsocketDisabled);
        }

        self.app.websocket_slot().store(Some(Arc::new(socket)));
        tracing::info!(path = WEBSOCKET_PATH, "WebSocket server bound");
        Ok(())
    }

    /// The bound WebSocket server, if any.
    pub fn websocket_client(&self) -> Option<WebSocketServer> {
        self.app.websocket_slot().load_full().map(|server| WebSocketServer::clone(&server))
    }

    /// Caller-maintained flag recording whether the WebSocket server is
    /// meant to be listening. Not derived from socket state.
    pub fn is_socket_listening(&self) -> bool {
        self.socket_listening
    }

    pub fn set_socket_listening(&mut self, listening: bool) {
        self.socket_listening = listening;
    }

    /// Register the listener with the process interrupt handler so it is
    /// closed before exit. Repeated calls register once.
    pub fn close_on_interrupt(&self) {
        let hook = self.interrupt_hook();
        if shutdown::global().register(self.control.id, Arc::downgrade(&hook)) {
            tracing::debug!(hook = %self.control.id, "Listener registered for interrupt");
        }
    }

    /// Hook that stops the listener and waits for it to drain.
    pub fn interrupt_hook(&self) -> Arc<dyn InterruptHook> {
        self.control.clone()
    }
}

impl Drop for WebServer {
    fn drop(&mut self) {
        self.control.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_labels() {
        assert_eq!(ListenerState::Unbound.to_string(), "unbound");
        assert_eq!(ListenerState::Listening.to_string(), "listening");
        assert_eq!(ListenerState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn websocket_error_message() {
        assert_eq!(
            ServerError::WebsocketDisabled.to_string(),
            "Unable to bind websocket to existing server"
        );
    }
}
