//! WebSocket server attached to the HTTP listener.
//!
//! # Responsibilities
//! - Complete the upgrade handshake on [`WEBSOCKET_PATH`]
//! - Echo text and binary frames back to the sender
//! - Publish connect/disconnect events to subscribers
//! - Close every live socket when the server is closed
//!
//! # Data Flow
//! ```text
//! GET /ws (Upgrade: websocket)
//!     → upgrade_handler (slot empty → 404, server closed → 503)
//!     → WebSocketServer::serve (one task per socket, tracked until drop)
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::{broadcast, watch};

use crate::net::connection::{ConnectionId, ConnectionTracker};

/// Path the WebSocket server answers on.
pub const WEBSOCKET_PATH: &str = "/ws";

const EVENT_CAPACITY: usize = 64;

/// Lifecycle notifications for sockets served by a [`WebSocketServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebSocketEvent {
    Connected(ConnectionId),
    Disconnected(ConnectionId),
}

/// Slot holding the WebSocket server bound to a listener, if any.
pub type WebSocketSlot = Arc<ArcSwapOption<WebSocketServer>>;

/// Echoing WebSocket server. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WebSocketServer {
    inner: Arc<Inner>,
}

struct Inner {
    tracker: ConnectionTracker,
    events: broadcast::Sender<WebSocketEvent>,
    closed: watch::Sender<bool>,
}

enum Step {
    Frame(Option<Result<Message, axum::Error>>),
    Shutdown,
}

impl WebSocketServer {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (closed, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                tracker: ConnectionTracker::new(),
                events,
                closed,
            }),
        }
    }

    pub fn path(&self) -> &'static str {
        WEBSOCKET_PATH
    }

    /// Receive connect/disconnect events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WebSocketEvent> {
        self.inner.events.subscribe()
    }

    /// Number of sockets currently being served.
    pub fn active_connections(&self) -> u64 {
        self.inner.tracker.active_count()
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Stop accepting upgrades, send a close frame to every live socket and
    /// wait for them to finish. Safe to call more than once.
    pub async fn close(&self) {
        let first = self.inner.closed.send_if_modified(|closed| {
            let was_open = !*closed;
            *closed = true;
            was_open
        });
        if first {
            tracing::info!(
                active = self.active_connections(),
                "WebSocket server closing"
            );
        }
        self.inner.tracker.wait_for_idle().await;
    }

    /// Finish an upgrade and serve the socket on its own task.
    pub fn accept(&self, upgrade: WebSocketUpgrade) -> Response {
        let server = self.clone();
        upgrade.on_upgrade(move |socket| server.serve(socket))
    }

    async fn serve(self, mut socket: WebSocket) {
        let guard = self.inner.tracker.track();
        let id = guard.id();
        let mut closed = self.inner.closed.subscribe();

        tracing::debug!(connection_id = %id, "WebSocket client connected");
        let _ = self.inner.events.send(WebSocketEvent::Connected(id));

        loop {
            if *closed.borrow_and_update() {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }

            let step = tokio::select! {
                frame = socket.recv() => Step::Frame(frame),
                _ = closed.changed() => Step::Shutdown,
            };

            match step {
                Step::Frame(Some(Ok(message @ (Message::Text(_) | Message::Binary(_))))) => {
                    if let Err(e) = socket.send(message).await {
                        tracing::debug!(connection_id = %id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Step::Frame(Some(Ok(Message::Close(_)))) | Step::Frame(None) => break,
                // Ping/pong are answered by the protocol layer.
                Step::Frame(Some(Ok(_))) => {}
                Step::Frame(Some(Err(e))) => {
                    tracing::debug!(connection_id = %id, error = %e, "WebSocket receive failed");
                    break;
                }
                Step::Shutdown => continue,
            }
        }

        let _ = self.inner.events.send(WebSocketEvent::Disconnected(id));
        tracing::debug!(connection_id = %id, "WebSocket client disconnected");
        drop(guard);
    }
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebSocketServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketServer")
            .field("active_connections", &self.active_connections())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Upgrade handler mounted on [`WEBSOCKET_PATH`].
pub async fn upgrade_handler(
    State(slot): State<WebSocketSlot>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(server) = slot.load_full() else {
        return (StatusCode::NOT_FOUND, "No WebSocket server bound").into_response();
    };
    if server.is_closed() {
        return (StatusCode::SERVICE_UNAVAILABLE, "WebSocket server closed").into_response();
    }

    match upgrade {
        Ok(upgrade) => server.accept(upgrade),
        Err(rejection) => rejection.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::any;
    use axum::Router;
    use tower::ServiceExt;

    fn router(slot: WebSocketSlot) -> Router {
        Router::new()
            .route(WEBSOCKET_PATH, any(upgrade_handler))
            .with_state(slot)
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let server = WebSocketServer::new();
        assert!(!server.is_closed());

        server.close().await;
        server.close().await;
        assert!(server.is_closed());
        assert_eq!(server.active_connections(), 0);
    }

    #[tokio::test]
    async fn empty_slot_is_not_found() {
        let slot: WebSocketSlot = Arc::new(ArcSwapOption::empty());
        let response = router(slot)
            .oneshot(Request::get(WEBSOCKET_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn closed_server_refuses_upgrades() {
        let server = WebSocketServer::new();
        server.close().await;
        let slot: WebSocketSlot = Arc::new(ArcSwapOption::from_pointee(server));

        let response = router(slot)
            .oneshot(Request::get(WEBSOCKET_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn plain_request_is_rejected() {
        let slot: WebSocketSlot = Arc::new(ArcSwapOption::from_pointee(WebSocketServer::new()));
        let response = router(slot)
            .oneshot(Request::get(WEBSOCKET_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
