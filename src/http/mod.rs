//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (WebServer: bind, serve, drain on shutdown)
//!     → request.rs (set and propagate x-request-id)
//!     → middleware/ (CORS, when enabled)
//!     → route provider (todo endpoints)
//!
//! GET /ws
//!     → websocket.rs (upgrade, echo)
//! ```

pub mod middleware;
pub mod request;
pub mod server;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use server::{ListenerState, ServerError, WebServer};
pub use websocket::{WebSocketEvent, WebSocketServer};
