//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! WebServer::turn_on
//!     → listener.rs (bind 0.0.0.0:PORT)
//!     → axum::serve
//!
//! WebSocket upgrade
//!     → connection.rs (ID + tracker guard for the socket's lifetime)
//! ```

pub mod connection;
pub mod listener;
