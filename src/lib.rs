//! Todo API service.
//!
//! A small CRUD service for todo items built from three lifecycle pieces:
//! a document store connection manager, an application composer and an HTTP
//! listener manager, tied to process signals for orderly shutdown.

// Core subsystems
pub mod app;
pub mod config;
pub mod database;
pub mod http;
pub mod net;
pub mod routing;
pub mod todos;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use app::{Application, ApplicationArgs};
pub use config::AppConfig;
pub use database::Database;
pub use http::WebServer;
