//! Route providers.
//!
//! A route provider hands the application a fully built router. The
//! application attaches it as its sole request handler and never looks at
//! the routes inside.

pub mod router;

pub use router::TodoRouter;

use axum::Router;

/// Source of the application's request-handling surface.
pub trait RouteProvider: Send + Sync {
    /// Build the router. Called once per application.
    fn init(&self) -> Router;
}
