//! Request middleware installed by the application according to its
//! configuration.

pub mod cors;

pub use cors::cors_middleware;
