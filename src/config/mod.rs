//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → AppConfig (feature toggles)
//!     → shared via Arc<ArcSwap<_>> with the listener
//!
//! process environment (.env + variables)
//!     → schema.rs (ServerSettings: host, port, timeouts)
//!     → database.rs (DatabaseOptions: base profile + environment overlay)
//! ```
//!
//! # Design Decisions
//! - Every context builds its own AppConfig; there is no global default instance
//! - All fields have defaults to allow minimal configs
//! - Environment lookups are injectable so resolution stays testable

pub mod database;
pub mod loader;
pub mod schema;

pub use database::DatabaseOptions;
pub use loader::{ConfigError, load_config, resolve_environment};
pub use schema::{AppConfig, ServerSettings, SharedConfig};
