//! Document store connection subsystem.
//!
//! # Data Flow
//! ```text
//! Application construction (database enabled)
//!     → manager.rs (resolve URI + options, state → Connecting)
//!     → driver.rs (MongoDB client, ping)
//!     → state.rs (Connected | Erroring, published on a watch channel)
//!     → lifecycle::shutdown (interrupt hook registered once)
//!
//! SIGTERM / SIGINT
//!     → lifecycle::signals → hook → close → Closed → exit(0)
//! ```
//!
//! # Design Decisions
//! - One manager owns one connection; clones share it
//! - Connect failures are surfaced to the caller, never retried here
//! - Closing twice is a no-op

pub mod driver;
pub mod manager;
pub mod state;

pub use driver::{Connection, Driver, DriverError, MongoDriver};
pub use manager::{Database, DatabaseArgs, DatabaseError, resolve_database_uri};
pub use state::ConnectionState;
