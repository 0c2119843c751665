//! The todo resource.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → handlers.rs (extract path/query, map errors to status codes)
//!     → service.rs
//!     → repository.rs (MongoDB collection, or in-memory map)
//! ```

pub mod handlers;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{NewTodo, Todo, TodoUpdate, TodoView};
pub use repository::{InMemoryTodoRepository, MongoTodoRepository, RepositoryError, TodoRepository};
pub use service::TodoService;
