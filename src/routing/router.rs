//! Default route provider for the todo API.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::routing::RouteProvider;
use crate::todos::handlers;
use crate::todos::{TodoRepository, TodoService};

/// Maps the todo endpoints onto a [`TodoService`].
#[derive(Clone)]
pub struct TodoRouter {
    service: TodoService,
}

impl TodoRouter {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            service: TodoService::new(repository),
        }
    }
}

impl RouteProvider for TodoRouter {
    fn init(&self) -> Router {
        Router::new()
            .route("/", get(handlers::root))
            .route(
                "/api/todos",
                get(handlers::get_list).post(handlers::create_todo),
            )
            .route(
                "/api/todos/{id}",
                get(handlers::find_todo)
                    .put(handlers::update_todo)
                    .delete(handlers::delete_todo),
            )
            .with_state(self.service.clone())
    }
}
