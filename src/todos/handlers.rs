//! HTTP handlers for the todo resource.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::todos::model::{NewTodo, TodoUpdate, TodoView};
use crate::todos::repository::RepositoryError;
use crate::todos::service::TodoService;

/// Query parameters accepted by create and update.
#[derive(Debug, Default, Deserialize)]
pub struct TodoParams {
    pub task: Option<String>,
    pub completed: Option<bool>,
}

/// Body returned by update and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

/// Error response for todo handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
    Unavailable,
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a storage error; `fallback` builds the variant for driver errors.
    fn from_repository(error: RepositoryError, fallback: fn(String) -> ApiError) -> Self {
        match error {
            RepositoryError::InvalidId(id) => ApiError::BadRequest(format!("Invalid todo id {id}")),
            RepositoryError::Unavailable => ApiError::Unavailable,
            RepositoryError::Mongo(e) => fallback(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m)
            | ApiError::NotFound(m)
            | ApiError::Unprocessable(m)
            | ApiError::Internal(m) => m,
            ApiError::Unavailable => "Database is not available".to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn root() -> Json<&'static str> {
    Json("Hello World!")
}

pub async fn get_list(State(service): State<TodoService>) -> Result<Json<Vec<TodoView>>, ApiError> {
    let todos = service
        .get_all_todos()
        .await
        .map_err(|e| ApiError::from_repository(e, ApiError::Internal))?;

    tracing::info!(count = todos.len(), "GET /api/todos successful call to retrieve all todos");
    Ok(Json(todos.into_iter().map(TodoView::from).collect()))
}

pub async fn find_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<Json<TodoView>, ApiError> {
    let todo = service
        .find_one_todo(&id)
        .await
        .map_err(|e| ApiError::from_repository(e, ApiError::Internal))?;

    match todo {
        Some(todo) => {
            tracing::info!(id = %id, "GET /api/todos/{{id}} successful call to retrieve todo");
            Ok(Json(TodoView::from(todo)))
        }
        None => {
            tracing::warn!(id = %id, "Todo not found");
            Err(ApiError::NotFound(format!("Todo with id {id} does not exist.")))
        }
    }
}

pub async fn create_todo(
    State(service): State<TodoService>,
    Query(params): Query<TodoParams>,
) -> Result<(StatusCode, Json<TodoView>), ApiError> {
    tracing::info!(?params, "POST /api/todos called to create a new todo");

    let created = service
        .create_new_todo(NewTodo {
            task: params.task,
            completed: params.completed.unwrap_or(false),
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create todo");
            ApiError::from_repository(e, ApiError::Unprocessable)
        })?;

    tracing::info!(id = ?created.id, "Todo created successfully");
    Ok((StatusCode::CREATED, Json(TodoView::from(created))))
}

pub async fn update_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    Query(params): Query<TodoParams>,
) -> Result<Json<Outcome>, ApiError> {
    tracing::info!(id = %id, ?params, "PUT /api/todos/{{id}} called");

    let update = TodoUpdate {
        task: params.task,
        completed: params.completed,
    };
    let updated = service.update_existing_todo(&id, update).await.map_err(|e| {
        tracing::error!(id = %id, error = %e, "Failed to update todo");
        ApiError::from_repository(e, ApiError::Unprocessable)
    })?;

    if !updated {
        return Err(ApiError::NotFound(format!("Todo with id {id} does not exist.")));
    }

    tracing::info!(id = %id, "Todo updated");
    Ok(Json(Outcome {
        success: true,
        message: format!("Todo id {id} updated successfully"),
    }))
}

pub async fn delete_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<Json<Outcome>, ApiError> {
    tracing::info!(id = %id, "DELETE /api/todos/{{id}} called");

    let removed = service.delete_one_todo(&id).await.map_err(|e| {
        tracing::error!(id = %id, error = %e, "Failed to delete todo");
        ApiError::from_repository(e, ApiError::Unprocessable)
    })?;

    if !removed {
        return Err(ApiError::NotFound(format!("Todo with id {id} does not exist.")));
    }

    tracing::info!(id = %id, "Todo removed");
    Ok(Json(Outcome {
        success: true,
        message: format!("Todo id {id} removed successfully"),
    }))
}
