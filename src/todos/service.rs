//! Todo service: the seam between HTTP handlers and storage.

use std::sync::Arc;

use crate::todos::model::{NewTodo, Todo, TodoUpdate};
use crate::todos::repository::{RepositoryError, TodoRepository};

#[derive(Clone)]
pub struct TodoService {
    repository: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_all_todos(&self) -> Result<Vec<Todo>, RepositoryError> {
        self.repository.find().await
    }

    pub async fn create_new_todo(&self, todo: NewTodo) -> Result<Todo, RepositoryError> {
        self.repository.create(todo).await
    }

    pub async fn update_existing_todo(
        &self,
        id: &str,
        update: TodoUpdate,
    ) -> Result<bool, RepositoryError> {
        self.repository.update(id, update).await
    }

    pub async fn find_one_todo(&self, id: &str) -> Result<Option<Todo>, RepositoryError> {
        self.repository.find_one(id).await
    }

    pub async fn delete_one_todo(&self, id: &str) -> Result<bool, RepositoryError> {
        self.repository.delete(id).await
    }
}
