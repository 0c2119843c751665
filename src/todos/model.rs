//! Todo document and API shapes.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A todo as stored in the `todos` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Todo {
    /// A fresh, unsaved todo stamped with the current time.
    pub fn new(new: NewTodo) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            task: new.task,
            completed: new.completed,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn apply(&mut self, update: &TodoUpdate) {
        if let Some(task) = &update.task {
            self.task = Some(task.clone());
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.updated_at = Some(DateTime::now());
    }
}

/// Fields accepted when creating a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTodo {
    pub task: Option<String>,
    pub completed: bool,
}

/// Fields accepted when updating a todo. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub task: Option<String>,
    pub completed: Option<bool>,
}

/// JSON representation returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: Option<String>,
    pub task: Option<String>,
    pub completed: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.map(|id| id.to_hex()),
            task: todo.task,
            completed: todo.completed,
            created_at: todo.created_at.and_then(|t| t.try_to_rfc3339_string().ok()),
            updated_at: todo.updated_at.and_then(|t| t.try_to_rfc3339_string().ok()),
        }
    }
}
