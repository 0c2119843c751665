//! Persistence for todos.

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime};
use mongodb::Collection;
use thiserror::Error;

use crate::database::Database;
use crate::todos::model::{NewTodo, Todo, TodoUpdate};

/// Collection holding todo documents.
pub const COLLECTION: &str = "todos";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid todo id: {0}")]
    InvalidId(String),

    #[error("database is not connected")]
    Unavailable,

    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Storage operations behind the todo service.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, todo: NewTodo) -> Result<Todo, RepositoryError>;

    /// Returns `false` when no todo has this id.
    async fn update(&self, id: &str, update: TodoUpdate) -> Result<bool, RepositoryError>;

    async fn find(&self) -> Result<Vec<Todo>, RepositoryError>;

    async fn find_one(&self, id: &str) -> Result<Option<Todo>, RepositoryError>;

    /// Returns `false` when no todo has this id.
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

pub fn parse_id(id: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

/// Repository backed by the `todos` MongoDB collection.
///
/// The collection is looked up per call, so the repository can be built
/// before the connection exists.
pub struct MongoTodoRepository {
    database: Database,
}

impl MongoTodoRepository {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self) -> Result<Collection<Todo>, RepositoryError> {
        self.database
            .connection()
            .and_then(|connection| connection.document_database())
            .map(|db| db.collection::<Todo>(COLLECTION))
            .ok_or(RepositoryError::Unavailable)
    }
}

#[async_trait]
impl TodoRepository for MongoTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo, RepositoryError> {
        let collection = self.collection()?;
        let mut todo = Todo::new(todo);
        let result = collection.insert_one(&todo).await?;
        todo.id = result.inserted_id.as_object_id();
        Ok(todo)
    }

    async fn update(&self, id: &str, update: TodoUpdate) -> Result<bool, RepositoryError> {
        let oid = parse_id(id)?;
        let collection = self.collection()?;

        let mut set = doc! { "updatedAt": DateTime::now() };
        if let Some(task) = update.task {
            set.insert("task", task);
        }
        if let Some(completed) = update.completed {
            set.insert("completed", completed);
        }

        let result = collection
            .update_one(doc! { "_id": oid }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn find(&self) -> Result<Vec<Todo>, RepositoryError> {
        let cursor = self.collection()?.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Todo>, RepositoryError> {
        let oid = parse_id(id)?;
        Ok(self.collection()?.find_one(doc! { "_id": oid }).await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let oid = parse_id(id)?;
        let result = self.collection()?.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Process-local repository used when the database is disabled.
#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: DashMap<ObjectId, Todo>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo, RepositoryError> {
        let id = ObjectId::new();
        let mut todo = Todo::new(todo);
        todo.id = Some(id);
        self.todos.insert(id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &str, update: TodoUpdate) -> Result<bool, RepositoryError> {
        let oid = parse_id(id)?;
        match self.todos.get_mut(&oid) {
            Some(mut todo) => {
                todo.apply(&update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find(&self) -> Result<Vec<Todo>, RepositoryError> {
        let mut todos: Vec<Todo> = self.todos.iter().map(|entry| entry.value().clone()).collect();
        // ObjectIds grow with creation time.
        todos.sort_by_key(|todo| todo.id);
        Ok(todos)
    }

    async fn find_one(&self, id: &str) -> Result<Option<Todo>, RepositoryError> {
        let oid = parse_id(id)?;
        Ok(self.todos.get(&oid).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let oid = parse_id(id)?;
        Ok(self.todos.remove(&oid).is_some())
    }
}
