//! Driver seam between the connection manager and the document store.
//!
//! [`MongoDriver`] is the production implementation. Tests plug in their
//! own [`Driver`] to observe connect calls without a running server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, Credential};
use mongodb::Client;
use thiserror::Error;

use crate::config::DatabaseOptions;

/// Name reported to the server in the handshake.
const APP_NAME: &str = "todo-api";

/// Database used when neither the URI nor the options name one.
const FALLBACK_DB_NAME: &str = "todo_api";

/// Error reported by a driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("{0}")]
    Other(String),
}

/// Opens connections to the document store.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Connect to `uri`. Resolves only once the server has acknowledged the
    /// connection.
    async fn connect(
        &self,
        uri: &str,
        options: &DatabaseOptions,
    ) -> Result<Arc<dyn Connection>, DriverError>;
}

/// A live connection handed out by a [`Driver`].
#[async_trait]
pub trait Connection: Send + Sync {
    /// Close the connection and release pooled sockets.
    async fn close(&self) -> Result<(), DriverError>;

    /// The MongoDB database handle, when this connection is backed by one.
    fn document_database(&self) -> Option<mongodb::Database> {
        None
    }
}

/// Driver backed by the official MongoDB client.
#[derive(Debug, Clone)]
pub struct MongoDriver {
    server_selection_timeout: Duration,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self {
            server_selection_timeout: Duration::from_secs(5),
        }
    }

    /// Override how long the client waits for a usable server.
    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for MongoDriver {
    async fn connect(
        &self,
        uri: &str,
        options: &DatabaseOptions,
    ) -> Result<Arc<dyn Connection>, DriverError> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some(APP_NAME.to_string());
        client_options.max_pool_size = Some(options.pool_size);
        client_options.retry_writes = Some(options.retry_writes);
        client_options.server_selection_timeout = Some(self.server_selection_timeout);

        if client_options.default_database.is_none() {
            client_options.default_database = options.db_name.clone();
        }

        if let Some(user) = &options.user {
            let mut credential = Credential::default();
            credential.username = Some(user.clone());
            credential.password = options.pass.clone();
            client_options.credential = Some(credential);
        }

        let client = Client::with_options(client_options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DB_NAME));

        // The client connects lazily; ping so success means a reachable server.
        database.run_command(doc! { "ping": 1 }).await?;

        Ok(Arc::new(MongoConnection { client, database }))
    }
}

/// Connection produced by [`MongoDriver`].
pub struct MongoConnection {
    client: Client,
    database: mongodb::Database,
}

#[async_trait]
impl Connection for MongoConnection {
    async fn close(&self) -> Result<(), DriverError> {
        self.client.clone().shutdown().await;
        Ok(())
    }

    fn document_database(&self) -> Option<mongodb::Database> {
        Some(self.database.clone())
    }
}
