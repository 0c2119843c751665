//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{routing::get, Router};
use tokio::sync::Notify;

use todo_api::config::{AppConfig, DatabaseOptions};
use todo_api::database::{Connection, Database, DatabaseArgs, Driver, DriverError};
use todo_api::routing::RouteProvider;

/// Driver that counts connect calls and never touches the network.
#[derive(Default)]
pub struct FakeDriver {
    connects: AtomicUsize,
    fail: bool,
    gate: Option<Arc<Notify>>,
    connections: Mutex<Vec<Arc<FakeConnection>>>,
    last_uri: Mutex<Option<String>>,
}

impl FakeDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every connect attempt fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Connect attempts block until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    /// Connect attempts block until `gate` is notified, then fail.
    pub fn gated_failing(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_uri(&self) -> Option<String> {
        self.last_uri.lock().unwrap().clone()
    }

    /// Connections handed out so far, oldest first.
    pub fn connections(&self) -> Vec<Arc<FakeConnection>> {
        self.connections.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn connect(
        &self,
        uri: &str,
        _options: &DatabaseOptions,
    ) -> Result<Arc<dyn Connection>, DriverError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_uri.lock().unwrap() = Some(uri.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(DriverError::Other("connection refused".into()));
        }

        let connection = Arc::new(FakeConnection::default());
        self.connections.lock().unwrap().push(Arc::clone(&connection));
        Ok(connection)
    }
}

#[derive(Default)]
pub struct FakeConnection {
    closed: AtomicBool,
}

impl FakeConnection {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Database manager in the `test` environment backed by `driver`.
pub fn database_with(driver: Arc<FakeDriver>) -> Database {
    Database::with_args(DatabaseArgs {
        driver: Some(driver),
        environment: Some("test".into()),
        ..Default::default()
    })
}

/// Configuration with every external dependency switched off.
pub fn offline_config() -> AppConfig {
    AppConfig {
        database_enabled: false,
        logs_enabled: false,
        ..AppConfig::default()
    }
}

/// Route provider that counts the requests it handles.
#[derive(Clone, Default)]
pub struct CountingRoutes {
    pub hits: Arc<AtomicUsize>,
}

impl CountingRoutes {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl RouteProvider for CountingRoutes {
    fn init(&self) -> Router {
        let hits = Arc::clone(&self.hits);
        let slow_hits = Arc::clone(&self.hits);
        Router::new()
            .route(
                "/custom",
                get(move || {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "custom"
                    }
                }),
            )
            .route(
                "/slow",
                get(move || {
                    let hits = Arc::clone(&slow_hits);
                    async move {
                        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
                        hits.fetch_add(1, Ordering::SeqCst);
                        "slow"
                    }
                }),
            )
    }
}
