//! Connection manager behavior against a fake driver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use todo_api::database::{ConnectionState, DatabaseError};
use todo_api::lifecycle::{shutdown, signals};

mod common;

use common::{database_with, FakeDriver};

#[tokio::test]
async fn connected_only_after_driver_reports() {
    let gate = Arc::new(Notify::new());
    let driver = FakeDriver::gated(Arc::clone(&gate));
    let database = database_with(driver.clone());
    assert!(!database.is_connected());
    assert_eq!(database.state(), ConnectionState::Disconnected);

    let mut states = database.subscribe();
    let connecting = {
        let database = database.clone();
        tokio::spawn(async move { database.establish_connection(None).await })
    };

    states
        .wait_for(|state| *state == ConnectionState::Connecting)
        .await
        .unwrap();
    assert!(!database.is_connected());

    gate.notify_one();
    connecting.await.unwrap().unwrap();

    assert!(database.is_connected());
    assert_eq!(driver.connect_calls(), 1);
    assert!(database.connection().is_some());
}

#[tokio::test]
async fn second_connect_while_in_flight_is_rejected() {
    let gate = Arc::new(Notify::new());
    let driver = FakeDriver::gated(Arc::clone(&gate));
    let database = database_with(driver.clone());

    let mut states = database.subscribe();
    let first = {
        let database = database.clone();
        tokio::spawn(async move { database.establish_connection(None).await })
    };
    states
        .wait_for(|state| *state == ConnectionState::Connecting)
        .await
        .unwrap();

    let err = database.establish_connection(None).await.unwrap_err();
    assert!(matches!(err, DatabaseError::ConnectInFlight));

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(driver.connect_calls(), 1);
}

#[tokio::test]
async fn connecting_twice_reuses_the_connection() {
    let driver = FakeDriver::new();
    let database = database_with(driver.clone());

    database.establish_connection(None).await.unwrap();
    database.establish_connection(None).await.unwrap();

    assert!(database.is_connected());
    assert_eq!(driver.connect_calls(), 1);
}

#[tokio::test]
async fn driver_failure_leaves_manager_erroring() {
    let driver = FakeDriver::failing();
    let database = database_with(driver.clone());

    let err = database.establish_connection(None).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Connect(_)));
    assert_eq!(database.state(), ConnectionState::Erroring);
    assert!(!database.is_connected());
    assert!(database.connection().is_none());
    assert!(!shutdown::global().is_registered(database.id()));
}

#[tokio::test]
async fn close_is_idempotent() {
    let driver = FakeDriver::new();
    let database = database_with(driver.clone());
    database.establish_connection(None).await.unwrap();

    assert!(database.close().await);
    assert!(!database.close().await);

    assert_eq!(database.state(), ConnectionState::Closed);
    assert!(!database.is_connected());
    let connections = driver.connections();
    assert_eq!(connections.len(), 1);
    assert!(connections[0].is_closed());
}

#[tokio::test]
async fn close_without_connection_is_a_no_op() {
    let database = database_with(FakeDriver::new());
    assert!(!database.close().await);
    assert_eq!(database.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn reconnect_after_close_registers_hook_once() {
    let driver = FakeDriver::new();
    let database = database_with(driver.clone());

    database.establish_connection(None).await.unwrap();
    assert!(shutdown::global().is_registered(database.id()));
    assert!(signals::is_installed());

    database.close().await;
    database.establish_connection(None).await.unwrap();

    assert!(database.is_connected());
    assert_eq!(driver.connect_calls(), 2);
    assert!(shutdown::global().is_registered(database.id()));
}

#[tokio::test]
async fn test_environment_targets_local_store() {
    let driver = FakeDriver::new();
    let database = database_with(driver.clone());
    assert_eq!(database.environment(), "test");
    assert_eq!(database.database_uri(), "mongodb://127.0.0.1:27017");

    database.establish_connection(None).await.unwrap();
    assert_eq!(driver.last_uri().as_deref(), Some("mongodb://127.0.0.1:27017"));
    assert_eq!(database.options().db_name.as_deref(), Some("todo_api_testing"));
}

#[tokio::test]
async fn state_transitions_are_published() {
    let database = database_with(FakeDriver::new());
    let mut states = database.subscribe();

    database.establish_connection(None).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(1),
        states.wait_for(|state| *state == ConnectionState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    database.close().await;
    assert_eq!(*states.borrow_and_update(), ConnectionState::Closed);
}

#[tokio::test]
async fn abandoned_connect_still_completes() {
    let gate = Arc::new(Notify::new());
    let driver = FakeDriver::gated(Arc::clone(&gate));
    let database = database_with(driver.clone());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), database.establish_connection(None)).await;
    assert!(abandoned.is_err());
    assert_eq!(database.state(), ConnectionState::Connecting);

    gate.notify_one();
    let mut states = database.subscribe();
    tokio::time::timeout(
        Duration::from_secs(1),
        states.wait_for(|state| *state == ConnectionState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    database.establish_connection(None).await.unwrap();
    assert!(database.is_connected());
    assert_eq!(driver.connect_calls(), 1);
}

#[tokio::test]
async fn abandoned_failing_connect_allows_retry() {
    let gate = Arc::new(Notify::new());
    let driver = FakeDriver::gated_failing(Arc::clone(&gate));
    let database = database_with(driver.clone());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), database.establish_connection(None)).await;
    assert!(abandoned.is_err());

    gate.notify_one();
    let mut states = database.subscribe();
    tokio::time::timeout(
        Duration::from_secs(1),
        states.wait_for(|state| *state == ConnectionState::Erroring),
    )
    .await
    .unwrap()
    .unwrap();

    gate.notify_one();
    let err = database.establish_connection(None).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Connect(_)));
    assert_eq!(driver.connect_calls(), 2);
}
