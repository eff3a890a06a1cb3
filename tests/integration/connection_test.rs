//! Connection integration tests.
//!
//! Tests database connectivity and error handling.

use querydesk::config::ConnectionConfig;
use querydesk::connection::ConnectionManager;
use querydesk::db::{DatabaseBackend, DatabaseClient, DriverConnector, MySqlClient, SqliteClient};
use querydesk::error::QueryDeskError;

/// Helper to get the MySQL test URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("MYSQL_TEST_URL").ok()
}

fn sqlite_config(database: &str) -> ConnectionConfig {
    ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        database: Some(database.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_connect_with_valid_credentials() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: MYSQL_TEST_URL not set");
        return;
    };
    let config = ConnectionConfig::from_connection_string(&url).unwrap();

    let client = MySqlClient::connect(&config).await.unwrap();
    client.close().await.unwrap();
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_host() {
    let config = ConnectionConfig {
        backend: DatabaseBackend::MySql,
        host: Some("invalid.host.that.does.not.exist.local".to_string()),
        port: Some(3306),
        database: Some("test".to_string()),
        user: Some("root".to_string()),
        password: Some("secret".to_string()),
    };

    let result = MySqlClient::connect(&config).await;
    assert!(matches!(result, Err(QueryDeskError::Connection(_))));
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_port() {
    let config = ConnectionConfig {
        backend: DatabaseBackend::MySql,
        host: Some("127.0.0.1".to_string()),
        port: Some(59999), // Unlikely to be in use
        database: Some("test".to_string()),
        user: Some("root".to_string()),
        password: None,
    };

    let result = MySqlClient::connect(&config).await;
    assert!(matches!(result, Err(QueryDeskError::Connection(_))));
}

#[tokio::test]
async fn test_sqlite_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    let result = SqliteClient::connect(&sqlite_config(path.to_str().unwrap())).await;
    assert!(matches!(result, Err(QueryDeskError::Connection(_))));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_sqlite_existing_file() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let client = SqliteClient::connect(&sqlite_config(file.path().to_str().unwrap()))
        .await
        .unwrap();
    client
        .execute_write("CREATE TABLE t (id INTEGER)")
        .await
        .unwrap();
    client.close().await.unwrap();

    // Schema persists across connections
    let client = SqliteClient::connect(&sqlite_config(file.path().to_str().unwrap()))
        .await
        .unwrap();
    let rows = client
        .execute_read("SELECT name FROM sqlite_master WHERE type = 'table'")
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_manager_replaces_connection() {
    let mut manager = ConnectionManager::new(Box::new(DriverConnector));
    assert!(!manager.is_connected());

    manager.connect(&sqlite_config(":memory:")).await.unwrap();
    manager
        .db()
        .unwrap()
        .execute_write("CREATE TABLE t (id INTEGER)")
        .await
        .unwrap();

    // A second connect opens a fresh in-memory database
    manager.connect(&sqlite_config(":memory:")).await.unwrap();
    let err = manager
        .db()
        .unwrap()
        .execute_read("SELECT * FROM t")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryDeskError::Query(_)));

    manager.disconnect().await.unwrap();
    manager.disconnect().await.unwrap();
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_use_after_close() {
    let client = SqliteClient::in_memory().await.unwrap();
    client.close().await.unwrap();

    let err = client.execute_read("SELECT 1").await.unwrap_err();
    assert_eq!(err, QueryDeskError::connection("Connection is closed"));
}
