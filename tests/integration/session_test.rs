//! Session controller integration tests.
//!
//! Drives the controller the way the TUI does: form values in, status line
//! and results table out.

use querydesk::app::{ConnectionState, SessionController, StatusLevel};
use querydesk::db::{DatabaseBackend, DriverConnector, MockCall, MockConnector, Value};
use querydesk::error::QueryDeskError;
use querydesk::query::ClassificationMode;

fn sqlite_session() -> SessionController {
    SessionController::new(Box::new(DriverConnector)).with_backend(DatabaseBackend::Sqlite)
}

#[tokio::test]
async fn test_sqlite_session_round_trip() {
    let mut session = sqlite_session();
    session
        .connect_with_form("", "", ":memory:", "", "")
        .await
        .unwrap();
    assert_eq!(session.state(), ConnectionState::Connected);
    assert_eq!(session.connection_label(), "Connected to :memory:");
    assert_eq!(session.status().level, StatusLevel::Success);

    session
        .execute("CREATE TABLE items (id INTEGER, label TEXT)")
        .await
        .unwrap();
    session
        .execute("INSERT INTO items VALUES (1, 'a'), (2, 'b')")
        .await
        .unwrap();
    assert_eq!(session.rows_label(), "2 row(s) affected");
    assert!(session.table().is_none());

    session
        .execute("SELECT COUNT(*) AS n FROM items")
        .await
        .unwrap();
    assert_eq!(session.rows_label(), "1 row(s) returned");
    let table = session.table().unwrap();
    assert_eq!(table.columns, vec!["n".to_string()]);
    assert_eq!(table.rows[0][0], Value::Int(2));

    session.disconnect().await.unwrap();
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.status().text, "Disconnected");
}

#[tokio::test]
async fn test_sql_error_reported_on_status_line() {
    let mut session = sqlite_session();
    session
        .connect_with_form("", "", ":memory:", "", "")
        .await
        .unwrap();
    session.execute("SELECT 1").await.unwrap();

    let err = session.execute("SELEC 1").await.unwrap_err();
    assert!(matches!(err, QueryDeskError::Query(_)));
    assert_eq!(session.status().level, StatusLevel::Error);
    assert!(session.status().text.starts_with("Execution Error: "));

    // The previous table and the connection both survive
    assert!(session.table().is_some());
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_missing_sqlite_file_fails_to_connect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.db");

    let mut session = sqlite_session();
    let err = session
        .connect_with_form("", "", path.to_str().unwrap(), "", "")
        .await
        .unwrap_err();

    assert!(matches!(err, QueryDeskError::Connection(_)));
    assert!(session.status().text.starts_with("Connection Error: "));
    assert_eq!(session.connection_label(), "Not connected");
}

#[tokio::test]
async fn test_wrong_password_then_retry() {
    let connector = MockConnector::new().with_password("secret");
    let log = connector.call_log();
    let mut session = SessionController::new(Box::new(connector));

    let err = session
        .connect_with_form("db.local", "3306", "shop", "app", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err, QueryDeskError::connection("Access denied for user 'app'"));
    assert!(!session.is_connected());

    session
        .connect_with_form("db.local", "3306", "shop", "app", "secret")
        .await
        .unwrap();
    assert_eq!(session.connection_label(), "Connected to shop on db.local");

    session.execute("SELECT 1").await.unwrap();
    session.shutdown().await;

    assert_eq!(
        log.calls(),
        vec![
            MockCall::Connect("shop @ db.local:3306".to_string()),
            MockCall::Connect("shop @ db.local:3306".to_string()),
            MockCall::Read("SELECT 1".to_string()),
            MockCall::Close,
        ]
    );
}

#[tokio::test]
async fn test_bad_port_never_reaches_gateway() {
    let connector = MockConnector::new();
    let log = connector.call_log();
    let mut session = SessionController::new(Box::new(connector));

    let err = session
        .connect_with_form("localhost", "abc", "test", "root", "")
        .await
        .unwrap_err();

    assert!(matches!(err, QueryDeskError::Validation(_)));
    assert!(session.status().text.starts_with("Input Error: "));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_strict_mode_reads_show_statements() {
    let connector = MockConnector::new();
    let log = connector.call_log();
    let mut session =
        SessionController::new(Box::new(connector)).with_classification(ClassificationMode::Strict);
    session
        .connect_with_form("localhost", "3306", "test", "root", "")
        .await
        .unwrap();

    session.execute("SHOW TABLES").await.unwrap();
    session.execute("update t set showroom = 1").await.unwrap();

    let calls = log.calls();
    assert_eq!(calls[1], MockCall::Read("SHOW TABLES".to_string()));
    assert_eq!(calls[2], MockCall::Write("update t set showroom = 1".to_string()));
}
