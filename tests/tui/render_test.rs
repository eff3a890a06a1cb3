//! Rendering tests using ratatui's TestBackend.

use super::common::{render_screen, screen_contains};
use querydesk::app::SessionController;
use querydesk::config::ConnectionConfig;
use querydesk::db::{DatabaseBackend, MockConnector};
use querydesk::tui::{dispatch, Action, App};

#[tokio::test]
async fn test_initial_screen() {
    let app = App::new(&ConnectionConfig::default());
    let session = SessionController::new(Box::new(MockConnector::new()));

    let screen = render_screen(&app, &session, 120, 20);

    assert!(screen_contains(&screen, "Not connected"));
    assert!(screen_contains(&screen, "localhost"));
    assert!(screen_contains(&screen, "3306"));
    assert!(screen_contains(&screen, "No result set"));
}

#[tokio::test]
async fn test_connect_and_run_query() {
    let mut app = App::new(&ConnectionConfig::default());
    let mut session = SessionController::new(Box::new(MockConnector::new()));

    dispatch(Action::Connect, &mut app, &mut session).await;
    app.query.clear();
    for c in "SELECT 1".chars() {
        app.query.insert(c);
    }
    dispatch(Action::Execute, &mut app, &mut session).await;

    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(&screen, "Connected to test on localhost"));
    assert!(screen_contains(&screen, "Results: 1 row(s) returned"));
    assert!(screen_contains(&screen, "Mock result for: SELECT 1"));
}

#[tokio::test]
async fn test_password_is_masked() {
    let config = ConnectionConfig {
        password: Some("hunter2".to_string()),
        ..Default::default()
    };
    let app = App::new(&config);
    let session = SessionController::new(Box::new(MockConnector::new()));

    let screen = render_screen(&app, &session, 120, 20);
    assert!(!screen_contains(&screen, "hunter2"));
    assert!(screen_contains(&screen, "*******"));
}

#[tokio::test]
async fn test_connection_error_on_status_line() {
    let mut app = App::new(&ConnectionConfig::default());
    let mut session =
        SessionController::new(Box::new(MockConnector::new().with_password("secret")));

    dispatch(Action::Connect, &mut app, &mut session).await;

    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(
        &screen,
        "Connection Error: Access denied for user 'root'"
    ));
    assert!(screen_contains(&screen, "Not connected"));
}

#[tokio::test]
async fn test_sqlite_form_labels() {
    let config = ConnectionConfig {
        backend: DatabaseBackend::Sqlite,
        database: Some("app.db".to_string()),
        ..Default::default()
    };
    let app = App::new(&config);
    let session = SessionController::new(Box::new(MockConnector::new()))
        .with_backend(DatabaseBackend::Sqlite);

    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(&screen, "Database file"));
    assert!(screen_contains(&screen, "app.db"));
}

#[tokio::test]
async fn test_transaction_keys_report_on_status_line() {
    let mut app = App::new(&ConnectionConfig::default());
    let mut session = SessionController::new(Box::new(MockConnector::new()));

    dispatch(Action::BeginTransaction, &mut app, &mut session).await;
    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(
        &screen,
        "Input Error: Not connected to a database"
    ));

    dispatch(Action::Connect, &mut app, &mut session).await;
    dispatch(Action::BeginTransaction, &mut app, &mut session).await;
    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(&screen, "Transaction started"));
    assert!(screen_contains(&screen, "^T/^K/^R: begin/commit/rollback"));

    dispatch(Action::Rollback, &mut app, &mut session).await;
    let screen = render_screen(&app, &session, 120, 20);
    assert!(screen_contains(&screen, "Transaction rolled back"));
}
