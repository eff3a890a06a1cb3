//! Query execution integration tests.
//!
//! Tests classification and execution against a real in-memory SQLite
//! database.

use querydesk::db::{DatabaseClient, SqliteClient, Value};
use querydesk::error::QueryDeskError;
use querydesk::query::{ClassificationMode, ExecutionOutcome, QueryExecutor, QueryKind};

/// Helper to create a client with a small `users` table.
async fn get_test_client() -> SqliteClient {
    let client = SqliteClient::in_memory().await.unwrap();
    client
        .execute_write(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
             INSERT INTO users (id, name, email) VALUES (1, 'Alice', 'alice@test.com');
             INSERT INTO users (id, name, email) VALUES (2, 'Bob', NULL);",
        )
        .await
        .unwrap();
    client
}

fn read_table(outcome: ExecutionOutcome) -> querydesk::query::DisplayTable {
    match outcome {
        ExecutionOutcome::Read { table, .. } => table,
        other => panic!("expected a read outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_simple_select() {
    let client = SqliteClient::in_memory().await.unwrap();
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    let outcome = executor.execute("SELECT 1").await.unwrap();
    assert_eq!(outcome.summary(), "1 row(s) returned");

    let table = read_table(outcome);
    assert_eq!(table.columns, vec!["1".to_string()]);
    assert_eq!(table.rows, vec![vec![Value::Int(1)]]);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_select_from_users() {
    let client = get_test_client().await;
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    let table = read_table(
        executor
            .execute("SELECT id, name, email FROM users ORDER BY id")
            .await
            .unwrap(),
    );

    assert_eq!(table.columns, vec!["id", "name", "email"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows[0][1], Value::from("Alice"));
    assert_eq!(table.rows[1][2], Value::Null);
}

#[tokio::test]
async fn test_write_then_count() {
    let client = get_test_client().await;
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    let outcome = executor
        .execute("INSERT INTO users (id, name) VALUES (3, 'Carol')")
        .await
        .unwrap();
    assert_eq!(outcome.kind(), QueryKind::Write);
    assert_eq!(outcome.summary(), "1 row(s) affected");

    let outcome = executor
        .execute("UPDATE users SET email = 'x@test.com' WHERE email IS NULL")
        .await
        .unwrap();
    assert_eq!(outcome.summary(), "2 row(s) affected");

    let count = client
        .execute_scalar("SELECT COUNT(*) FROM users")
        .await
        .unwrap();
    assert_eq!(count, Some(Value::Int(3)));
}

#[tokio::test]
async fn test_empty_result() {
    let client = get_test_client().await;
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    let outcome = executor
        .execute("SELECT id FROM users WHERE id > 100")
        .await
        .unwrap();
    assert_eq!(outcome.summary(), "0 row(s) returned");
    assert!(read_table(outcome).is_empty());
}

#[tokio::test]
async fn test_query_error_keeps_connection_usable() {
    let client = get_test_client().await;
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    let err = executor.execute("SELECT * FROM missing").await.unwrap_err();
    assert!(matches!(err, QueryDeskError::Query(ref msg) if msg.contains("missing")));

    let outcome = executor.execute("SELECT 1").await.unwrap();
    assert_eq!(outcome.kind(), QueryKind::Read);
}

#[tokio::test]
async fn test_loose_mode_routes_cte_to_write_path() {
    let client = get_test_client().await;
    let sql = "WITH named AS (SELECT name FROM users) SELECT * FROM named";

    let loose = QueryExecutor::new(&client, ClassificationMode::Loose);
    let outcome = loose.execute(sql).await.unwrap();
    assert_eq!(outcome.kind(), QueryKind::Write);

    let strict = QueryExecutor::new(&client, ClassificationMode::Strict);
    let table = read_table(strict.execute(sql).await.unwrap());
    assert_eq!(table.row_count(), 2);
}

#[tokio::test]
async fn test_insert_on_read_path_fails_without_writing() {
    let client = get_test_client().await;
    let executor = QueryExecutor::new(&client, ClassificationMode::Loose);

    // "show" inside the table name sends this insert down the read path
    client
        .execute_write("CREATE TABLE tvshows (title TEXT)")
        .await
        .unwrap();
    let err = executor
        .execute("INSERT INTO tvshows VALUES ('Dark')")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        QueryDeskError::query("Statement does not return a result set")
    );

    let count = client
        .execute_scalar("SELECT COUNT(*) FROM tvshows")
        .await
        .unwrap();
    assert_eq!(count, Some(Value::Int(0)));
}

#[tokio::test]
async fn test_batch_insert_then_count() {
    let client = get_test_client().await;

    let counts = client
        .execute_batch(
            "INSERT INTO users (id, name, email) VALUES (?, ?, ?)",
            &[
                vec![Value::Int(10), Value::from("Dana"), Value::Null],
                vec![Value::Int(11), Value::from("Eve"), Value::from("eve@test.com")],
            ],
        )
        .await
        .unwrap();
    assert_eq!(counts, vec![1, 1]);

    let count = client
        .execute_scalar("SELECT COUNT(*) FROM users")
        .await
        .unwrap();
    assert_eq!(count, Some(Value::Int(4)));
}

#[tokio::test]
async fn test_batch_stops_at_first_failure() {
    let client = get_test_client().await;

    // id 1 already exists
    let err = client
        .execute_batch(
            "INSERT INTO users (id, name) VALUES (?, ?)",
            &[
                vec![Value::Int(20), Value::from("Frank")],
                vec![Value::Int(1), Value::from("Duplicate")],
                vec![Value::Int(21), Value::from("Grace")],
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QueryDeskError::Query(_)));

    let count = client
        .execute_scalar("SELECT COUNT(*) FROM users")
        .await
        .unwrap();
    assert_eq!(count, Some(Value::Int(3)));
}

#[tokio::test]
async fn test_transaction_rollback() {
    let client = get_test_client().await;

    client.begin_transaction().await.unwrap();
    client
        .execute_write("DELETE FROM users")
        .await
        .unwrap();
    client.rollback().await.unwrap();

    let count = client
        .execute_scalar("SELECT COUNT(*) FROM users")
        .await
        .unwrap();
    assert_eq!(count, Some(Value::Int(2)));
}
