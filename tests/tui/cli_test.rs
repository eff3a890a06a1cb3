//! Tests for one-shot `--execute` mode.

use super::common::run_querydesk;

#[test]
fn test_execute_select_prints_table() {
    let (code, stdout, _) = run_querydesk(&["--mock-db", "-e", "SELECT 1"]);

    assert_eq!(code, 0, "Expected exit code 0");
    assert!(stdout.contains("│ result"), "Should print the header row");
    assert!(stdout.contains("Mock result for: SELECT 1"));
    assert!(stdout.contains("1 row(s) returned"));
}

#[test]
fn test_execute_select_json() {
    let (code, stdout, _) = run_querydesk(&["--mock-db", "-e", "SELECT 1", "--format", "json"]);

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "result": "Mock result for: SELECT 1" }])
    );
}

#[test]
fn test_execute_write_json() {
    let (code, stdout, _) = run_querydesk(&[
        "--mock-db",
        "-e",
        "DELETE FROM t",
        "--format",
        "json",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.contains(r#""rows_affected":"#));
}

#[test]
fn test_execute_sqlite_memory() {
    let (code, stdout, _) = run_querydesk(&["sqlite::memory:", "-e", "SELECT 40 + 2 AS answer"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("answer"));
    assert!(stdout.contains("42"));
}

#[test]
fn test_execute_sql_error_exits_non_zero() {
    let (code, _, stderr) = run_querydesk(&["sqlite::memory:", "-e", "SELECT * FROM missing"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Execution Error: "));
}

#[test]
fn test_execute_empty_query() {
    let (code, _, stderr) = run_querydesk(&["--mock-db", "-e", "   "]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Input Error: Query cannot be empty"));
}

#[test]
fn test_invalid_format_rejected() {
    let (code, _, stderr) = run_querydesk(&["--mock-db", "-e", "SELECT 1", "--format", "csv"]);

    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid output format"));
}

#[test]
fn test_execute_named_connection_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[query]
classification = "strict"

[connections.scratch]
backend = "sqlite"
database = ":memory:"
"#,
    )
    .unwrap();

    let (code, stdout, _) = run_querydesk(&[
        "--config",
        config_path.to_str().unwrap(),
        "-c",
        "scratch",
        "-e",
        "WITH t AS (SELECT 7 AS n) SELECT n FROM t",
    ]);

    // Strict mode sends the CTE down the read path, so rows come back
    assert_eq!(code, 0);
    assert!(stdout.contains("1 row(s) returned"));
}

#[test]
fn test_unknown_named_connection() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let (code, _, stderr) = run_querydesk(&[
        "--config",
        config_path.to_str().unwrap(),
        "-c",
        "nope",
        "-e",
        "SELECT 1",
    ]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Connection 'nope' not found"));
}
