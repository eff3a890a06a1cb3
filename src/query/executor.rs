//! Query execution with read/write classification.
//!
//! Provides isolated query execution that can be tested independently
//! of the session controller.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::db::DatabaseClient;
use crate::error::{QueryDeskError, Result};

use super::{classify, ClassificationMode, DisplayTable, QueryKind};

/// Query executor that classifies SQL and sends it down the matching path.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
    mode: ClassificationMode,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a dyn DatabaseClient, mode: ClassificationMode) -> Self {
        Self { db, mode }
    }

    /// Classifies and executes one statement.
    ///
    /// Blank text is rejected before classification and never reaches the
    /// database.
    pub async fn execute(&self, sql: &str) -> Result<ExecutionOutcome> {
        if sql.trim().is_empty() {
            return Err(QueryDeskError::validation("Query cannot be empty"));
        }

        let kind = classify(sql, self.mode, self.db.backend());
        debug!(%kind, mode = %self.mode, "Classified query");

        let start = Instant::now();
        match kind {
            QueryKind::Read => {
                let rows = self.db.execute_read(sql).await?;
                Ok(ExecutionOutcome::Read {
                    row_count: rows.len(),
                    table: DisplayTable::from_rows(&rows),
                    execution_time: start.elapsed(),
                })
            }
            QueryKind::Write => {
                let rows_affected = self.db.execute_write(sql).await?;
                Ok(ExecutionOutcome::Write {
                    rows_affected,
                    execution_time: start.elapsed(),
                })
            }
        }
    }
}

/// Successful query execution outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Read {
        table: DisplayTable,
        row_count: usize,
        execution_time: Duration,
    },
    Write {
        rows_affected: u64,
        execution_time: Duration,
    },
}

impl ExecutionOutcome {
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::Read { .. } => QueryKind::Read,
            Self::Write { .. } => QueryKind::Write,
        }
    }

    /// How long the statement took.
    pub fn execution_time(&self) -> Duration {
        match self {
            Self::Read { execution_time, .. } | Self::Write { execution_time, .. } => {
                *execution_time
            }
        }
    }

    /// Status line: `N row(s) returned` or `N row(s) affected`.
    pub fn summary(&self) -> String {
        match self {
            Self::Read { row_count, .. } => format!("{row_count} row(s) returned"),
            Self::Write { rows_affected, .. } => format!("{rows_affected} row(s) affected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockCall, MockDatabaseClient, Row, Value};

    #[tokio::test]
    async fn test_execute_read_query() {
        let mock_db = MockDatabaseClient::new();
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Loose);

        let outcome = executor.execute("SELECT * FROM users").await.unwrap();

        match outcome {
            ExecutionOutcome::Read {
                table, row_count, ..
            } => {
                assert_eq!(row_count, 1);
                assert_eq!(table.columns, vec!["result"]);
            }
            _ => panic!("Expected Read outcome"),
        }
    }

    #[tokio::test]
    async fn test_execute_write_query() {
        let mock_db = MockDatabaseClient::new().with_affected_rows(4);
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Loose);

        let outcome = executor
            .execute("UPDATE users SET active = false")
            .await
            .unwrap();

        assert_eq!(outcome.kind(), QueryKind::Write);
        assert_eq!(outcome.summary(), "4 row(s) affected");
        assert_eq!(
            mock_db.call_log().calls(),
            vec![MockCall::Write("UPDATE users SET active = false".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_read_result() {
        let mock_db = MockDatabaseClient::new().with_rows(vec![]);
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Loose);

        let outcome = executor.execute("select * from empty").await.unwrap();
        assert_eq!(outcome.summary(), "0 row(s) returned");
        match outcome {
            ExecutionOutcome::Read { table, .. } => {
                assert!(table.columns.is_empty());
                assert!(table.rows.is_empty());
            }
            _ => panic!("Expected Read outcome"),
        }
    }

    #[tokio::test]
    async fn test_blank_query_never_reaches_database() {
        let mock_db = MockDatabaseClient::new();
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Loose);

        let err = executor.execute("  \n\t ").await.unwrap_err();
        assert_eq!(err, QueryDeskError::validation("Query cannot be empty"));
        assert!(mock_db.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_query_error_propagates() {
        let mock_db = MockDatabaseClient::new().failing("Table 'shop.nope' doesn't exist");
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Loose);

        let err = executor.execute("SELECT * FROM nope").await.unwrap_err();
        assert!(matches!(err, QueryDeskError::Query(_)));
    }

    #[tokio::test]
    async fn test_strict_mode_routes_by_parse() {
        let rows: Vec<Row> = vec![[("n", Value::Int(1))].into_iter().collect()];
        let mock_db = MockDatabaseClient::new().with_rows(rows);
        let executor = QueryExecutor::new(&mock_db, ClassificationMode::Strict);

        let outcome = executor.execute("SHOW TABLES").await.unwrap();
        assert_eq!(outcome.kind(), QueryKind::Read);

        let outcome = executor.execute("update t set showroom=1").await.unwrap();
        assert_eq!(outcome.kind(), QueryKind::Write);
    }
}
