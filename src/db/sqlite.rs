//! SQLite database client implementation.
//!
//! The `database` field names the file to open, or `:memory:` for a private
//! in-memory database. Host, port and credentials are ignored.

use crate::config::ConnectionConfig;
use crate::db::{
    bind_value, closed_error, driver_message, fallback_value, is_null_at, require_result_set,
    DatabaseBackend, DatabaseClient, Row, Value,
};
use crate::error::{QueryDeskError, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::debug;

const MEMORY: &str = ":memory:";

/// SQLite database client holding a single connection.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Mutex<Option<SqliteConnection>>,
}

impl SqliteClient {
    /// Opens the database file named in `config.database`.
    ///
    /// The file must already exist.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;
        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| QueryDeskError::connection(driver_message(&e)))?;
        debug!("Opened SQLite database {}", config.display_string());
        Ok(Self::from_connection(conn))
    }

    /// Opens a fresh in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let config = ConnectionConfig {
            backend: DatabaseBackend::Sqlite,
            database: Some(MEMORY.to_string()),
            ..Default::default()
        };
        Self::connect(&config).await
    }

    /// Wraps an already established connection.
    pub fn from_connection(conn: SqliteConnection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }
}

fn connect_options(config: &ConnectionConfig) -> Result<SqliteConnectOptions> {
    let path = config
        .database
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| QueryDeskError::connection("No SQLite database file given"))?;

    if path == MEMORY {
        return SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| QueryDeskError::connection(driver_message(&e)));
    }

    Ok(SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false))
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn execute_read(&self, sql: &str) -> Result<Vec<Row>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(closed_error)?;
        require_result_set(&mut *conn, sql).await?;

        let rows = conn
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| QueryDeskError::query(driver_message(&e)))?;

        Ok(rows.iter().map(convert_row).collect())
    }

    async fn execute_write(&self, sql: &str) -> Result<u64> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(closed_error)?;

        let result = conn
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| QueryDeskError::query(driver_message(&e)))?;

        Ok(result.rows_affected())
    }

    async fn execute_batch(&self, sql: &str, params: &[Vec<Value>]) -> Result<Vec<u64>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(closed_error)?;

        let mut counts = Vec::with_capacity(params.len());
        for set in params {
            let result = set
                .iter()
                .fold(sqlx::query(sql), |query, value| bind_value(query, value))
                .execute(&mut *conn)
                .await
                .map_err(|e| QueryDeskError::query(driver_message(&e)))?;
            counts.push(result.rows_affected());
        }

        Ok(counts)
    }

    async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close()
                .await
                .map_err(|e| QueryDeskError::connection(driver_message(&e)))?;
        }
        Ok(())
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    let mut out = Row::with_capacity(row.len());
    for column in row.columns() {
        let declared = column.type_info().name().to_uppercase();
        out.insert(column.name(), convert_value(row, column.ordinal(), &declared));
    }
    out
}

/// SQLite values carry a storage class per cell; the declared column type
/// only refines booleans and dates stored as text or integers.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    if is_null_at(row, index) {
        return Value::Null;
    }

    let storage = match row.try_get_raw(index) {
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return fallback_value(row, index),
    };

    let decoded = match (declared, storage.as_str()) {
        ("BOOLEAN", _) => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        ("DATE", "TEXT") => row.try_get::<NaiveDate, _>(index).ok().map(Value::from),
        ("TIME", "TEXT") => row.try_get::<NaiveTime, _>(index).ok().map(Value::from),
        ("DATETIME", "TEXT") => row.try_get::<NaiveDateTime, _>(index).ok().map(Value::from),
        (_, "INTEGER") => row.try_get_unchecked::<i64, _>(index).ok().map(Value::Int),
        (_, "REAL") => row.try_get_unchecked::<f64, _>(index).ok().map(Value::Float),
        (_, "BLOB") => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .ok()
            .map(Value::Bytes),
        _ => row
            .try_get_unchecked::<String, _>(index)
            .ok()
            .map(Value::Text),
    };

    decoded.unwrap_or_else(|| fallback_value(row, index))
}
