//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient`
//! trait over a single sqlx connection. Statements go through the simple
//! query protocol, so every value arrives in its text form.

use crate::config::ConnectionConfig;
use crate::db::{
    bind_value, closed_error, driver_message, fallback_value, is_null_at, require_result_set,
    DatabaseBackend, DatabaseClient, Row, Value,
};
use crate::error::{QueryDeskError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Executor, Row as SqlxRow, TypeInfo};
use tokio::sync::Mutex;
use tracing::debug;

/// PostgreSQL database client holding a single connection.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Mutex<Option<PgConnection>>,
}

impl PostgresClient {
    /// Opens a connection using the given parameters.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut options = PgConnectOptions::new()
            .host(config.host_or_default())
            .port(config.effective_port());

        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        if let Some(database) = config.database.as_deref().filter(|db| !db.trim().is_empty()) {
            options = options.database(database);
        }

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| QueryDeskError::connection(driver_message(&e)))?;
        debug!("Connected to PostgreSQL at {}", config.display_string());
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already established connection.
    ///
    /// This is primarily useful for testing.
    pub fn from_connection(conn: PgConnection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    async fn execute_read(&self, sql: &str) -> Result<Vec<Row>> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(closed_error)?;
        require_result_set(&mut *conn, sql).await?;

        let rows = conn
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| QueryDeskError::query(format_query_error(e)))?;

        Ok(rows.iter().map(convert_row).collect())
    }

    async fn execute_write(&self, sql: &str) -> Result<u64> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(closed_error)?;

        let result = conn
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| QueryDeskError::query(format_query_error(e)))?;

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
                .map_err(|e| QueryDeskError::query(format_query_error(e)))?;
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

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    let mut out = Row::with_capacity(row.len());
    for column in row.columns() {
        let value = convert_value(row, column.ordinal(), column.type_info().name());
        out.insert(column.name(), value);
    }
    out
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    if is_null_at(row, index) {
        return Value::Null;
    }

    let decoded = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row.try_get::<bool, _>(index).ok().map(Value::Bool),

        "INT2" | "SMALLINT" => row
            .try_get::<i16, _>(index)
            .ok()
            .map(|v| Value::Int(v as i64)),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<i32, _>(index)
            .ok()
            .map(|v| Value::Int(v as i64)),

        "INT8" | "BIGINT" => row.try_get::<i64, _>(index).ok().map(Value::Int),

        "FLOAT4" | "REAL" => row
            .try_get::<f32, _>(index)
            .ok()
            .map(|v| Value::Float(v as f64)),

        "FLOAT8" | "DOUBLE PRECISION" => row.try_get::<f64, _>(index).ok().map(Value::Float),

        "BYTEA" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes),

        "DATE" => row.try_get::<NaiveDate, _>(index).ok().map(Value::from),

        "TIME" => row.try_get::<NaiveTime, _>(index).ok().map(Value::from),

        "TIMESTAMP" => row.try_get::<NaiveDateTime, _>(index).ok().map(Value::from),

        "TIMESTAMPTZ" => row.try_get::<DateTime<Utc>, _>(index).ok().map(Value::from),

        // NUMERIC, JSON, UUID, arrays, ... keep their text form
        _ => row.try_get::<String, _>(index).ok().map(Value::Text),
    };

    decoded.unwrap_or_else(|| fallback_value(row, index))
}

/// Formats a query error: the server message first, then any detail and hint.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = db_error.message().to_string();

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
