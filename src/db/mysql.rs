//! MySQL / MariaDB database client implementation.
//!
//! Statements are sent through the text protocol, so anything the server
//! accepts interactively (SHOW, DESCRIBE, USE, DDL) can be run.

use crate::config::ConnectionConfig;
use crate::db::{
    bind_value, closed_error, driver_message, fallback_value, is_null_at, require_result_set,
    DatabaseBackend, DatabaseClient, Row, Value,
};
use crate::error::{QueryDeskError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Executor, Row as SqlxRow, TypeInfo};
use tokio::sync::Mutex;
use tracing::debug;

/// MySQL database client holding a single connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: Mutex<Option<MySqlConnection>>,
}

impl MySqlClient {
    /// Opens a connection using the given parameters.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config);
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| QueryDeskError::connection(driver_message(&e)))?;
        debug!("Connected to MySQL at {}", config.display_string());
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already established connection.
    pub fn from_connection(conn: MySqlConnection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }
}

fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
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

    options
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
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

/// Converts a sqlx MySqlRow to our Row type, keyed by column label.
fn convert_row(row: &MySqlRow) -> Row {
    let mut out = Row::with_capacity(row.len());
    for column in row.columns() {
        let value = convert_value(row, column.ordinal(), column.type_info().name());
        out.insert(column.name(), value);
    }
    out
}

/// Converts a single cell. Anything that does not decode into a closer
/// variant (DECIMAL, zero dates, out-of-range TIME, ...) keeps its text form.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    if is_null_at(row, index) {
        return Value::Null;
    }

    let type_name = type_name.to_uppercase();
    let decoded = match type_name.as_str() {
        "BOOLEAN" => row.try_get::<bool, _>(index).ok().map(Value::Bool),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).ok().map(Value::Int)
        }

        t if t.ends_with("UNSIGNED") => row.try_get::<u64, _>(index).ok().map(Value::from),

        "FLOAT" => row
            .try_get::<f32, _>(index)
            .ok()
            .map(|v| Value::Float(v as f64)),

        "DOUBLE" => row.try_get::<f64, _>(index).ok().map(Value::Float),

        "DATE" => row.try_get::<NaiveDate, _>(index).ok().map(Value::from),

        "TIME" => row.try_get::<NaiveTime, _>(index).ok().map(Value::from),

        "DATETIME" => row.try_get::<NaiveDateTime, _>(index).ok().map(Value::from),

        "TIMESTAMP" => row.try_get::<DateTime<Utc>, _>(index).ok().map(Value::from),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => row.try_get::<Vec<u8>, _>(index).ok().map(Value::Bytes),

        _ => row.try_get::<String, _>(index).ok().map(Value::Text),
    };

    decoded.unwrap_or_else(|| fallback_value(row, index))
}
