//! Database gateway for querydesk.
//!
//! Provides a trait-based interface over a single live connection, allowing
//! different database backends to be used interchangeably. Every call runs
//! exactly one statement with no retry, no timeout and no row limit.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{CallLog, MockCall, MockConnector, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{Row, Temporal, Value};

use crate::config::ConnectionConfig;
use crate::error::{QueryDeskError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::query::Query;
use sqlx::{Database, Encode, Executor, Type, ValueRef};
use tracing::debug;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Postgres,
    Sqlite,
}

/// Environment variable names a backend's command-line tools honour.
#[derive(Debug, Clone, Copy)]
pub struct EnvVars {
    pub host: &'static str,
    pub port: &'static str,
    pub database: &'static str,
    pub user: &'static str,
    pub password: &'static str,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string (also accepts URL schemes).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend. SQLite has none and reports 0.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Postgres => 5432,
            Self::Sqlite => 0,
        }
    }

    /// Returns the environment variables used as connection defaults.
    pub fn env_vars(&self) -> Option<EnvVars> {
        match self {
            Self::MySql => Some(EnvVars {
                host: "MYSQL_HOST",
                port: "MYSQL_TCP_PORT",
                database: "MYSQL_DATABASE",
                user: "MYSQL_USER",
                password: "MYSQL_PWD",
            }),
            Self::Postgres => Some(EnvVars {
                host: "PGHOST",
                port: "PGPORT",
                database: "PGDATABASE",
                user: "PGUSER",
                password: "PGPASSWORD",
            }),
            Self::Sqlite => None,
        }
    }

    /// Statement that opens an explicit transaction.
    pub fn begin_statement(&self) -> &'static str {
        match self {
            Self::MySql => "START TRANSACTION",
            Self::Postgres | Self::Sqlite => "BEGIN",
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens a connection for the given configuration.
///
/// This is the central factory function for database connections. Any
/// failure surfaces as a single `Connection` error carrying the driver message.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    debug!(backend = %config.backend, target = %config.display_string(), "Opening connection");
    match config.backend {
        DatabaseBackend::MySql => Ok(Box::new(MySqlClient::connect(config).await?)),
        DatabaseBackend::Postgres => Ok(Box::new(PostgresClient::connect(config).await?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::connect(config).await?)),
    }
}

/// Trait defining the interface for database clients.
///
/// A client wraps exactly one connection. All operations are async and
/// return Results with QueryDeskError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// The backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Runs a statement expected to produce a result set and buffers every row.
    async fn execute_read(&self, sql: &str) -> Result<Vec<Row>>;

    /// Runs a statement not expected to produce rows; returns rows affected.
    async fn execute_write(&self, sql: &str) -> Result<u64>;

    /// Returns the first column of the first row, or `None` for an empty result.
    async fn execute_scalar(&self, sql: &str) -> Result<Option<Value>> {
        let rows = self.execute_read(sql).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.values().next().cloned()))
    }

    /// Opens an explicit transaction on the held connection.
    async fn begin_transaction(&self) -> Result<()> {
        self.execute_write(self.backend().begin_statement())
            .await
            .map(|_| ())
    }

    /// Commits the current transaction.
    async fn commit(&self) -> Result<()> {
        self.execute_write("COMMIT").await.map(|_| ())
    }

    /// Rolls back the current transaction.
    async fn rollback(&self) -> Result<()> {
        self.execute_write("ROLLBACK").await.map(|_| ())
    }

    /// Runs one parameterized statement once per parameter set.
    ///
    /// Returns the affected-row count of each run, in order. The first
    /// failing set stops the batch; earlier sets stay applied.
    async fn execute_batch(&self, sql: &str, params: &[Vec<Value>]) -> Result<Vec<u64>>;

    /// Closes the connection. Closing an already closed client is a no-op.
    async fn close(&self) -> Result<()>;
}

/// Opens database clients. The seam lets the session layer be driven
/// without a live server.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>>;
}

/// Connector backed by the real sqlx drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DriverConnector;

#[async_trait]
impl Connector for DriverConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
        connect(config).await
    }
}

/// Error returned when a statement is issued on a closed client.
pub(crate) fn closed_error() -> QueryDeskError {
    QueryDeskError::connection("Connection is closed")
}

/// Extracts the driver's own message, without sqlx's wrapping text.
pub(crate) fn driver_message(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

/// Message for a read that produced no result set.
pub(crate) const NO_RESULT_SET: &str = "Statement does not return a result set";

/// Rejects a read whose statement has no result columns, before it runs.
///
/// Text the driver cannot prepare (several statements, some utility
/// commands) is let through; running it reports any real error.
pub(crate) fn require_result_set<'c, E>(
    conn: E,
    sql: &'c str,
) -> impl std::future::Future<Output = Result<()>> + Send + 'c
where
    E: Executor<'c>,
{
    let describe = conn.describe(sql);
    async move {
        match describe.await {
            Ok(describe) if describe.columns().is_empty() => {
                Err(QueryDeskError::query(NO_RESULT_SET))
            }
            Ok(_) => Ok(()),
            Err(e) => {
                debug!("Could not describe statement: {}", e);
                Ok(())
            }
        }
    }
}

/// Binds one `Value` as the next statement parameter.
pub(crate) fn bind_value<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    value: &Value,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    Option<String>: Encode<'q, DB> + Type<DB>,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Vec<u8>: Encode<'q, DB> + Type<DB>,
    NaiveDate: Encode<'q, DB> + Type<DB>,
    NaiveTime: Encode<'q, DB> + Type<DB>,
    NaiveDateTime: Encode<'q, DB> + Type<DB>,
    DateTime<Utc>: Encode<'q, DB> + Type<DB>,
{
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
        Value::Temporal(Temporal::Date(v)) => query.bind(*v),
        Value::Temporal(Temporal::Time(v)) => query.bind(*v),
        Value::Temporal(Temporal::DateTime(v)) => query.bind(*v),
        Value::Temporal(Temporal::Timestamp(v)) => query.bind(*v),
    }
}

/// Returns true when the cell at `index` is SQL NULL.
pub(crate) fn is_null_at<R>(row: &R, index: usize) -> bool
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
{
    row.try_get_raw(index)
        .map(|raw| raw.is_null())
        .unwrap_or(true)
}

/// Decodes a cell that has no closer `Value` variant.
///
/// Tries the textual form first, then raw bytes.
pub(crate) fn fallback_value<'r, R>(row: &'r R, index: usize) -> Value
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
    String: sqlx::Decode<'r, R::Database>,
    Vec<u8>: sqlx::Decode<'r, R::Database>,
{
    if let Ok(text) = row.try_get_unchecked::<String, _>(index) {
        return Value::Text(text);
    }
    row.try_get_unchecked::<Vec<u8>, _>(index)
        .map(Value::Bytes)
        .unwrap_or(Value::Null)
}
