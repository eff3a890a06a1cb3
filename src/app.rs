//! Session controller for querydesk.
//!
//! Owns the connected/disconnected state, routes user actions to the
//! database gateway and keeps what the presentation layer shows: the status
//! line, the row-count label and the results table.

use tracing::{error, info, warn};

use crate::config::{parse_port, ConnectionConfig};
use crate::connection::ConnectionManager;
use crate::db::{Connector, DatabaseBackend, DatabaseClient, DriverConnector};
use crate::error::{QueryDeskError, Result};
use crate::query::{ClassificationMode, DisplayTable, ExecutionOutcome, QueryExecutor};

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// The message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    /// Status line for a failed action: `<category>: <message>`.
    pub fn from_error(error: &QueryDeskError) -> Self {
        Self {
            level: StatusLevel::Error,
            text: format!("{}: {}", error.category(), error.message()),
        }
    }
}

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Coordinates the connection manager and the query executor.
///
/// Every method runs to completion before returning; there is no background
/// work and no intermediate "connecting" state.
pub struct SessionController {
    connections: ConnectionManager,
    backend: DatabaseBackend,
    classification: ClassificationMode,
    status: StatusMessage,
    table: Option<DisplayTable>,
    rows_label: String,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(Box::new(DriverConnector))
    }
}

impl SessionController {
    /// Creates a disconnected controller that opens sessions through `connector`.
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connections: ConnectionManager::new(connector),
            backend: DatabaseBackend::default(),
            classification: ClassificationMode::default(),
            status: StatusMessage::info("Not connected"),
            table: None,
            rows_label: String::new(),
        }
    }

    /// Sets the backend used by [`connect_with_form`](Self::connect_with_form).
    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets how submitted SQL is classified.
    pub fn with_classification(mut self, mode: ClassificationMode) -> Self {
        self.classification = mode;
        self
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn classification(&self) -> ClassificationMode {
        self.classification
    }

    pub fn state(&self) -> ConnectionState {
        if self.connections.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connections.is_connected()
    }

    /// The last status message.
    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// The table produced by the last read, if it is still shown.
    pub fn table(&self) -> Option<&DisplayTable> {
        self.table.as_ref()
    }

    /// `N row(s) returned`, `N row(s) affected`, or empty before any query.
    pub fn rows_label(&self) -> &str {
        &self.rows_label
    }

    /// Header text describing the session.
    pub fn connection_label(&self) -> String {
        match self.connections.current_config() {
            None => "Not connected".to_string(),
            Some(config) => {
                let database = config.database.as_deref().unwrap_or_default();
                match config.backend {
                    DatabaseBackend::Sqlite => format!("Connected to {database}"),
                    _ => format!(
                        "Connected to {database} on {}",
                        config.host_or_default()
                    ),
                }
            }
        }
    }

    /// Connects using the raw values of the connection form.
    ///
    /// The port text is validated before anything else happens. SQLite has
    /// no port, so the text is ignored there.
    pub async fn connect_with_form(
        &mut self,
        host: &str,
        port_text: &str,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<()> {
        let port = match self.backend {
            DatabaseBackend::Sqlite => None,
            _ => match parse_port(port_text) {
                Ok(port) => Some(port),
                Err(e) => {
                    warn!("Rejected port value {:?}", port_text);
                    self.status = StatusMessage::from_error(&e);
                    return Err(e);
                }
            },
        };

        let config = ConnectionConfig {
            backend: self.backend,
            host: Some(host.to_string()),
            port,
            database: Some(database.to_string()),
            user: Some(user.to_string()),
            password: Some(password.to_string()),
        };
        self.connect(&config).await
    }

    /// Opens a session, closing any existing one first.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        self.backend = config.backend;
        info!("Connecting to {}", config.display_string());

        match self.connections.connect(config).await {
            Ok(()) => {
                let label = self.connection_label();
                info!(success = true, "{}", label);
                self.status = StatusMessage::success(label);
                Ok(())
            }
            Err(e) => {
                error!("Connection failed: {}", e);
                self.status = StatusMessage::from_error(&e);
                Err(e)
            }
        }
    }

    /// Closes the session. Does nothing when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.connections.is_connected() {
            return Ok(());
        }

        let result = self.connections.disconnect().await;
        match &result {
            Ok(()) => info!(success = true, "Disconnected"),
            Err(e) => warn!("Error while closing connection: {}", e),
        }
        self.status = StatusMessage::info("Disconnected");
        self.rows_label.clear();
        result
    }

    /// Closes any open session before the process exits. Safe to call twice.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.disconnect().await {
            warn!("Error closing connection on shutdown: {}", e);
        }
    }

    /// Classifies and runs one statement.
    ///
    /// A read replaces the table; a write clears it. A failed statement
    /// leaves both the table and the connection untouched.
    pub async fn execute(&mut self, sql: &str) -> Result<ExecutionOutcome> {
        let result = self.run(sql).await;

        match &result {
            Ok(outcome) => {
                let summary = outcome.summary();
                info!(
                    success = true,
                    kind = %outcome.kind(),
                    elapsed_ms = outcome.execution_time().as_millis() as u64,
                    "{}",
                    summary
                );
                self.table = match outcome {
                    ExecutionOutcome::Read { table, .. } => Some(table.clone()),
                    ExecutionOutcome::Write { .. } => None,
                };
                self.status = StatusMessage::success(summary.clone());
                self.rows_label = summary;
            }
            Err(e) => {
                error!("{}: {}", e.category(), e.message());
                self.status = StatusMessage::from_error(e);
            }
        }

        result
    }

    async fn run(&self, sql: &str) -> Result<ExecutionOutcome> {
        let db = self.require_db()?;
        QueryExecutor::new(db, self.classification)
            .execute(sql)
            .await
    }

    /// Opens an explicit transaction on the current session.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        let result = match self.require_db() {
            Ok(db) => db.begin_transaction().await,
            Err(e) => Err(e),
        };
        self.report(result, "Transaction started")
    }

    pub async fn commit(&mut self) -> Result<()> {
        let result = match self.require_db() {
            Ok(db) => db.commit().await,
            Err(e) => Err(e),
        };
        self.report(result, "Transaction committed")
    }

    pub async fn rollback(&mut self) -> Result<()> {
        let result = match self.require_db() {
            Ok(db) => db.rollback().await,
            Err(e) => Err(e),
        };
        self.report(result, "Transaction rolled back")
    }

    fn report(&mut self, result: Result<()>, done: &str) -> Result<()> {
        match &result {
            Ok(()) => {
                info!(success = true, "{}", done);
                self.status = StatusMessage::info(done);
            }
            Err(e) => {
                error!("{}: {}", e.category(), e.message());
                self.status = StatusMessage::from_error(e);
            }
        }
        result
    }

    fn require_db(&self) -> Result<&dyn DatabaseClient> {
        self.connections
            .db()
            .ok_or_else(|| QueryDeskError::validation("Not connected to a database"))
    }
}
