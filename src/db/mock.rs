//! Mock database client for testing.
//!
//! Provides an in-memory gateway that records every call, so tests can check
//! what reached the database layer (and what never did).

use super::{closed_error, Connector, DatabaseBackend, DatabaseClient, Row, Value};
use crate::config::ConnectionConfig;
use crate::error::{QueryDeskError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A single call observed by the mock gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// A connection was requested for the given display target.
    Connect(String),
    Read(String),
    Write(String),
    /// A batch of the statement with this many parameter sets.
    Batch(String, usize),
    Close,
}

/// Shared, cloneable record of mock calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl CallLog {
    fn push(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    /// Snapshot of every call so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.calls().is_empty()
    }
}

/// A mock database client that returns predefined results.
#[derive(Debug)]
pub struct MockDatabaseClient {
    backend: DatabaseBackend,
    rows: Option<Vec<Row>>,
    affected_rows: u64,
    failure: Option<String>,
    closed: AtomicBool,
    log: CallLog,
}

impl MockDatabaseClient {
    /// Creates a mock that answers reads with a single demo row.
    pub fn new() -> Self {
        Self {
            backend: DatabaseBackend::MySql,
            rows: None,
            affected_rows: 0,
            failure: None,
            closed: AtomicBool::new(false),
            log: CallLog::default(),
        }
    }

    /// Answers every read with the given rows.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Answers every write with the given affected-row count.
    pub fn with_affected_rows(mut self, count: u64) -> Self {
        self.affected_rows = count;
        self
    }

    /// Fails every read and write with a query error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Records calls into an existing log.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// The log this client records into.
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    fn check(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(closed_error());
        }
        match &self.failure {
            Some(message) => Err(QueryDeskError::query(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_row(sql: &str) -> Row {
    let mut row = Row::new();
    row.insert("result", Value::from(format!("Mock result for: {sql}")));
    row
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    async fn execute_read(&self, sql: &str) -> Result<Vec<Row>> {
        self.log.push(MockCall::Read(sql.to_string()));
        self.check()?;
        Ok(self.rows.clone().unwrap_or_else(|| vec![demo_row(sql)]))
    }

    async fn execute_write(&self, sql: &str) -> Result<u64> {
        self.log.push(MockCall::Write(sql.to_string()));
        self.check()?;
        Ok(self.affected_rows)
    }

    async fn execute_batch(&self, sql: &str, params: &[Vec<Value>]) -> Result<Vec<u64>> {
        self.log.push(MockCall::Batch(sql.to_string(), params.len()));
        self.check()?;
        Ok(vec![self.affected_rows; params.len()])
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.log.push(MockCall::Close);
        }
        Ok(())
    }
}

/// Connector that hands out [`MockDatabaseClient`]s sharing one call log.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    password: Option<String>,
    rows: Option<Vec<Row>>,
    affected_rows: u64,
    log: CallLog,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any connection whose password differs from `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Rows every client answers reads with.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Affected-row count every client answers writes with.
    pub fn with_affected_rows(mut self, count: u64) -> Self {
        self.affected_rows = count;
        self
    }

    /// The log shared by this connector and every client it opened.
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
        self.log.push(MockCall::Connect(config.display_string()));

        if let Some(expected) = &self.password {
            if config.password.as_deref() != Some(expected.as_str()) {
                return Err(QueryDeskError::connection(format!(
                    "Access denied for user '{}'",
                    config.user.as_deref().unwrap_or_default()
                )));
            }
        }

        let mut client = MockDatabaseClient::new()
            .with_affected_rows(self.affected_rows)
            .with_log(self.log.clone());
        client.backend = config.backend;
        if let Some(rows) = &self.rows {
            client = client.with_rows(rows.clone());
        }
        Ok(Box::new(client))
    }
}
