//! Connection manager for the session lifecycle.

use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::db::{Connector, DatabaseClient, DriverConnector};
use crate::error::Result;

/// The live session and the parameters it was opened with.
pub struct ActiveConnection {
    /// Parameters used to connect.
    pub config: ConnectionConfig,
    /// Database client.
    pub db: Box<dyn DatabaseClient>,
}

/// Owns at most one database session.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    active: Option<ActiveConnection>,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(Box::new(DriverConnector))
    }
}

impl ConnectionManager {
    /// Creates a disconnected manager that opens sessions through `connector`.
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            active: None,
        }
    }

    /// Creates a connection manager with an existing connection.
    #[cfg(test)]
    pub(crate) fn with_connection(
        connector: Box<dyn Connector>,
        config: ConnectionConfig,
        db: Box<dyn DatabaseClient>,
    ) -> Self {
        Self {
            connector,
            active: Some(ActiveConnection { config, db }),
        }
    }

    /// Connect to a database using the given configuration.
    ///
    /// Any existing session is closed before the new one is attempted, so a
    /// failed connect always leaves the manager disconnected.
    pub async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        if let Err(e) = self.disconnect().await {
            warn!("Error closing previous connection: {}", e);
        }

        let db = self.connector.connect(config).await?;
        self.active = Some(ActiveConnection {
            config: config.clone(),
            db,
        });

        Ok(())
    }

    /// Get the active database client.
    pub fn db(&self) -> Option<&dyn DatabaseClient> {
        self.active.as_ref().map(|c| c.db.as_ref())
    }

    /// Parameters of the active session.
    pub fn current_config(&self) -> Option<&ConnectionConfig> {
        self.active.as_ref().map(|c| &c.config)
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Close the active connection.
    ///
    /// The manager is disconnected afterwards even if closing reported an
    /// error. Calling this while disconnected does nothing.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(conn) = self.active.take() {
            debug!("Closing connection to {}", conn.config.display_string());
            conn.db.close().await?;
        }
        Ok(())
    }
}
