//! querydesk - a small terminal SQL client.

use querydesk::app::SessionController;
use querydesk::cli::{Cli, OutputFormat};
use querydesk::config::{Config, ConnectionConfig};
use querydesk::db::{Connector, DriverConnector, MockConnector};
use querydesk::error::{QueryDeskError, Result};
use querydesk::logging;
use querydesk::query::ExecutionOutcome;
use querydesk::tui::{self, widgets::table::ResultTable};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Could not load .env file: {e}");
        }
    }

    let cli = Cli::parse_args();
    let one_shot = cli.execute.is_some();

    if one_shot {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        // In one-shot mode the log already goes to stderr
        if !one_shot {
            error!("{}: {}", e.category(), e.message());
        }
        eprintln!("{}: {}", e.category(), e.message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let resolved = cli.resolve_connection(&config)?;
    if resolved.explicit {
        info!("Connection: {}", resolved.config.display_string());
    } else {
        warn!("No database connection configured, using defaults");
    }

    let connector: Box<dyn Connector> = if cli.mock_db {
        info!("Using mock database");
        Box::new(MockConnector::new())
    } else {
        Box::new(DriverConnector)
    };

    let session = SessionController::new(connector)
        .with_backend(resolved.config.backend)
        .with_classification(cli.classification_mode(&config));

    match &cli.execute {
        Some(sql) => execute_once(session, &resolved.config, sql, cli.format).await,
        None => tui::run(&resolved.config, session, resolved.explicit).await,
    }
}

/// Connects, runs one statement, prints the outcome and disconnects.
async fn execute_once(
    mut session: SessionController,
    connection: &ConnectionConfig,
    sql: &str,
    format: OutputFormat,
) -> Result<()> {
    let result = match session.connect(connection).await {
        Ok(()) => session.execute(sql).await,
        Err(e) => Err(e),
    };
    session.shutdown().await;

    let outcome = result?;
    match (&outcome, format) {
        (ExecutionOutcome::Read { table, .. }, OutputFormat::Json) => {
            let json = serde_json::to_string_pretty(&table.to_json())
                .map_err(|e| QueryDeskError::internal(format!("Failed to encode JSON: {e}")))?;
            println!("{json}");
        }
        (ExecutionOutcome::Write { rows_affected, .. }, OutputFormat::Json) => {
            println!("{}", serde_json::json!({ "rows_affected": rows_affected }));
        }
        (ExecutionOutcome::Read { table, .. }, OutputFormat::Table) => {
            // 0 disables scaling
            let width = crossterm::terminal::size()
                .map(|(w, _)| w as usize)
                .unwrap_or(0);
            for line in ResultTable::new(table).to_plain_lines(width) {
                println!("{line}");
            }
            println!("{}", outcome.summary());
        }
        (ExecutionOutcome::Write { .. }, OutputFormat::Table) => {
            println!("{}", outcome.summary());
        }
    }

    Ok(())
}
