//! Terminal User Interface for querydesk.
//!
//! Provides the main TUI application loop using ratatui and crossterm.
//! Every controller call is awaited inline; the header shows a busy
//! indicator while it runs.

pub mod app;
mod events;
pub mod ui;
pub mod widgets;

pub use app::{Action, App};
pub use events::{Event, EventHandler};

use crate::app::SessionController;
use crate::config::ConnectionConfig;
use crate::error::{QueryDeskError, Result};
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::{debug, info};
use widgets::spinner::Spinner;

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| QueryDeskError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )
        .map_err(|e| {
            QueryDeskError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| QueryDeskError::internal(format!("Failed to create terminal: {e}")))
    }

    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| QueryDeskError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )
        .map_err(|e| QueryDeskError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| QueryDeskError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the user quits.
    ///
    /// The session is shut down afterwards, whether the loop ended normally
    /// or with an error.
    pub async fn run(
        &mut self,
        app: &mut App,
        session: &mut SessionController,
        connect_on_start: bool,
    ) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(
                io::stdout(),
                LeaveAlternateScreen,
                DisableMouseCapture,
                DisableBracketedPaste
            );
            original_hook(panic_info);
        }));

        let result = self.run_event_loop(app, session, connect_on_start).await;

        session.shutdown().await;

        let _ = panic::take_hook();

        result
    }

    async fn run_event_loop(
        &mut self,
        app: &mut App,
        session: &mut SessionController,
        connect_on_start: bool,
    ) -> Result<()> {
        if connect_on_start {
            self.perform(Action::Connect, app, session).await?;
        }

        while app.running {
            self.draw(app, session)?;

            match self.event_handler.next()? {
                Event::Key(key) => {
                    if let Some(action) = app.handle_key(key) {
                        self.perform(action, app, session).await?;
                    }
                }
                Event::Paste(text) => app.paste(&text),
                Event::Resize(width, height) => debug!("Terminal resized to {width}x{height}"),
                Event::Tick => {}
            }
        }

        Ok(())
    }

    fn draw(&mut self, app: &App, session: &SessionController) -> Result<()> {
        self.terminal
            .draw(|frame| ui::render(frame, app, session))
            .map(|_| ())
            .map_err(|e| QueryDeskError::internal(format!("Failed to draw: {e}")))
    }

    /// Shows the busy indicator, awaits the controller call, then hides it.
    ///
    /// Controller failures are already on the status line, so only terminal
    /// errors are returned.
    async fn perform(
        &mut self,
        action: Action,
        app: &mut App,
        session: &mut SessionController,
    ) -> Result<()> {
        let spinner = match action {
            Action::Quit => {
                app.running = false;
                return Ok(());
            }
            Action::Connect => Spinner::connecting(),
            Action::Disconnect => Spinner::disconnecting(),
            Action::Execute => Spinner::executing(),
            Action::BeginTransaction | Action::Commit | Action::Rollback => Spinner::transaction(),
        };

        app.start_busy(spinner);
        if let Err(e) = self.draw(app, session) {
            app.stop_busy();
            return Err(e);
        }

        dispatch(action, app, session).await;
        app.stop_busy();
        Ok(())
    }
}

/// Sends one action to the controller.
pub async fn dispatch(action: Action, app: &mut App, session: &mut SessionController) {
    let outcome = match action {
        Action::Connect => {
            session
                .connect_with_form(
                    &app.host.text,
                    &app.port.text,
                    &app.database.text,
                    &app.user.text,
                    &app.password.text,
                )
                .await
        }
        Action::Disconnect => session.disconnect().await,
        Action::Execute => {
            let sql = app.query.text.clone();
            let result = session.execute(&sql).await.map(|_| ());
            if result.is_ok() {
                app.reset_scroll();
            }
            result
        }
        Action::BeginTransaction => session.begin_transaction().await,
        Action::Commit => session.commit().await,
        Action::Rollback => session.rollback().await,
        Action::Quit => {
            app.running = false;
            Ok(())
        }
    };

    if let Err(e) = outcome {
        debug!("{:?} failed: {}", action, e);
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the TUI with the form prefilled from `connection`.
pub async fn run(
    connection: &ConnectionConfig,
    mut session: SessionController,
    connect_on_start: bool,
) -> Result<()> {
    let mut app = App::new(connection);
    let mut tui = Tui::new()?;
    info!("Starting TUI");
    tui.run(&mut app, &mut session, connect_on_start).await
}
