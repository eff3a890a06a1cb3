//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{header::Header, input::InputField, status::StatusBar, table::ResultTable};
use crate::app::SessionController;
use crate::db::DatabaseBackend;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App, session: &SessionController) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Connection form
            Constraint::Length(3), // Query editor
            Constraint::Min(3),    // Results
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    frame.render_widget(
        Header::new(
            &session.connection_label(),
            app.busy.as_ref(),
            session.is_connected(),
        ),
        main_layout[0],
    );
    render_form(frame, main_layout[1], app);
    render_field(frame, main_layout[2], app, Focus::Query);
    render_results(frame, main_layout[3], app, session);
    frame.render_widget(StatusBar::new(session.status()), main_layout[4]);
}

fn render_form(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // Host
            Constraint::Percentage(10), // Port
            Constraint::Percentage(25), // Database
            Constraint::Percentage(20), // User
            Constraint::Percentage(15), // Password
        ])
        .split(area);

    let fields = [
        Focus::Host,
        Focus::Port,
        Focus::Database,
        Focus::User,
        Focus::Password,
    ];
    for (field, column) in fields.into_iter().zip(columns.iter()) {
        render_field(frame, *column, app, field);
    }
}

/// Renders one text field and places the cursor in it when focused.
fn render_field(frame: &mut Frame, area: Rect, app: &App, field: Focus) {
    let (title, input) = match field {
        Focus::Host => ("Host", &app.host),
        Focus::Port => ("Port", &app.port),
        Focus::Database => (database_title(app), &app.database),
        Focus::User => ("Username", &app.user),
        Focus::Password => ("Password", &app.password),
        Focus::Query | Focus::Results => ("Query (Enter to run)", &app.query),
    };

    let focused = app.focus == field;
    let mut widget = InputField::new(title, &input.text, input.cursor, focused);
    if field == Focus::Password {
        widget = widget.masked();
    }
    frame.render_widget(widget, area);

    if focused && !app.is_busy() {
        frame.set_cursor_position(InputField::cursor_position(area, input.cursor));
    }
}

fn database_title(app: &App) -> &'static str {
    match app.backend {
        DatabaseBackend::Sqlite => "Database file",
        _ => "Database",
    }
}

fn render_results(frame: &mut Frame, area: Rect, app: &App, session: &SessionController) {
    let focused = app.focus == Focus::Results;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = match session.rows_label() {
        "" => " Results ".to_string(),
        label => format!(" Results: {label} "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match session.table() {
        Some(table) => {
            let scroll = app.results_scroll.min(table.row_count().saturating_sub(1));
            frame.render_widget(ResultTable::new(table).scroll(scroll), inner);
        }
        None => {
            let hint = Paragraph::new(Line::from(Span::styled(
                "No result set",
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(hint, inner);
        }
    }
}
