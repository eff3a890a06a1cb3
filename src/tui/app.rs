//! Application state for the TUI.
//!
//! Contains the form and editor state and maps key presses to actions that
//! the runner hands to the session controller.

use crate::config::ConnectionConfig;
use crate::db::DatabaseBackend;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::widgets::spinner::Spinner;

/// Text the query editor starts with.
pub const DEFAULT_QUERY: &str = "SELECT * FROM information_schema.tables LIMIT 10;";

/// Which field currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Host,
    Port,
    Database,
    User,
    Password,
    #[default]
    Query,
    Results,
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::Host,
        Focus::Port,
        Focus::Database,
        Focus::User,
        Focus::Password,
        Focus::Query,
        Focus::Results,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Cycles to the next field.
    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    /// Cycles to the previous field.
    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// True for the connection form fields.
    pub fn is_form(self) -> bool {
        matches!(
            self,
            Self::Host | Self::Port | Self::Database | Self::User | Self::Password
        )
    }
}

/// Input state for text editing.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
}

impl InputState {
    /// Creates an input holding `text` with the cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clears the input.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Applies an editing key; anything else is ignored.
    fn edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => {}
        }
    }
}

/// What a key press asks the runner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Disconnect,
    Execute,
    BeginTransaction,
    Commit,
    Rollback,
    Quit,
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current focus field.
    pub focus: Focus,
    pub host: InputState,
    pub port: InputState,
    pub database: InputState,
    pub user: InputState,
    pub password: InputState,
    /// Query editor.
    pub query: InputState,
    /// First visible result row.
    pub results_scroll: usize,
    /// Shown while a connect or query call is in flight.
    pub busy: Option<Spinner>,
    /// Backend the form connects to.
    pub backend: DatabaseBackend,
}

impl App {
    /// Creates the UI state with the form prefilled from `connection`.
    pub fn new(connection: &ConnectionConfig) -> Self {
        let port = match connection.backend {
            DatabaseBackend::Sqlite => String::new(),
            _ => connection.effective_port().to_string(),
        };

        Self {
            running: true,
            focus: Focus::default(),
            host: InputState::with_text(connection.host_or_default()),
            port: InputState::with_text(port),
            database: InputState::with_text(connection.database.as_deref().unwrap_or("test")),
            user: InputState::with_text(connection.user.as_deref().unwrap_or("root")),
            password: InputState::with_text(connection.password.as_deref().unwrap_or_default()),
            query: InputState::with_text(DEFAULT_QUERY),
            results_scroll: 0,
            busy: None,
            backend: connection.backend,
        }
    }

    /// The input that currently has focus, if it is a text field.
    pub fn focused_input(&mut self) -> Option<&mut InputState> {
        match self.focus {
            Focus::Host => Some(&mut self.host),
            Focus::Port => Some(&mut self.port),
            Focus::Database => Some(&mut self.database),
            Focus::User => Some(&mut self.user),
            Focus::Password => Some(&mut self.password),
            Focus::Query => Some(&mut self.query),
            Focus::Results => None,
        }
    }

    /// Marks a call as in flight.
    pub fn start_busy(&mut self, spinner: Spinner) {
        self.busy = Some(spinner);
    }

    pub fn stop_busy(&mut self) {
        self.busy = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Inserts pasted text into the focused field.
    ///
    /// Form fields are single-line, so line breaks are dropped there; the
    /// query editor keeps them.
    pub fn paste(&mut self, text: &str) {
        let keep_newlines = self.focus == Focus::Query;
        if let Some(input) = self.focused_input() {
            for c in text.chars() {
                match c {
                    '\r' => {}
                    '\n' if !keep_newlines => {}
                    c => input.insert(c),
                }
            }
        }
    }

    /// Called after a new result arrives.
    pub fn reset_scroll(&mut self) {
        self.results_scroll = 0;
    }

    /// Handles a key press. Returns the action the runner should perform.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Action::Quit),
            KeyCode::Char('d') if ctrl => return Some(Action::Disconnect),
            KeyCode::Char('e') if ctrl => return Some(Action::Execute),
            KeyCode::Char('t') if ctrl => return Some(Action::BeginTransaction),
            KeyCode::Char('k') if ctrl => return Some(Action::Commit),
            KeyCode::Char('r') if ctrl => return Some(Action::Rollback),
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            KeyCode::Enter if alt && self.focus == Focus::Query => {
                self.query.insert('\n');
                return None;
            }
            KeyCode::Enter if self.focus.is_form() => return Some(Action::Connect),
            KeyCode::Enter if self.focus == Focus::Query => return Some(Action::Execute),
            _ => {}
        }

        if self.focus == Focus::Results {
            match key.code {
                KeyCode::Up => self.results_scroll = self.results_scroll.saturating_sub(1),
                KeyCode::Down => self.results_scroll += 1,
                KeyCode::PageUp => self.results_scroll = self.results_scroll.saturating_sub(10),
                KeyCode::PageDown => self.results_scroll += 10,
                KeyCode::Home => self.results_scroll = 0,
                _ => {}
            }
            return None;
        }

        if let Some(input) = self.focused_input() {
            input.edit(key);
        }
        None
    }
}
