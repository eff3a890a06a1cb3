//! Common test utilities for TUI tests.

use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::process::Command;

use querydesk::app::SessionController;
use querydesk::tui::{ui, App};

/// Run the querydesk binary with the given arguments.
/// The binary is already built by `cargo test` for integration tests.
pub fn run_querydesk(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_querydesk"))
        .args(args)
        .env_remove("QUERYDESK_PASSWORD")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

/// Draws one frame and returns the screen as lines of text.
pub fn render_screen(app: &App, session: &SessionController, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| ui::render(frame, app, session))
        .unwrap();

    let buffer = terminal.backend().buffer();
    buffer
        .content
        .chunks(width as usize)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}

/// True when any screen line contains `needle`.
pub fn screen_contains(screen: &[String], needle: &str) -> bool {
    screen.iter().any(|line| line.contains(needle))
}
