//! Status bar widget.

use crate::app::{StatusLevel, StatusMessage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const KEY_HINTS: &str =
    "Tab: field  Enter: connect/run  ^T/^K/^R: begin/commit/rollback  ^D: disconnect  Esc: quit";

/// One-line status bar: the last status message, key hints on the right.
pub struct StatusBar<'a> {
    status: &'a StatusMessage,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: &'a StatusMessage) -> Self {
        Self { status }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = match self.status.level {
            StatusLevel::Info => Color::Gray,
            StatusLevel::Success => Color::Green,
            StatusLevel::Error => Color::Red,
        };

        // Multi-line driver errors are flattened onto the bar
        let text = self.status.text.replace('\n', " ");
        Paragraph::new(Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(color),
        )))
        .render(area, buf);

        let hints_width = KEY_HINTS.len() as u16 + 1;
        let text_width = text.chars().count() as u16 + 2;
        if text_width + hints_width < area.width {
            let x = area.right() - hints_width;
            buf.set_string(x, area.y, KEY_HINTS, Style::default().fg(Color::DarkGray));
        }
    }
}
