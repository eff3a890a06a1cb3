//! Header widget for the TUI.
//!
//! Shows the application name, the busy indicator and the session label.

use super::spinner::Spinner;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    connection_label: &'a str,
    spinner: Option<&'a Spinner>,
    is_connected: bool,
}

impl<'a> Header<'a> {
    pub fn new(connection_label: &'a str, spinner: Option<&'a Spinner>, is_connected: bool) -> Self {
        Self {
            connection_label,
            spinner,
            is_connected,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" querydesk v{}", env!("CARGO_PKG_VERSION"));
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if let Some(spinner) = self.spinner {
            let spinner_text = spinner.display();
            let spinner_style = style.fg(Color::Yellow);
            let spinner_width = spinner_text.chars().count() as u16;
            let spinner_x = area.x + (area.width.saturating_sub(spinner_width)) / 2;
            buf.set_string(spinner_x, area.y, &spinner_text, spinner_style);
        }

        let status_dot = if self.is_connected { "●" } else { "○" };
        let status_color = if self.is_connected {
            Color::Green
        } else {
            Color::Gray
        };

        let right_text = format!(" {} {} ", status_dot, self.connection_label);
        let right_width = right_text.chars().count() as u16;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x + 1, area.y, status_dot, style.fg(status_color));
            buf.set_string(
                right_x + 2,
                area.y,
                format!(" {} ", self.connection_label),
                style,
            );
        }
    }
}
