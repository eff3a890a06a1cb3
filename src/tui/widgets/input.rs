//! Input widget for the TUI.
//!
//! A bordered single-line text field with horizontal scrolling. Used for the
//! connection form and the query editor.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Shown in place of line breaks in the single-line view.
const LINE_BREAK: char = '↵';

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    if cursor <= available_width {
        0
    } else {
        cursor.saturating_sub(available_width)
    }
}

/// Text field widget.
pub struct InputField<'a> {
    title: &'a str,
    text: &'a str,
    cursor: usize,
    focused: bool,
    masked: bool,
}

impl<'a> InputField<'a> {
    pub fn new(title: &'a str, text: &'a str, cursor: usize, focused: bool) -> Self {
        Self {
            title,
            text,
            cursor,
            focused,
            masked: false,
        }
    }

    /// Renders every character as `*`.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Text width inside the borders, leaving one cell for the cursor.
    pub fn available_width(area: Rect) -> usize {
        area.width.saturating_sub(3) as usize
    }

    /// Screen position of the cursor for a field drawn in `area`.
    pub fn cursor_position(area: Rect, cursor: usize) -> (u16, u16) {
        let offset = calculate_scroll_offset(cursor, Self::available_width(area));
        let x = area.x + 1 + (cursor - offset) as u16;
        (x.min(area.right().saturating_sub(2)), area.y + 1)
    }

    fn visible_text(&self, available_width: usize) -> String {
        let offset = calculate_scroll_offset(self.cursor, available_width);
        self.text
            .chars()
            .skip(offset)
            .take(available_width + 1)
            .map(|c| match c {
                _ if self.masked => '*',
                '\n' => LINE_BREAK,
                c => c,
            })
            .collect()
    }
}

impl Widget for InputField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        let visible = self.visible_text(Self::available_width(area));
        Paragraph::new(Line::from(visible))
            .block(block)
            .render(area, buf);
    }
}
