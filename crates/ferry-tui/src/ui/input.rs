//! Input line
//!
//! The border title previews what Enter will do with the current buffer;
//! malformed commands turn the border red before they are submitted.

use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::{InputState, commands};

/// "> " before the buffer.
const PROMPT: &str = "> ";

/// Render the input line and place the cursor.
pub fn render(frame: &mut Frame, input: &InputState, area: Rect) {
    let (title, border) = if input.buffer().is_empty() {
        (" message or /command ".to_string(), Color::Gray)
    } else {
        let command = commands::parse(input.buffer());
        let color = if command.is_valid() { Color::Cyan } else { Color::Red };
        (format!(" Enter: {} ", command.preview()), color)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let paragraph = Paragraph::new(format!("{PROMPT}{}", input.buffer())).block(block);
    frame.render_widget(paragraph, area);

    // Cursor sits inside the border, clamped to the visible width.
    let inner = area.inner(Margin::new(1, 1));
    let prompt = PROMPT.len() as u16;
    let offset = (input.cursor() as u16).min(inner.width.saturating_sub(prompt + 1));
    frame.set_cursor_position((inner.x.saturating_add(prompt + offset), inner.y));
}
