//! Status bar
//!
//! Displays link state, counters and the latest status message.

use ferry_app::{App, ConnectionStatus};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.connection_status();
    let connection = match status {
        ConnectionStatus::Disconnected => {
            Span::styled(status.to_string(), Style::default().fg(Color::Red))
        },
        ConnectionStatus::Connecting => {
            Span::styled(status.to_string(), Style::default().fg(Color::Yellow))
        },
        ConnectionStatus::Connected { .. } => Span::styled(
            status.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let counters = format!(
        " | queued: {} | files: {} | messages: {}",
        app.queue().len(),
        app.files().len(),
        app.texts().len()
    );
    let message = app.status_message().map_or_else(String::new, |m| format!(" | {m}"));

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection,
        Span::raw(counters),
        Span::styled(message, Style::default().add_modifier(Modifier::ITALIC)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
