//! Received items
//!
//! Files on top, messages below, newest last.

use ferry_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::tail;

const IMAGE_MARKER: &str = " [img]";

/// Render received files and messages.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let [files_area, texts_area] = chunks.as_ref() else {
        return;
    };

    let id_style = Style::default().fg(Color::Cyan);

    let files: Vec<ListItem> = app
        .files()
        .iter()
        .map(|file| {
            let marker = if file.is_image() { IMAGE_MARKER } else { "" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{} ", file.id), id_style),
                Span::styled(file.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(marker, Style::default().fg(Color::Magenta)),
                Span::styled(
                    format!(" {} B, {}", file.size, file.content_type),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let files = List::new(tail(files, *files_area)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Files ({}) /copy <id> ", app.files().len())),
    );
    frame.render_widget(files, *files_area);

    let texts: Vec<ListItem> = app
        .texts()
        .iter()
        .map(|text| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{} ", text.id), id_style),
                Span::styled(format!("[{}] ", text.timestamp), Style::default().fg(Color::Green)),
                Span::raw(text.content.clone()),
            ]))
        })
        .collect();

    let texts = List::new(tail(texts, *texts_area)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Messages ({}) /copytext <id> ", app.texts().len())),
    );
    frame.render_widget(texts, *texts_area);
}
