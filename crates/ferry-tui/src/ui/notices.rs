//! Notifications
//!
//! Most recent notifications, colored by level.

use ferry_app::App;
use ferry_core::Level;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::tail;

/// Shown until the first notification arrives.
const COMMANDS: [&str; 4] = [
    "/add <path>...  queue files        /rm <id>        drop a queued file",
    "/send           send the queue     /copy <id>      copy a received file",
    "/copytext <id>  copy a message     /quit           leave",
    "anything else is sent as a message (start with // to send a leading slash)",
];

/// Render the notification list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Notifications ");

    if app.notifications().next().is_none() {
        let hint: Vec<ListItem> = COMMANDS
            .iter()
            .map(|line| ListItem::new(Span::styled(*line, Style::default().fg(Color::DarkGray))))
            .collect();
        frame.render_widget(List::new(hint).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .notifications()
        .map(|notification| {
            let color = match notification.level {
                Level::Info => Color::Gray,
                Level::Success => Color::Green,
                Level::Warning => Color::Yellow,
                Level::Error => Color::Red,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<5} ", notification.level), Style::default().fg(color)),
                Span::raw(notification.message.clone()),
            ]))
        })
        .collect();

    let list = List::new(tail(items, area)).block(block);
    frame.render_widget(list, area);
}
