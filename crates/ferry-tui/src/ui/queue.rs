//! Outbound queue
//!
//! Lists queued files with a progress gauge for the running pass.

use ferry_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem},
};

const GAUGE_HEIGHT: u16 = 3;
const SENDING_PREFIX: &str = "> ";
const WAITING_PREFIX: &str = "  ";

/// Render the queue and progress gauge.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(GAUGE_HEIGHT)])
        .split(area);

    let [list_area, gauge_area] = chunks.as_ref() else {
        return;
    };

    let queue = app.queue();
    let items: Vec<ListItem> = if queue.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "/add <path> to queue files",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        queue
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                // The pass sends in queue order, so the head is the file in flight.
                let sending = app.in_flight() && i == 0;
                let (prefix, style) = if sending {
                    let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
                    (SENDING_PREFIX, style)
                } else {
                    (WAITING_PREFIX, Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::raw(prefix),
                    Span::styled(format!("#{} {}", item.id, item.handle.name()), style),
                ]))
            })
            .collect()
    };

    let title = format!(" Outbound ({}) ", queue.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, *list_area);

    let progress = app.progress();
    let label = if app.in_flight() {
        format!("{}/{} ({:.0}%)", progress.completed, progress.total, progress.percent())
    } else {
        "idle".to_string()
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((app.progress_percent() / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, *gauge_area);
}
