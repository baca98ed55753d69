//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod input;
mod notices;
mod queue;
mod received;
mod status;

use ferry_app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, input: &InputState) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 6;
    const NOTICES_HEIGHT: u16 = 6;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(NOTICES_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, notices_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, *main_area);
    notices::render(frame, app, *notices_area);
    input::render(frame, input, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (outbound queue + received items).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const QUEUE_WIDTH_PERCENT: u16 = 40;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(QUEUE_WIDTH_PERCENT),
            Constraint::Percentage(100 - QUEUE_WIDTH_PERCENT),
        ])
        .split(area);

    let [queue_area, received_area] = chunks.as_ref() else {
        return;
    };

    queue::render(frame, app, *queue_area);
    received::render(frame, app, *received_area);
}

/// Keep the last `visible` items of a list, so the newest stay on screen.
fn tail<T>(items: Vec<T>, area: Rect) -> Vec<T> {
    const BORDER_SIZE: u16 = 2;

    let visible = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible);
    items.into_iter().skip(skip).collect()
}
