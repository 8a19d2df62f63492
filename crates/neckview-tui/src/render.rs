//! Pure view functions.
//!
//! Everything here takes `&AppState` and draws into a ratatui `Frame`; nothing
//! mutates state or returns effects.

use ratatui::Frame;

use crate::header::render_header;
use crate::state::AppState;
use crate::statusline::render_status_line;
use crate::table::{render_column_header, render_rows};
use crate::tip::{render_tip, tip_text};

/// Renders the whole dashboard.
pub fn render(app: &AppState, frame: &mut Frame) {
    let screen = app.screen;

    render_header(&app.header, frame, screen.header);
    render_column_header(&app.table, frame, screen.column_header);
    match tip_text(app.header.activity, app.table.is_empty()) {
        Some(tip) => render_tip(tip, frame, screen.body),
        None => render_rows(&app.table, frame, screen.body),
    }
    render_status_line(&app.status, frame, screen.status);
}
