//! Centered hint shown in place of an empty table.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::header::Activity;

/// The hint for an empty table, if one applies.
///
/// Nothing is shown while the first connection attempt is still pending.
pub fn tip_text(activity: Activity, table_empty: bool) -> Option<&'static str> {
    if !table_empty {
        return None;
    }
    match activity {
        Activity::Connecting => None,
        Activity::Online => Some("No active sessions"),
        Activity::Offline => Some("Offline, waiting for server"),
    }
}

pub fn render_tip(text: &str, frame: &mut Frame, body: Rect) {
    if body.height == 0 {
        return;
    }
    let line = Rect::new(body.x, body.y + body.height / 2, body.width, 1);
    let tip = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(tip, line);
}
