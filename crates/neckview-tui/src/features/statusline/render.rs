//! Status line rendering.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{NoticeKind, StatusLine};
use crate::common::text::truncate_with_ellipsis;

const KEY_HINTS: &[(&str, &str)] = &[("q", "quit"), ("r", "refresh"), ("drag", "copy")];

pub fn render_status_line(status: &StatusLine, frame: &mut Frame, area: Rect) {
    let width = usize::from(area.width);
    let line = match status.notice() {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                truncate_with_ellipsis(&notice.text, width),
                Style::default().fg(color),
            ))
        }
        None => {
            let dim = Style::default().fg(Color::DarkGray);
            let mut spans = Vec::new();
            for (key, action) in KEY_HINTS {
                spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
                spans.push(Span::styled(format!(" {action}  "), dim));
            }
            spans.push(Span::styled(status.server().to_string(), dim));
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
