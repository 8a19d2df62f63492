//! Table rendering.

use neckview_core::model::SessionState;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::columns::{GAP, STATE_COLUMN, TITLES, UPTIME_COLUMN};
use super::row::SessionRow;
use super::state::TableState;
use crate::common::text::fit_to_width;
use crate::uptime::GROUP_DIVIDER;

pub fn state_color(state: SessionState) -> Color {
    match state {
        SessionState::Waiting => Color::Yellow,
        SessionState::Connecting => Color::Cyan,
        SessionState::Established => Color::Green,
        SessionState::Unknown(_) => Color::DarkGray,
    }
}

/// Renders the column titles.
pub fn render_column_header(table: &TableState, frame: &mut Frame, area: Rect) {
    let layout = table.layout();
    let style = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(TITLES.len() * 2);
    for (column, title) in TITLES.iter().enumerate() {
        if column > 0 {
            spans.push(Span::raw(" ".repeat(GAP)));
        }
        spans.push(Span::styled(fit_to_width(title, layout.widths[column]), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the visible rows into the body area.
pub fn render_rows(table: &TableState, frame: &mut Frame, area: Rect) {
    let layout = table.layout();
    let lines: Vec<Line<'static>> = table
        .visible_rows()
        .iter()
        .map(|row| {
            let cells = row.cells();
            let mut spans = Vec::new();
            for (column, text) in cells.iter().enumerate() {
                if column > 0 {
                    spans.push(Span::raw(" ".repeat(GAP)));
                }
                let fitted = fit_to_width(text, layout.widths[column]);
                let highlight = table.selection.highlight(
                    row.record().id.as_str(),
                    column,
                    text.chars().count(),
                );
                spans.extend(cell_spans(&fitted, cell_style(row, column), highlight));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn cell_style(row: &SessionRow, column: usize) -> Style {
    match column {
        STATE_COLUMN => Style::default().fg(state_color(row.record().state)),
        UPTIME_COLUMN => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default(),
    }
}

/// Splits a cell into spans: dimmed digit-group dividers, reversed selection.
fn cell_spans(text: &str, base: Style, highlight: Option<(usize, usize)>) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = base;
    for (idx, ch) in text.chars().enumerate() {
        let mut style = base;
        if ch == GROUP_DIVIDER {
            style = style.add_modifier(Modifier::DIM);
        }
        if highlight.is_some_and(|(from, to)| idx >= from && idx < to) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    spans
}
