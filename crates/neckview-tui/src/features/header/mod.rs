//! Header feature slice: connection indicator and per-state counters.

use neckview_core::model::{SessionRecord, SessionState, StateCounts, count_by_state};
use neckview_core::store::StoreEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::table::state_color;

/// Push channel health as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Connecting,
    Online,
    Offline,
}

impl Activity {
    pub fn label(self) -> &'static str {
        match self {
            Activity::Connecting => "Connecting…",
            Activity::Online => "● Online",
            Activity::Offline => "● Offline",
        }
    }

    fn style(self) -> Style {
        match self {
            Activity::Connecting => Style::default().fg(Color::DarkGray),
            Activity::Online => Style::default().fg(Color::Green),
            Activity::Offline => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderState {
    pub counts: StateCounts,
    pub activity: Activity,
}

impl HeaderState {
    /// Folds a store event into the header. Returns whether anything changed.
    pub fn apply(&mut self, event: &StoreEvent) -> bool {
        let before = self.clone();
        match event {
            StoreEvent::Update(snapshot) => self.set_counts(snapshot),
            StoreEvent::Active => self.activity = Activity::Online,
            StoreEvent::Inactive => self.activity = Activity::Offline,
        }
        *self != before
    }

    fn set_counts(&mut self, records: &[SessionRecord]) {
        self.counts = count_by_state(records);
    }

    pub fn counts_text(&self) -> String {
        self.counts.summary()
    }
}

pub fn render_header(header: &HeaderState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled("neckview", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(header.activity.label(), header.activity.style()),
        Span::raw("  "),
    ];
    for (idx, state) in SessionState::COUNTED.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(
            state.label(),
            Style::default().fg(state_color(*state)),
        ));
        spans.push(Span::raw(format!(": {}", header.counts.get(*state))));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
