//! Application state owned by the runtime and mutated only by the reducer.

use std::time::Duration;

use crate::common::{Clock, ScreenLayout};
use crate::header::HeaderState;
use crate::statusline::StatusLine;
use crate::table::TableState;

#[derive(Debug)]
pub struct AppState {
    pub should_quit: bool,
    /// Set by the reducer when the next loop iteration must redraw.
    pub needs_render: bool,
    /// Clock reading of the current loop iteration.
    pub now: Clock,
    pub screen: ScreenLayout,
    pub header: HeaderState,
    pub table: TableState,
    pub status: StatusLine,
}

impl AppState {
    pub fn new(server: &str, tick: Duration, now: Clock) -> Self {
        Self {
            should_quit: false,
            needs_render: true,
            now,
            screen: ScreenLayout::new(0, 0),
            header: HeaderState::default(),
            table: TableState::new(now, tick),
            status: StatusLine::new(server),
        }
    }
}
