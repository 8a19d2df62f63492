use std::time::Duration;

use neckview_core::model::SessionRecord;

use super::reconcile::KeyedRow;
use crate::common::Clock;
use crate::uptime::LiveTime;

/// What session rows need from the table to be built or refreshed.
#[derive(Debug)]
pub struct RowContext {
    /// Clock reading the next uptime displays start from.
    pub now: Clock,
    tick: Duration,
    next_generation: u64,
}

impl RowContext {
    pub fn new(now: Clock, tick: Duration) -> Self {
        Self {
            now,
            tick,
            next_generation: 1,
        }
    }

    fn live_time(&mut self, started_at: i64) -> LiveTime {
        let generation = self.next_generation;
        self.next_generation += 1;
        LiveTime::new(started_at, generation, self.tick, self.now)
    }
}

/// One session line of the table.
#[derive(Debug)]
pub struct SessionRow {
    record: SessionRecord,
    uptime: LiveTime,
}

impl SessionRow {
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn uptime(&self) -> &LiveTime {
        &self.uptime
    }

    pub(super) fn uptime_mut(&mut self) -> &mut LiveTime {
        &mut self.uptime
    }

    /// Plain text of every column, in display order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.record.id.to_string(),
            self.record.protocol.clone(),
            self.record.state.label().to_string(),
            self.record.host.clone(),
            self.record.origin.clone(),
            self.uptime.text(),
        ]
    }
}

impl KeyedRow for SessionRow {
    type Context = RowContext;

    fn key(&self) -> &str {
        self.record.id.as_str()
    }

    fn create(record: &SessionRecord, ctx: &mut RowContext) -> Self {
        Self {
            record: record.clone(),
            uptime: ctx.live_time(record.started_at),
        }
    }

    fn update(&mut self, record: &SessionRecord, ctx: &mut RowContext) -> bool {
        let changed = self.record != *record;
        // Rebuilding restarts the ticker, so only do it for a new start time.
        if self.uptime.started_at() != record.started_at {
            self.uptime = ctx.live_time(record.started_at);
        }
        if changed {
            self.record.clone_from(record);
        }
        changed
    }
}
