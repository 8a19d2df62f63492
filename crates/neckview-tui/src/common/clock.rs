use std::time::{Duration, Instant};

/// A reading of both clocks the dashboard needs.
///
/// `instant` schedules ticks; `wall_ms` (epoch milliseconds) is what session
/// start times are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub instant: Instant,
    pub wall_ms: i64,
}

impl Clock {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// The same reading moved forward by `by` on both clocks.
    pub fn advanced(self, by: Duration) -> Self {
        Self {
            instant: self.instant + by,
            wall_ms: self.wall_ms + by.as_millis() as i64,
        }
    }
}
