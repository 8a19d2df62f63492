//! Elapsed-time display ("uptime" column).
//!
//! Shows whole seconds since a session started, split into groups of three
//! digits from the right. Each [`LiveTime`] is owned by its table row and is
//! polled from the reducer's tick; dropping it (row removed, or rebuilt after
//! its start time changed) is all it takes to stop it.

use std::time::{Duration, Instant};

use crate::common::Clock;

/// Recompute cadence. Finer than one second so the displayed value never
/// lags far behind a second boundary.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Drawn (dimmed) between digit groups.
pub const GROUP_DIVIDER: char = '\u{2009}';

/// Splits `seconds` into decimal digit groups of three, from the right.
///
/// `3661` becomes `["3", "661"]`; `1000000` becomes `["1", "000", "000"]`.
pub fn digit_groups(seconds: u64) -> Vec<String> {
    let digits = seconds.to_string();
    let head = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let mut groups = vec![digits[..head].to_string()];
    let mut rest = &digits[head..];
    while !rest.is_empty() {
        groups.push(rest[..3].to_string());
        rest = &rest[3..];
    }
    groups
}

/// Like [`digit_groups`], but never fewer than `min_groups` groups; missing
/// leading groups are zero-filled.
fn padded_groups(seconds: u64, min_groups: usize) -> Vec<String> {
    let groups = digit_groups(seconds);
    if groups.len() >= min_groups {
        return groups;
    }
    let missing = min_groups - groups.len();
    let mut padded = Vec::with_capacity(min_groups);
    padded.push("0".to_string());
    padded.extend(std::iter::repeat_n("000".to_string(), missing - 1));
    for (i, group) in groups.into_iter().enumerate() {
        if i == 0 {
            padded.push(format!("{group:0>3}"));
        } else {
            padded.push(group);
        }
    }
    padded
}

fn elapsed_seconds(started_at: i64, wall_ms: i64) -> u64 {
    (wall_ms.saturating_sub(started_at).max(0) / 1000) as u64
}

/// Live elapsed-time display for one start instant.
#[derive(Debug, Clone)]
pub struct LiveTime {
    started_at: i64,
    generation: u64,
    groups: Vec<String>,
    interval: Duration,
    next_due: Instant,
}

impl LiveTime {
    /// Creates the display and renders it immediately.
    pub fn new(started_at: i64, generation: u64, interval: Duration, now: Clock) -> Self {
        Self {
            started_at,
            generation,
            groups: digit_groups(elapsed_seconds(started_at, now.wall_ms)),
            interval,
            next_due: now.instant + interval,
        }
    }

    /// Epoch milliseconds this display counts from.
    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Identifies this instance; a rebuilt display gets a new one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Groups joined by [`GROUP_DIVIDER`].
    pub fn text(&self) -> String {
        let mut divider = [0u8; 4];
        self.groups.join(GROUP_DIVIDER.encode_utf8(&mut divider))
    }

    /// Recomputes the display if a tick is due.
    ///
    /// Returns `None` when not due, otherwise the indices of groups whose text
    /// changed (empty if the value is unchanged).
    pub fn poll(&mut self, now: Clock) -> Option<Vec<usize>> {
        if now.instant < self.next_due {
            return None;
        }
        self.next_due += self.interval;
        if self.next_due <= now.instant {
            self.next_due = now.instant + self.interval;
        }
        Some(self.recompute(now.wall_ms))
    }

    fn recompute(&mut self, wall_ms: i64) -> Vec<usize> {
        let next = padded_groups(elapsed_seconds(self.started_at, wall_ms), self.groups.len());
        let changed = next
            .iter()
            .enumerate()
            .filter(|(i, group)| self.groups.get(*i) != Some(*group))
            .map(|(i, _)| i)
            .collect();
        self.groups = next;
        changed
    }
}
