//! Column geometry.
//!
//! Widths follow the content of the current rows; Host takes whatever is left.
//! The renderer and mouse hit-testing both use [`ColumnLayout`], so a click
//! always lands on the cell that was drawn there.

use unicode_width::UnicodeWidthStr;

use super::row::SessionRow;

pub const TITLES: [&str; 6] = ["ID", "Type", "State", "Host", "From", "Uptime"];

pub const STATE_COLUMN: usize = 2;
pub const HOST_COLUMN: usize = 3;
pub const UPTIME_COLUMN: usize = 5;

/// Columns between adjacent cells.
pub const GAP: usize = 2;

/// Fits four digit groups; wide enough that a growing uptime never reflows the table.
const UPTIME_WIDTH: usize = 15;
const STATE_WIDTH: usize = 11;
const MIN_HOST_WIDTH: usize = 8;

const MAX_ID_WIDTH: usize = 12;
const MAX_TYPE_WIDTH: usize = 10;
const MAX_FROM_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub widths: [usize; 6],
    pub starts: [usize; 6],
}

impl ColumnLayout {
    pub fn compute(rows: &[SessionRow], total_width: usize) -> Self {
        let content = |column: usize, max: usize| {
            rows.iter()
                .map(|row| match column {
                    0 => row.record().id.as_str().width(),
                    1 => row.record().protocol.width(),
                    _ => row.record().origin.width(),
                })
                .chain(std::iter::once(TITLES[column].width()))
                .max()
                .unwrap_or(0)
                .min(max)
        };

        let mut widths = [
            content(0, MAX_ID_WIDTH),
            content(1, MAX_TYPE_WIDTH),
            STATE_WIDTH,
            0,
            content(4, MAX_FROM_WIDTH),
            UPTIME_WIDTH,
        ];
        let fixed: usize = widths.iter().sum::<usize>() + GAP * (widths.len() - 1);
        widths[HOST_COLUMN] = total_width.saturating_sub(fixed).max(MIN_HOST_WIDTH);

        let mut starts = [0; 6];
        let mut x = 0;
        for (start, width) in starts.iter_mut().zip(widths) {
            *start = x;
            x += width + GAP;
        }
        Self { widths, starts }
    }

    /// Column under terminal column `x`, and `x` relative to that column's start.
    ///
    /// A position in the gap before a column counts as that column's first cell.
    pub fn column_at(&self, x: usize) -> (usize, usize) {
        for column in 0..self.widths.len() {
            if x < self.starts[column] + self.widths[column] {
                return (column, x.saturating_sub(self.starts[column]));
            }
        }
        let last = self.widths.len() - 1;
        (last, x - self.starts[last])
    }
}
