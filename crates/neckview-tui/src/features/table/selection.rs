//! Text selection within one table line.
//!
//! Endpoints are stored as (column, character offset) on a row identified by
//! its session id, not as screen coordinates, so a selection follows its text
//! through scrolling, column reflow and reordering. Ranges are half-open:
//! a click without a drag selects nothing.

use crate::common::text::char_slice;

/// A character boundary inside one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellPoint {
    pub column: usize,
    pub offset: usize,
}

impl CellPoint {
    pub fn new(column: usize, offset: usize) -> Self {
        Self { column, offset }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSelection {
    row_key: Option<String>,
    anchor: CellPoint,
    cursor: CellPoint,
    is_selecting: bool,
}

impl TableSelection {
    /// Starts a new selection on the row with `key`.
    pub fn start(&mut self, key: impl Into<String>, at: CellPoint) {
        self.row_key = Some(key.into());
        self.anchor = at;
        self.cursor = at;
        self.is_selecting = true;
    }

    /// Moves the free end while a drag is in progress.
    pub fn extend(&mut self, at: CellPoint) {
        if self.is_selecting {
            self.cursor = at;
        }
    }

    /// Ends the drag. The selection stays visible until cleared.
    pub fn finish(&mut self) {
        self.is_selecting = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_selecting(&self) -> bool {
        self.is_selecting
    }

    pub fn row_key(&self) -> Option<&str> {
        self.row_key.as_deref()
    }

    /// Ordered endpoints, or `None` when nothing is selected.
    pub fn range(&self) -> Option<(CellPoint, CellPoint)> {
        self.row_key.as_ref()?;
        let (start, end) = if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        };
        (start != end).then_some((start, end))
    }

    /// Selected character range within `column` of the row with `key`.
    pub fn highlight(&self, key: &str, column: usize, len: usize) -> Option<(usize, usize)> {
        if self.row_key() != Some(key) {
            return None;
        }
        let (start, end) = self.range()?;
        if column < start.column || column > end.column {
            return None;
        }
        let from = if column == start.column {
            start.offset.min(len)
        } else {
            0
        };
        let to = if column == end.column {
            end.offset.min(len)
        } else {
            len
        };
        (from < to).then_some((from, to))
    }

    /// Selected text of a row, cells joined by tabs.
    pub fn selected_text(&self, cells: &[String]) -> Option<String> {
        let key = self.row_key()?;
        let (start, end) = self.range()?;
        let pieces: Vec<String> = (start.column..=end.column.min(cells.len().saturating_sub(1)))
            .filter_map(|column| {
                let len = cells[column].chars().count();
                let (from, to) = self.highlight(key, column, len)?;
                Some(char_slice(&cells[column], from, to))
            })
            .collect();
        (!pieces.is_empty()).then(|| pieces.join("\t"))
    }

    /// Re-spans a finished selection over the whole cell after its content
    /// changed, if the selection lies entirely inside that cell.
    ///
    /// Returns whether the selection was touched.
    pub fn reassert_cell(&mut self, key: &str, column: usize, len: usize) -> bool {
        if self.is_selecting || self.row_key() != Some(key) || self.range().is_none() {
            return false;
        }
        if self.anchor.column != column || self.cursor.column != column {
            return false;
        }
        self.anchor = CellPoint::new(column, 0);
        self.cursor = CellPoint::new(column, len);
        true
    }
}
