use std::time::Duration;

use neckview_core::model::SessionRecord;

use super::columns::{ColumnLayout, UPTIME_COLUMN};
use super::reconcile::{ReconcileReport, reconcile};
use super::row::{RowContext, SessionRow};
use super::selection::{CellPoint, TableSelection};
use crate::common::Clock;
use crate::common::text::char_index_at_column;

/// Session table: reconciled rows, scroll position and selection.
#[derive(Debug)]
pub struct TableState {
    rows: Vec<SessionRow>,
    ctx: RowContext,
    pub selection: TableSelection,
    scroll_offset: usize,
    viewport_height: usize,
    width: usize,
}

impl TableState {
    pub fn new(now: Clock, tick: Duration) -> Self {
        Self {
            rows: Vec::new(),
            ctx: RowContext::new(now, tick),
            selection: TableSelection::default(),
            scroll_offset: 0,
            viewport_height: 0,
            width: 0,
        }
    }

    pub fn rows(&self) -> &[SessionRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Applies a full snapshot. Drops the selection if its row went away.
    pub fn apply_snapshot(&mut self, snapshot: &[SessionRecord], now: Clock) -> ReconcileReport {
        self.ctx.now = now;
        let report = reconcile(&mut self.rows, snapshot, &mut self.ctx);
        if let Some(key) = self.selection.row_key()
            && report.removed().any(|removed| removed == key)
        {
            self.selection.clear();
        }
        self.clamp_scroll();
        report
    }

    /// Advances every uptime display that is due. Returns whether anything
    /// visible changed.
    pub fn tick(&mut self, now: Clock) -> bool {
        let mut changed_any = false;
        for row in &mut self.rows {
            let Some(changed) = row.uptime_mut().poll(now) else {
                continue;
            };
            if changed.is_empty() {
                continue;
            }
            changed_any = true;
            let len = row.uptime().text().chars().count();
            self.selection
                .reassert_cell(row.record().id.as_str(), UPTIME_COLUMN, len);
        }
        changed_any
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.width = usize::from(width);
        self.viewport_height = usize::from(height);
        self.clamp_scroll();
    }

    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::compute(&self.rows, self.width)
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Rows currently inside the viewport.
    pub fn visible_rows(&self) -> &[SessionRow] {
        let start = self.scroll_offset.min(self.rows.len());
        let end = (start + self.viewport_height).min(self.rows.len());
        &self.rows[start..end]
    }

    fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.viewport_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add_signed(delta)
            .min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.viewport_height.max(1) as isize));
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.viewport_height.max(1) as isize);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    /// Maps a point in the body (visible line, terminal column) to a row and cell.
    pub fn hit_test(&self, line: usize, x: usize) -> Option<(&str, CellPoint)> {
        let row = self.visible_rows().get(line)?;
        let (column, dx) = self.layout().column_at(x);
        let cells = row.cells();
        let offset = char_index_at_column(&cells[column], dx);
        Some((row.record().id.as_str(), CellPoint::new(column, offset)))
    }

    /// Cell point on the selected row under terminal column `x`, for drags
    /// that wander off the row they started on.
    pub fn point_on_selected_row(&self, x: usize) -> Option<CellPoint> {
        let key = self.selection.row_key()?;
        let row = self.rows.iter().find(|row| row.record().id.as_str() == key)?;
        let (column, dx) = self.layout().column_at(x);
        let cells = row.cells();
        Some(CellPoint::new(column, char_index_at_column(&cells[column], dx)))
    }

    pub fn selected_text(&self) -> Option<String> {
        let key = self.selection.row_key()?;
        let row = self.rows.iter().find(|row| row.record().id.as_str() == key)?;
        self.selection.selected_text(&row.cells())
    }
}
