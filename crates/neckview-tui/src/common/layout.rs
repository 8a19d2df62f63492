//! Fixed screen layout shared by the renderer and mouse hit-testing.

use ratatui::layout::Rect;

const HEADER_HEIGHT: u16 = 1;
const COLUMN_HEADER_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;

/// Screen areas, top to bottom: header, column titles, table body, status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub column_header: Rect,
    pub body: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(width: u16, height: u16) -> Self {
        let header = Rect::new(0, 0, width, HEADER_HEIGHT.min(height));
        let column_header = Rect::new(
            0,
            header.bottom(),
            width,
            COLUMN_HEADER_HEIGHT.min(height.saturating_sub(header.bottom())),
        );
        let status_height = STATUS_HEIGHT.min(height.saturating_sub(column_header.bottom()));
        let body = Rect::new(
            0,
            column_header.bottom(),
            width,
            height
                .saturating_sub(column_header.bottom())
                .saturating_sub(status_height),
        );
        let status = Rect::new(0, body.bottom(), width, status_height);
        Self {
            header,
            column_header,
            body,
            status,
        }
    }

    /// Index of the visible body line at screen row `y`, if `y` is inside the body.
    pub fn body_line_at(&self, y: u16) -> Option<usize> {
        (y >= self.body.top() && y < self.body.bottom()).then(|| usize::from(y - self.body.top()))
    }
}
