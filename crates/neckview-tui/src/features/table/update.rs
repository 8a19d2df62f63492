//! Table input handling: scrolling and mouse selection.

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

use super::state::TableState;
use crate::common::ScreenLayout;
use crate::effects::UiEffect;

/// Lines to scroll per mouse wheel tick.
const MOUSE_SCROLL_LINES: isize = 3;

/// Handles navigation keys. Returns whether the key was consumed.
pub fn handle_key(table: &mut TableState, code: KeyCode) -> bool {
    match code {
        KeyCode::Up => table.scroll_by(-1),
        KeyCode::Down => table.scroll_by(1),
        KeyCode::PageUp => table.page_up(),
        KeyCode::PageDown => table.page_down(),
        KeyCode::Home => table.scroll_to_top(),
        KeyCode::End => table.scroll_to_bottom(),
        _ => return false,
    }
    true
}

/// Handles mouse events over the table.
///
/// Supports:
/// - Scroll wheel
/// - Click-and-drag selection within one line, copied on release
pub fn handle_mouse(
    table: &mut TableState,
    screen: &ScreenLayout,
    mouse: MouseEvent,
) -> Option<UiEffect> {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            table.scroll_by(-MOUSE_SCROLL_LINES);
            None
        }
        MouseEventKind::ScrollDown => {
            table.scroll_by(MOUSE_SCROLL_LINES);
            None
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let hit = screen
                .body_line_at(mouse.row)
                .and_then(|line| table.hit_test(line, usize::from(mouse.column)))
                .map(|(key, point)| (key.to_string(), point));
            match hit {
                Some((key, point)) => table.selection.start(key, point),
                None => table.selection.clear(),
            }
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            // The drag stays on the row it started on, whatever line the pointer is over.
            if table.selection.is_selecting()
                && let Some(point) = table.point_on_selected_row(usize::from(mouse.column))
            {
                table.selection.extend(point);
            }
            None
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if !table.selection.is_selecting() {
                return None;
            }
            table.selection.finish();
            table
                .selected_text()
                .map(|text| UiEffect::CopyToClipboard { text })
        }
        _ => None,
    }
}
