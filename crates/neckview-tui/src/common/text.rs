//! Text utilities for TUI rendering.
//!
//! Table cells are laid out in terminal columns but selected in characters;
//! these helpers convert between the two.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with ellipsis if it exceeds `max_width` (unicode-aware).
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let next_width = width + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        width = next_width;
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Fits `text` into exactly `width` columns: truncated with ellipsis, then
/// padded with spaces.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut fitted = truncate_with_ellipsis(text, width);
    let used = fitted.width();
    fitted.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    fitted
}

/// Character index under terminal column `x` of `text`.
///
/// Columns past the end map to the character count.
pub fn char_index_at_column(text: &str, x: usize) -> usize {
    let mut col = 0;
    for (idx, ch) in text.chars().enumerate() {
        col += ch.width().unwrap_or(0);
        if x < col {
            return idx;
        }
    }
    text.chars().count()
}

/// Characters `start..end` of `text`, clamped to its length.
pub fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
