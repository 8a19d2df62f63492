//! Clipboard utilities for the TUI.
//!
//! Provides clipboard access with multiple transport fallbacks:
//! 1. OSC 52 - Terminal clipboard escape sequence (works over SSH)
//! 2. System clipboard via `arboard` crate

use std::fmt;
use std::io::Write;

/// Clipboard interface with multiple transport fallbacks.
pub struct Clipboard;

impl Clipboard {
    /// Copies text to the clipboard.
    ///
    /// Returns `Ok(())` if any transport succeeded.
    pub fn copy(text: &str) -> Result<(), ClipboardError> {
        if Self::copy_osc52(text).is_ok() {
            return Ok(());
        }

        Self::copy_system(text)
    }

    /// Writes an OSC 52 sequence to stdout; the terminal forwards it to the
    /// system clipboard.
    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(osc52_sequence(text).as_bytes())
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;

        Ok(())
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;

        Ok(())
    }
}

/// OSC 52 format: `ESC ] 52 ; c ; <base64-data> ESC \`, where `c` selects the
/// system clipboard.
fn osc52_sequence(text: &str) -> String {
    use base64::Engine;

    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}

/// Clipboard operation errors.
#[derive(Debug)]
pub enum ClipboardError {
    /// OSC 52 write failed.
    Osc52(String),
    /// System clipboard operation failed.
    System(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}
