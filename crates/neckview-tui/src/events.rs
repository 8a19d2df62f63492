//! UI event types.
//!
//! Every input the dashboard reacts to (terminal input, store notifications,
//! clipboard results, the frame clock) is converted to a `UiEvent` before it
//! reaches the reducer. Async sources send into the runtime's inbox.

use crossterm::event::Event as CrosstermEvent;
use neckview_core::store::StoreEvent;

use crate::common::Clock;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Periodic wake-up at the uptime tick cadence.
    Tick,

    /// Start of a loop iteration: current terminal size and clock reading.
    Frame { width: u16, height: u16, now: Clock },

    /// Raw terminal input.
    Terminal(CrosstermEvent),

    /// Forwarded from the store subscription.
    Store(StoreEvent),

    /// Clipboard copy succeeded.
    ClipboardCopied { chars: usize },

    /// Clipboard copy failed.
    ClipboardFailed { error: String },
}
