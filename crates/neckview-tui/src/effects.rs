//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer only mutates state and returns effects; it never touches the
//! terminal, the clipboard or the store.

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Ask the store for a fresh snapshot (coalesced with any fetch in flight).
    Refresh,

    /// Put selected text on the clipboard.
    CopyToClipboard { text: String },
}
