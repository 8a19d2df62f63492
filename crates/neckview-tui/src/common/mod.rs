//! Shared helpers used across features.

pub mod clipboard;
pub mod clock;
pub mod layout;
pub mod text;

pub use clipboard::{Clipboard, ClipboardError};
pub use clock::Clock;
pub use layout::ScreenLayout;
