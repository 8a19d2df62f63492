//! Feature slices for the TUI (state/update/render per slice).

pub mod header;
pub mod statusline;
pub mod table;
pub mod tip;
pub mod uptime;
