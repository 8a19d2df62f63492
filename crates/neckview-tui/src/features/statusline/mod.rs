//! Status line feature slice.
//!
//! The bottom line shows key hints and the server being watched. Short-lived
//! notices (copy results, refresh requests) replace the hints until they
//! expire.
//!
//! - `state.rs`: StatusLine (transient notice with expiry)
//! - `render.rs`: Status line rendering

mod render;
mod state;

pub use render::render_status_line;
pub use state::{NOTICE_DURATION, Notice, NoticeKind, StatusLine};
