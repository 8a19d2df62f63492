//! Status line state types.

use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    server: String,
    notice: Option<Notice>,
}

impl StatusLine {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            notice: None,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn info(&mut self, text: impl Into<String>, now: Instant) {
        self.show(text.into(), NoticeKind::Info, now);
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.show(text.into(), NoticeKind::Error, now);
    }

    fn show(&mut self, text: String, kind: NoticeKind, now: Instant) {
        self.notice = Some(Notice {
            text,
            kind,
            expires_at: now + NOTICE_DURATION,
        });
    }

    /// Drops an expired notice. Returns whether one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
            return true;
        }
        false
    }
}
