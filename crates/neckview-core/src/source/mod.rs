//! Backend boundary: where snapshots and change notifications come from.
//!
//! The store only talks to a [`SessionSource`]. [`HttpSessionSource`] is the
//! production implementation (`/api/sessions` + `/api/events`); tests plug in
//! scripted sources.

mod http;
mod sse;

use std::fmt;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
pub use http::HttpSessionSource;
pub use sse::ChannelParser;

use crate::model::SessionRecord;

/// Path of the full snapshot endpoint.
pub const SESSIONS_PATH: &str = "api/sessions";

/// Path of the server-sent change notification channel.
pub const EVENTS_PATH: &str = "api/events";

/// A named event received on the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is live.
    Init,
    /// Something changed; fetch a fresh snapshot.
    Update,
    /// Any other event name. Ignored by the store.
    Other(String),
}

impl ChannelEvent {
    pub fn from_name(name: &str) -> Self {
        match name {
            "init" => ChannelEvent::Init,
            "update" => ChannelEvent::Update,
            other => ChannelEvent::Other(other.to_string()),
        }
    }
}

/// Open push channel. Yields events until it fails or the server closes it.
pub type ChannelStream = BoxStream<'static, SourceResult<ChannelEvent>>;

/// Categories of backend errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Connection refused, reset, timed out, DNS failure, ...
    Transport,
    /// Non-success HTTP status.
    HttpStatus,
    /// Body is not what we expected (invalid JSON, malformed SSE).
    Parse,
    /// The push channel broke mid-stream.
    Stream,
    /// The server ended the push channel.
    Closed,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::Transport => write!(f, "transport"),
            SourceErrorKind::HttpStatus => write!(f, "http_status"),
            SourceErrorKind::Parse => write!(f, "parse"),
            SourceErrorKind::Stream => write!(f, "stream"),
            SourceErrorKind::Closed => write!(f, "closed"),
        }
    }
}

/// Structured backend error with kind and one-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16) -> Self {
        Self::new(SourceErrorKind::HttpStatus, format!("HTTP {status}"))
    }

    pub fn closed() -> Self {
        Self::new(SourceErrorKind::Closed, "event channel closed by server")
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SourceError {}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Where the live store gets its data.
pub trait SessionSource: Send + Sync {
    /// Fetches the full current session list.
    fn fetch_sessions(&self) -> BoxFuture<'_, SourceResult<Vec<SessionRecord>>>;

    /// Opens the push channel.
    fn open_channel(&self) -> BoxFuture<'_, SourceResult<ChannelStream>>;
}
