//! Session records as served by `/api/sessions`.
//!
//! The wire format is the server's serialization of its session table:
//! `{ "id", "proto", "state", "host", "from", "timestamp" }`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

/// An immutable, fully replacing view of every known session.
///
/// Shared by reference with every subscriber; nobody mutates it after dispatch.
pub type Snapshot = Arc<[SessionRecord]>;

/// Stable identifier of a session, compared as text.
///
/// The server emits integer ids, but the dashboard only ever uses them as
/// opaque keys, so both numbers and strings are accepted. Ids that read
/// as a canonical integer serialize back as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for SessionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Only canonical forms go back out as numbers, so "007" stays text.
        if let Ok(v) = self.0.parse::<u64>()
            && v.to_string() == self.0
        {
            return serializer.serialize_u64(v);
        }
        if let Ok(v) = self.0.parse::<i64>()
            && v.to_string() == self.0
        {
            return serializer.serialize_i64(v);
        }
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(v) => Self(v.to_string()),
            RawId::Signed(v) => Self(v.to_string()),
            RawId::Text(v) => Self(v),
        })
    }
}

/// Lifecycle state of a proxied connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Waiting,
    Connecting,
    Established,
    /// Any value the dashboard does not know about.
    Unknown(i64),
}

impl SessionState {
    /// States that get a counter in the header, in display order.
    pub const COUNTED: [SessionState; 3] = [
        SessionState::Waiting,
        SessionState::Connecting,
        SessionState::Established,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SessionState::Waiting => "Waiting",
            SessionState::Connecting => "Connecting",
            SessionState::Established => "Established",
            SessionState::Unknown(_) => "Unknown",
        }
    }

    pub fn code(self) -> i64 {
        match self {
            SessionState::Waiting => 0,
            SessionState::Connecting => 1,
            SessionState::Established => 2,
            SessionState::Unknown(code) => code,
        }
    }
}

impl From<i64> for SessionState {
    fn from(code: i64) -> Self {
        match code {
            0 => SessionState::Waiting,
            1 => SessionState::Connecting,
            2 => SessionState::Established,
            other => SessionState::Unknown(other),
        }
    }
}

impl Serialize for SessionState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for SessionState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(SessionState::from)
    }
}

/// One tracked connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    #[serde(rename = "proto")]
    pub protocol: String,
    pub state: SessionState,
    pub host: String,
    #[serde(rename = "from")]
    pub origin: String,
    /// Epoch milliseconds at which the session began.
    #[serde(rename = "timestamp")]
    pub started_at: i64,
}

/// Per-state session counts shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub waiting: usize,
    pub connecting: usize,
    pub established: usize,
    pub unknown: usize,
}

impl StateCounts {
    pub fn get(&self, state: SessionState) -> usize {
        match state {
            SessionState::Waiting => self.waiting,
            SessionState::Connecting => self.connecting,
            SessionState::Established => self.established,
            SessionState::Unknown(_) => self.unknown,
        }
    }

    /// "Waiting: n, Connecting: n, Established: n"
    pub fn summary(&self) -> String {
        SessionState::COUNTED
            .iter()
            .map(|state| format!("{}: {}", state.label(), self.get(*state)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Groups a snapshot by state.
pub fn count_by_state(records: &[SessionRecord]) -> StateCounts {
    let mut counts = StateCounts::default();
    for record in records {
        match record.state {
            SessionState::Waiting => counts.waiting += 1,
            SessionState::Connecting => counts.connecting += 1,
            SessionState::Established => counts.established += 1,
            SessionState::Unknown(_) => counts.unknown += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_server_payload() {
        let body = r#"[
            {"id": 7, "timestamp": 1700000000123, "proto": "socks5", "host": "example.com:443", "from": "127.0.0.1:50312", "state": 2},
            {"id": "abc", "timestamp": 1700000000999, "proto": "http", "host": "a.b:80", "from": "[::1]:1", "state": 9}
        ]"#;

        let records: Vec<SessionRecord> = serde_json::from_str(body).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), "7");
        assert_eq!(records[0].protocol, "socks5");
        assert_eq!(records[0].state, SessionState::Established);
        assert_eq!(records[0].origin, "127.0.0.1:50312");
        assert_eq!(records[0].started_at, 1_700_000_000_123);
        assert_eq!(records[1].id.as_str(), "abc");
        assert_eq!(records[1].state, SessionState::Unknown(9));
        assert_eq!(records[1].state.label(), "Unknown");
    }

    #[test]
    fn test_state_codes_round_trip_through_wire_names() {
        let record = SessionRecord {
            id: SessionId::from(3),
            protocol: "http".into(),
            state: SessionState::Connecting,
            host: "h".into(),
            origin: "o".into(),
            started_at: 5,
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["proto"], "http");
        assert_eq!(value["state"], 1);
        assert_eq!(value["from"], "o");
        assert_eq!(value["timestamp"], 5);
    }

    #[test]
    fn test_session_ids_keep_their_json_type() {
        let body = r#"[7, -2, "abc", "007"]"#;

        let ids: Vec<SessionId> = serde_json::from_str(body).unwrap();
        let out = serde_json::to_value(&ids).unwrap();

        assert_eq!(out, serde_json::json!([7, -2, "abc", "007"]));
    }

    #[test]
    fn test_count_by_state() {
        let make = |id: u64, state: i64| SessionRecord {
            id: SessionId::from(id),
            protocol: "http".into(),
            state: state.into(),
            host: String::new(),
            origin: String::new(),
            started_at: 0,
        };
        let records = vec![make(1, 0), make(2, 2), make(3, 2), make(4, 42)];

        let counts = count_by_state(&records);

        assert_eq!(counts.get(SessionState::Waiting), 1);
        assert_eq!(counts.get(SessionState::Connecting), 0);
        assert_eq!(counts.get(SessionState::Established), 2);
        assert_eq!(counts.unknown, 1);
    }
}
