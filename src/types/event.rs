//! Event types accepted by the collector
//!
//! The set of event types is closed: anything a producer sends must map
//! onto one of the variants below, otherwise the event is rejected.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::ParseError;

/// Event types that producers may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    Alpha,
    Beta,
    Gamma,
    Delta,
    Epsilon,
}

impl EventType {
    /// Every recognized event type, in declaration order
    pub const ALL: [EventType; 5] = [
        EventType::Alpha,
        EventType::Beta,
        EventType::Gamma,
        EventType::Delta,
        EventType::Epsilon,
    ];

    /// Canonical name as written on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Alpha => "Alpha",
            EventType::Beta => "Beta",
            EventType::Gamma => "Gamma",
            EventType::Delta => "Delta",
            EventType::Epsilon => "Epsilon",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseError;

    /// Case-insensitive lookup, ignoring surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseError::InvalidEventType(name.to_string()))
    }
}

/// A single accepted event, exactly as it will be written to the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawEvent {
    /// Network identity of the producer, taken from the connection
    pub source: IpAddr,
    pub event_type: EventType,
    /// Type text as the producer wrote it (trimmed, case preserved)
    pub raw_type: String,
    pub message: String,
    /// Assigned by the collector on receipt
    pub received_at: DateTime<Utc>,
}

impl RawEvent {
    /// Render the event as a single event-log line (without the newline)
    ///
    /// Line terminators inside the message are escaped so that one event
    /// always occupies exactly one line. Backslashes are doubled as well, so
    /// the escaping can be undone unambiguously.
    pub fn log_line(&self) -> String {
        let mut message = String::with_capacity(self.message.len());
        for c in self.message.chars() {
            match c {
                '\\' => message.push_str("\\\\"),
                '\n' => message.push_str("\\n"),
                '\r' => message.push_str("\\r"),
                c => message.push(c),
            }
        }
        format!("{} - {}: {}", self.source, self.raw_type, message)
    }
}
