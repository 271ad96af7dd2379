//! Wire codec for incoming events
//!
//! Producers send a plain-text body of the form `"<EventType>: <message>"`.
//! Parsing is pure: the caller supplies the source address taken from the
//! transport, and the codec never looks at anything but the body.

use std::net::IpAddr;

use chrono::Utc;

use crate::types::{EventType, RawEvent};

/// Reasons a request body is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty event body")]
    EmptyBody,

    #[error("event body is not valid UTF-8")]
    InvalidEncoding,

    #[error("missing ':' separator between event type and message")]
    MissingSeparator,

    #[error("unrecognized event type '{0}'")]
    InvalidEventType(String),
}

/// Separator between the event type and the message
pub const TYPE_SEPARATOR: char = ':';

/// Parse a request body into a [`RawEvent`] attributed to `source`
///
/// Only the first colon splits the body, so the message may itself contain
/// colons. A single space after the colon is dropped; everything else in
/// the message is kept verbatim. One trailing line terminator is ignored.
pub fn parse(source: IpAddr, body: &[u8]) -> Result<RawEvent, ParseError> {
    if body.is_empty() {
        return Err(ParseError::EmptyBody);
    }

    let text = std::str::from_utf8(body).map_err(|_| ParseError::InvalidEncoding)?;
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);

    if text.trim().is_empty() {
        return Err(ParseError::EmptyBody);
    }

    let (raw_type, rest) = text
        .split_once(TYPE_SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;

    let event_type: EventType = raw_type.parse()?;
    let message = rest.strip_prefix(' ').unwrap_or(rest);

    Ok(RawEvent {
        source,
        event_type,
        raw_type: raw_type.trim().to_string(),
        message: message.to_string(),
        received_at: Utc::now(),
    })
}

/// Format a body the way producers send it
pub fn encode(event_type: EventType, message: &str) -> String {
    format!("{}{} {}", event_type, TYPE_SEPARATOR, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::Ipv4Addr;

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    #[test]
    fn test_parse_valid_body() {
        let event = parse(localhost(), b"Alpha: This is event 0").unwrap();
        assert_eq!(event.source, localhost());
        assert_eq!(event.event_type, EventType::Alpha);
        assert_eq!(event.raw_type, "Alpha");
        assert_eq!(event.message, "This is event 0");
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let event = parse(localhost(), b"beta: time=12:30:15").unwrap();
        assert_eq!(event.event_type, EventType::Beta);
        assert_eq!(event.message, "time=12:30:15");
    }

    #[test]
    fn test_parse_case_insensitive_and_trimmed_type() {
        let event = parse(localhost(), b"  gAmMa : hello").unwrap();
        assert_eq!(event.event_type, EventType::Gamma);
        assert_eq!(event.raw_type, "gAmMa");
        assert_eq!(event.message, "hello");
    }

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse(localhost(), b""), Err(ParseError::EmptyBody));
        assert_eq!(parse(localhost(), b"   \n"), Err(ParseError::EmptyBody));
    }

    #[test]
    fn test_parse_unknown_type() {
        assert_eq!(
            parse(localhost(), b"Zeta: nope"),
            Err(ParseError::InvalidEventType("Zeta".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_separator() {
        assert_eq!(
            parse(localhost(), b"Alpha without separator"),
            Err(ParseError::MissingSeparator)
        );
    }

    #[test]
    fn test_parse_invalid_utf8() {
        assert_eq!(
            parse(localhost(), &[0x41, 0xff, 0x3a, 0x20]),
            Err(ParseError::InvalidEncoding)
        );
    }

    #[test]
    fn test_parse_ignores_one_trailing_newline() {
        let event = parse(localhost(), b"Delta: line\n").unwrap();
        assert_eq!(event.message, "line");
    }

    #[test]
    fn test_parse_empty_message_is_accepted() {
        let event = parse(localhost(), b"Epsilon:").unwrap();
        assert_eq!(event.event_type, EventType::Epsilon);
        assert_eq!(event.message, "");
    }

    fn any_event_type() -> impl Strategy<Value = EventType> {
        prop::sample::select(EventType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_encode_then_parse_preserves_message(
            event_type in any_event_type(),
            message in "[^\r\n]{0,64}",
        ) {
            let body = encode(event_type, &message);
            let event = parse(localhost(), body.as_bytes()).unwrap();
            prop_assert_eq!(event.event_type, event_type);
            prop_assert_eq!(event.message, message);
        }

        #[test]
        fn prop_type_matching_ignores_case(
            event_type in any_event_type(),
            upper in any::<bool>(),
        ) {
            let name = if upper {
                event_type.as_str().to_uppercase()
            } else {
                event_type.as_str().to_lowercase()
            };
            let body = format!("{}: payload", name);
            let event = parse(localhost(), body.as_bytes()).unwrap();
            prop_assert_eq!(event.event_type, event_type);
            prop_assert_eq!(event.raw_type, name);
        }
    }
}
