//! REST endpoints
//!
//! - `POST /events`, `GET /events` - record and count events
//! - `GET /stats` - aggregate counters and log consistency

pub mod events;
pub mod stats;

use serde::Serialize;

/// Plain-text body for a rejected `POST /events`
pub const INVALID_EVENT_OR_FORMAT: &str = "Invalid event type or format!";

/// Plain-text body for a `GET /events` with an unknown `event` filter
pub const INVALID_EVENT_TYPE: &str = "Invalid event type!";

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "INTERNAL_ERROR".to_string(),
        }
    }
}
