//! Shared application state for HTTP handlers

use chrono::{DateTime, Utc};

use crate::service::IngestionService;

/// State handed to every request handler
pub struct AppState {
    /// Ingestion facade over the counters and the event log
    pub service: IngestionService,

    /// When the collector started serving
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: IngestionService) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the collector started
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}
