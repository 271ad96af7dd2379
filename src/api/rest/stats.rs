//! Stats endpoint - counters for every host and log consistency

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::aggregation::SourceSummary;
use crate::api::state::AppState;

/// Response for GET /stats
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Events counted across all hosts
    pub total_events: u64,
    /// Distinct hosts seen
    pub sources: usize,
    /// Lines committed to the event log since startup
    pub log_lines: u64,
    /// Lines written but not yet counted (non-zero only while requests are in flight)
    pub pending: u64,
    pub uptime_seconds: i64,
    pub log_path: String,
    pub by_source: Vec<SourceSummary>,
}

/// GET /stats - Aggregate counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = &state.service;
    let by_source = service.store().snapshot();

    Json(StatsResponse {
        total_events: by_source.iter().map(|s| s.total).sum(),
        sources: by_source.len(),
        log_lines: service.log().lines_written(),
        pending: service.pending(),
        uptime_seconds: state.uptime_seconds(),
        log_path: service.log().path().display().to_string(),
        by_source,
    })
}
