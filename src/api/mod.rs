//! HTTP surface of the collector
//!
//! - `POST /events` - record one event from the calling host
//! - `GET /events` - count the calling host's events
//! - `GET /stats` - counters for every host plus event log consistency
//! - `GET /health` - liveness probe

pub mod http;
pub mod rest;
pub mod state;

pub use http::{create_router, serve};
pub use state::AppState;
