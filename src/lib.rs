//! Event Collector
//!
//! A telemetry collector: producers POST typed events over HTTP, the
//! collector counts them per producer and per event type, and appends every
//! accepted event to a durable log.
//!
//! # Modules
//!
//! - `types`: Event types and the accepted event record
//! - `codec`: Parsing of the `"<EventType>: <message>"` wire format
//! - `aggregation`: Thread-safe per-producer counters
//! - `event_log`: Append-only event log with a single writer task
//! - `service`: Record/query operations composing the three above
//! - `api`: Axum router and HTTP handlers
//! - `server`: Collector lifecycle (bind, serve, graceful shutdown)
//! - `producer`: HTTP client that emits random events
//! - `config`, `logging`, `error`: Ambient setup
//!
//! # Example
//!
//! ```no_run
//! use event_collector::config::CollectorConfig;
//! use event_collector::server::{shutdown_signal, Collector};
//!
//! #[tokio::main]
//! async fn main() -> event_collector::CollectorResult<()> {
//!     let config = CollectorConfig::load("config.json")?;
//!     let collector = Collector::bind(&config).await?;
//!     collector.run(shutdown_signal()).await
//! }
//! ```

pub mod aggregation;
pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod event_log;
pub mod logging;
pub mod producer;
pub mod server;
pub mod service;
pub mod types;

// Re-export commonly used items at crate root
pub use aggregation::{AggregationStore, SourceCount};
pub use codec::ParseError;
pub use error::{CollectorError, CollectorResult};
pub use event_log::{DurableLog, EventLogConfig, LogError};
pub use service::{IngestionService, QueryOutcome, QueryScope, ServiceError};
pub use types::{EventType, RawEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
