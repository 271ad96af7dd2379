//! Durable event log
//!
//! Every accepted event is appended as one line to a single append-only
//! file. The file is owned by one writer task; request handlers never touch
//! it directly, they send lines over a channel and wait for the writer to
//! acknowledge them.
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────┐   mpsc    ┌────────────┐    ┌──────────────┐    ┌──────────┐
//! │ handler  │──────────►│ LogWriter  │───►│ write batch  │───►│ flush +  │
//! │ append() │◄──────────│ (one task) │    │ (≤ max_batch)│    │ sync     │
//! └──────────┘  oneshot  └────────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! An `Ok` from [`DurableLog::append`] means the line has been flushed to
//! the file (and synced, unless `fsync` is disabled).

mod store;
mod writer;

pub use store::{DurableLog, EventLogConfig, LogError, LogResult};
