//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `event_collector=trace`)
pub const LOG_LEVEL_ENV: &str = "COLLECTOR_LOG_LEVEL";

/// Initialize the global tracing subscriber
///
/// Respects `COLLECTOR_LOG_LEVEL`; defaults to `info`. Calling this more
/// than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
