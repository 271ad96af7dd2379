//! Event producer
//!
//! Sends a run of randomly typed events to a collector, keeping its own
//! local record of every line it sent, and can ask the collector how many
//! of its events were counted.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::codec;
use crate::config::ProducerConfig;
use crate::error::CollectorResult;
use crate::types::EventType;

/// HTTP client for one producer
pub struct Producer {
    client: reqwest::Client,
    base_url: String,
    log_path: PathBuf,
    config: ProducerConfig,
}

impl Producer {
    /// `base_url` is the collector root, e.g. `http://127.0.0.1:5000`
    pub fn new<P: AsRef<Path>>(base_url: impl Into<String>, log_path: P, config: ProducerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            log_path: log_path.as_ref().to_path_buf(),
            config,
        }
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    /// Send `config.events` events, returning how many the collector accepted
    ///
    /// Each body is also appended to the producer's local log.
    pub async fn send(&self) -> CollectorResult<usize> {
        let mut local_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;

        info!(events = self.config.events, url = %self.events_url(), "sending events");

        let mut accepted = 0;
        for i in 0..self.config.events {
            let body = codec::encode(random_event_type(), &format!("This is event {}", i));

            let response = self.client.post(self.events_url()).body(body.clone()).send().await?;
            if response.status().is_success() {
                accepted += 1;
            } else {
                warn!(status = %response.status(), %body, "event rejected");
            }

            local_log.write_all(format!("{}\n", body).as_bytes()).await?;

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        local_log.flush().await?;
        Ok(accepted)
    }

    /// Total events the collector has counted for this host
    ///
    /// `None` when the collector has no events recorded for us.
    pub async fn fetch_total(&self) -> CollectorResult<Option<u64>> {
        let text = self
            .client
            .get(self.events_url())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("Events").and_then(Value::as_u64)))
    }
}

/// Uniformly random event type
pub fn random_event_type() -> EventType {
    *EventType::ALL
        .choose(&mut rand::thread_rng())
        .unwrap_or(&EventType::Alpha)
}
