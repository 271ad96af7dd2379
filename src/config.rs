//! Collector configuration
//!
//! Settings come from a JSON file (`{"server": ..., "port": ..., "log": ...}`)
//! and can be overridden with environment variables:
//!
//! - `COLLECTOR_SERVER` - bind / connect host
//! - `COLLECTOR_PORT` - TCP port
//! - `COLLECTOR_LOG` - event log path
//! - `COLLECTOR_FSYNC` - `true`/`false`, sync the log after each batch

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CollectorError, CollectorResult};
use crate::event_log::EventLogConfig;

/// Settings shared by the collector and the producer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Host the collector binds to and producers connect to
    pub server: String,
    pub port: u16,
    /// Path of the append-only event log
    pub log: PathBuf,
    /// Sync the event log to disk before acknowledging writes
    pub fsync: bool,
    /// Queue depth in front of the event log writer
    pub channel_capacity: usize,
    /// Maximum lines per event log flush
    pub max_batch: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let log = EventLogConfig::default();
        Self {
            server: "127.0.0.1".to_string(),
            port: 5000,
            log: log.path,
            fsync: log.fsync,
            channel_capacity: log.channel_capacity,
            max_batch: log.max_batch,
        }
    }
}

impl CollectorConfig {
    /// Load from `path` (defaults if the file does not exist), then apply
    /// environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> CollectorResult<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CollectorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CollectorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CollectorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CollectorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(server) = lookup("COLLECTOR_SERVER") {
            self.server = server;
        }
        if let Some(port) = lookup("COLLECTOR_PORT") {
            self.port = parse_env("COLLECTOR_PORT", &port)?;
        }
        if let Some(log) = lookup("COLLECTOR_LOG") {
            self.log = PathBuf::from(log);
        }
        if let Some(fsync) = lookup("COLLECTOR_FSYNC") {
            self.fsync = parse_env("COLLECTOR_FSYNC", &fsync)?;
        }
        Ok(())
    }

    /// `host:port` string used for binding and for producer URLs
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    /// Base URL producers send to
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address())
    }

    pub fn event_log(&self) -> EventLogConfig {
        EventLogConfig {
            path: self.log.clone(),
            fsync: self.fsync,
            channel_capacity: self.channel_capacity,
            max_batch: self.max_batch,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> CollectorResult<T> {
    value.trim().parse().map_err(|_| CollectorError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Producer pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Number of events sent per run
    pub events: usize,
    /// Pause between consecutive events
    pub delay: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            events: 1000,
            delay: Duration::from_millis(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.address(), "127.0.0.1:5000");
        assert_eq!(config.base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.log, PathBuf::from("events.log"));
        assert!(config.fsync);
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": "0.0.0.0", "port": 8080, "log": "data/server.log"}"#)
            .unwrap();

        let config = CollectorConfig::from_file(&path).unwrap();
        assert_eq!(config.server, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log, PathBuf::from("data/server.log"));
        assert_eq!(config.max_batch, CollectorConfig::default().max_batch);
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CollectorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CollectorError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let mut config = CollectorConfig::default();
        let loaded = CollectorConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(loaded, Err(CollectorError::ConfigRead { .. })));

        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config, CollectorConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("COLLECTOR_SERVER", "10.0.0.9"),
            ("COLLECTOR_PORT", "9000"),
            ("COLLECTOR_LOG", "/tmp/x.log"),
            ("COLLECTOR_FSYNC", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = CollectorConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.address(), "10.0.0.9:9000");
        assert_eq!(config.log, PathBuf::from("/tmp/x.log"));
        assert!(!config.event_log().fsync);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = CollectorConfig::default();
        let err = config
            .apply_overrides(|name| (name == "COLLECTOR_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, CollectorError::InvalidEnv { ref name, .. } if name == "COLLECTOR_PORT"));
    }
}
