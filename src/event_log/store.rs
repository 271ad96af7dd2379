//! DurableLog - handle to the append-only event log

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::fs::OpenOptions;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use super::writer::{LogWriter, WriterCommand};
use crate::types::RawEvent;

/// Configuration for the event log
#[derive(Debug, Clone)]
pub struct EventLogConfig {
    /// Path to the log file
    pub path: PathBuf,
    /// Sync file data to disk before acknowledging a batch
    pub fsync: bool,
    /// Capacity of the channel feeding the writer task
    pub channel_capacity: usize,
    /// Maximum number of lines written per flush
    pub max_batch: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("events.log"),
            fsync: true,
            channel_capacity: 1024,
            max_batch: 64,
        }
    }
}

impl EventLogConfig {
    /// Create config with a custom log path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}

/// Result type for event log operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while writing the event log
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("event log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event log is closed")]
    Closed,

    #[error("event log writer stopped unexpectedly")]
    WriterGone,
}

/// Shared handle to the append-only event log
///
/// Cheap to share behind an `Arc`; all writes are funnelled through a
/// single writer task, so concurrent appends never interleave.
pub struct DurableLog {
    path: PathBuf,
    tx: mpsc::Sender<WriterCommand>,
    writer: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    lines_written: Arc<AtomicU64>,
}

impl DurableLog {
    /// Open (or create) the log file in append mode and start the writer
    ///
    /// Existing contents are never truncated.
    pub async fn open(config: &EventLogConfig) -> LogResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .await?;

        let lines_written = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let writer = LogWriter::new(file, config.fsync, config.max_batch, Arc::clone(&lines_written));
        let handle = tokio::spawn(writer.run(rx));

        info!(path = %config.path.display(), fsync = config.fsync, "event log opened");

        Ok(Self {
            path: config.path.clone(),
            tx,
            writer: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
            lines_written,
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines this handle has committed to the file
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Append one event and wait until it has been flushed
    pub async fn append(&self, event: &RawEvent) -> LogResult<()> {
        self.append_line(event.log_line()).await
    }

    async fn append_line(&self, line: String) -> LogResult<()> {
        if self.is_closed() {
            return Err(LogError::Closed);
        }

        let (ack, done) = oneshot::channel();
        self.tx
            .send(WriterCommand::Append { line, ack })
            .await
            .map_err(|_| LogError::Closed)?;

        // The writer drops pending acks if it stops mid-queue
        done.await.map_err(|_| LogError::Closed)??;
        Ok(())
    }

    /// Flush and close the log
    ///
    /// Returns `Ok(true)` for the call that actually closed the file and
    /// `Ok(false)` for every later call.
    pub async fn close(&self) -> LogResult<bool> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let (ack, done) = oneshot::channel();
        let flushed = match self.tx.send(WriterCommand::Close { ack }).await {
            Ok(()) => done.await.map_err(|_| LogError::WriterGone)?,
            Err(_) => return Err(LogError::WriterGone),
        };

        let handle = self.writer.lock().take();
        if let Some(handle) = handle {
            handle.await.map_err(|_| LogError::WriterGone)?;
        }

        flushed?;
        info!(path = %self.path.display(), lines = self.lines_written(), "event log closed");
        Ok(true)
    }

    /// Read every line currently in the log file at `path`
    pub async fn read_lines<P: AsRef<Path>>(path: P) -> LogResult<Vec<String>> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(path).await?;
        Ok(content.lines().map(str::to_string).collect())
    }
}
