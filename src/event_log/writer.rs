//! Single writer task that owns the event log file

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Acknowledgement sent back to the caller once its command is handled
pub(super) type Ack = oneshot::Sender<io::Result<()>>;

/// Commands accepted by the writer task
pub(super) enum WriterCommand {
    /// Append one line (without trailing newline)
    Append { line: String, ack: Ack },
    /// Flush, sync and stop accepting commands
    Close { ack: Ack },
}

/// File operations the writer needs beyond plain writes
///
/// A failed batch is undone by truncating back to the length recorded
/// before it was written, so a torn write never prefixes a later line.
pub(super) trait LogFile: AsyncWrite + Unpin + Send + 'static {
    fn len(&self) -> impl Future<Output = io::Result<u64>> + Send;
    fn truncate(&self, len: u64) -> impl Future<Output = io::Result<()>> + Send;
    fn sync_data(&self) -> impl Future<Output = io::Result<()>> + Send;
    fn sync_all(&self) -> impl Future<Output = io::Result<()>> + Send;
}

impl LogFile for File {
    fn len(&self) -> impl Future<Output = io::Result<u64>> + Send {
        async move { Ok(self.metadata().await?.len()) }
    }

    fn truncate(&self, len: u64) -> impl Future<Output = io::Result<()>> + Send {
        self.set_len(len)
    }

    fn sync_data(&self) -> impl Future<Output = io::Result<()>> + Send {
        File::sync_data(self)
    }

    fn sync_all(&self) -> impl Future<Output = io::Result<()>> + Send {
        File::sync_all(self)
    }
}

/// Owns the log file and serializes every write to it
pub(super) struct LogWriter<F: LogFile = File> {
    file: F,
    fsync: bool,
    max_batch: usize,
    lines_written: Arc<AtomicU64>,
    /// Length to restore before the next write when a rollback failed
    rollback_to: Option<u64>,
}

impl<F: LogFile> LogWriter<F> {
    pub(super) fn new(file: F, fsync: bool, max_batch: usize, lines_written: Arc<AtomicU64>) -> Self {
        Self {
            file,
            fsync,
            max_batch: max_batch.max(1),
            lines_written,
            rollback_to: None,
        }
    }

    /// Run until a `Close` command arrives or every sender is dropped
    ///
    /// Pending appends are drained in batches so that one flush (and one
    /// sync) covers every line queued while the previous batch was written.
    pub(super) async fn run(mut self, mut rx: mpsc::Receiver<WriterCommand>) {
        let mut batch: Vec<(String, Ack)> = Vec::with_capacity(self.max_batch);

        loop {
            let mut close_ack = None;

            match rx.recv().await {
                Some(WriterCommand::Append { line, ack }) => batch.push((line, ack)),
                Some(WriterCommand::Close { ack }) => close_ack = Some(ack),
                None => {
                    // All handles dropped without an explicit close
                    if let Err(e) = self.shutdown().await {
                        error!(error = %e, "failed to flush event log on drop");
                    }
                    break;
                }
            }

            while close_ack.is_none() && batch.len() < self.max_batch {
                match rx.try_recv() {
                    Ok(WriterCommand::Append { line, ack }) => batch.push((line, ack)),
                    Ok(WriterCommand::Close { ack }) => close_ack = Some(ack),
                    Err(_) => break,
                }
            }

            if !batch.is_empty() {
                self.commit(&mut batch).await;
            }

            if let Some(ack) = close_ack {
                let _ = ack.send(self.shutdown().await);
                break;
            }
        }
    }

    /// Write a batch and acknowledge every line in it
    async fn commit(&mut self, batch: &mut Vec<(String, Ack)>) {
        match self.write_batch(batch).await {
            Ok(()) => {
                self.lines_written.fetch_add(batch.len() as u64, Ordering::SeqCst);
                debug!(lines = batch.len(), "event log batch committed");
                for (_, ack) in batch.drain(..) {
                    let _ = ack.send(Ok(()));
                }
            }
            Err(e) => {
                error!(error = %e, lines = batch.len(), "event log write failed");
                for (_, ack) in batch.drain(..) {
                    let _ = ack.send(Err(io::Error::new(e.kind(), e.to_string())));
                }
            }
        }
    }

    /// All-or-nothing write of one batch
    async fn write_batch(&mut self, batch: &[(String, Ack)]) -> io::Result<()> {
        if let Some(len) = self.rollback_to {
            self.file.truncate(len).await?;
            self.rollback_to = None;
        }

        let start = self.file.len().await?;
        let mut records = Vec::with_capacity(batch.iter().map(|(line, _)| line.len() + 1).sum());
        for (line, _) in batch {
            records.extend_from_slice(line.as_bytes());
            records.push(b'\n');
        }

        let written = async {
            self.file.write_all(&records).await?;
            self.file.flush().await?;
            if self.fsync {
                self.file.sync_data().await?;
            }
            Ok::<(), io::Error>(())
        }
        .await;

        if written.is_err() {
            if let Err(e) = self.file.truncate(start).await {
                warn!(error = %e, len = start, "event log rollback failed, retrying before next write");
                self.rollback_to = Some(start);
            }
        }
        written
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        if let Some(len) = self.rollback_to.take() {
            self.file.truncate(len).await?;
        }
        self.file.flush().await?;
        self.file.sync_all().await?;
        self.file.shutdown().await
    }
}
