//! Collector server lifecycle
//!
//! Opens the event log once, serves HTTP until a shutdown signal arrives,
//! then closes the log exactly once so buffered lines reach the disk.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::aggregation::AggregationStore;
use crate::api::{self, AppState};
use crate::config::CollectorConfig;
use crate::error::CollectorResult;
use crate::event_log::DurableLog;
use crate::service::IngestionService;

/// A bound, not yet running collector
pub struct Collector {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Collector {
    /// Open the event log and bind the listener described by `config`
    pub async fn bind(config: &CollectorConfig) -> CollectorResult<Self> {
        let log = DurableLog::open(&config.event_log()).await?;
        let service = IngestionService::new(Arc::new(AggregationStore::new()), Arc::new(log));

        let listener = match TcpListener::bind(config.address()).await {
            Ok(listener) => listener,
            Err(e) => {
                // Release the log before bailing out
                service.log().close().await?;
                return Err(e.into());
            }
        };

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(service)),
        })
    }

    pub fn local_addr(&self) -> CollectorResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Serve until `shutdown` resolves, then close the event log
    pub async fn run<F>(self, shutdown: F) -> CollectorResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        info!(%addr, name = crate::NAME, version = crate::VERSION, "collector listening");

        let served = api::serve(self.listener, Arc::clone(&self.state), shutdown).await;

        let service = &self.state.service;
        let closed = service.log().close().await;
        info!(
            events = service.store().total_events(),
            sources = service.store().source_count(),
            "collector stopped"
        );

        served?;
        if !closed? {
            warn!("event log was already closed");
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
