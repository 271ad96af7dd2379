//! Ingestion service - composes the codec, the counters and the event log
//!
//! The service holds no state of its own. Recording an event appends it to
//! the durable log first and only then bumps the counters, so at any moment
//! the log holds at least as many events as the counters report.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::aggregation::{AggregationStore, SourceCount};
use crate::codec::{self, ParseError};
use crate::event_log::{DurableLog, LogError};
use crate::types::{EventType, RawEvent};

/// Errors surfaced by the ingestion service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request was malformed; nothing was recorded
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The event log could not be written; nothing was counted
    #[error("durability fault: {0}")]
    Durability(#[from] LogError),
}

/// Confirmation returned for an accepted event
#[derive(Debug, Clone)]
pub struct RecordReceipt {
    pub source: IpAddr,
    pub event_type: EventType,
}

/// Which counter a query asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    Total,
    Type(EventType),
}

impl QueryScope {
    /// Response key: `Events` for totals, the canonical type name otherwise
    pub fn label(&self) -> &'static str {
        match self {
            QueryScope::Total => "Events",
            QueryScope::Type(t) => t.as_str(),
        }
    }
}

/// Answer to a count query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The source has never had an event accepted
    NoData { source: IpAddr },
    Count { scope: QueryScope, count: u64 },
}

/// Request-facing facade over the aggregation store and the event log
#[derive(Clone)]
pub struct IngestionService {
    store: Arc<AggregationStore>,
    log: Arc<DurableLog>,
}

impl IngestionService {
    pub fn new(store: Arc<AggregationStore>, log: Arc<DurableLog>) -> Self {
        Self { store, log }
    }

    pub fn store(&self) -> &Arc<AggregationStore> {
        &self.store
    }

    pub fn log(&self) -> &Arc<DurableLog> {
        &self.log
    }

    /// Validate, persist and count one event from `source`
    pub async fn record(&self, source: IpAddr, body: &[u8]) -> Result<RecordReceipt, ServiceError> {
        let event = codec::parse(source, body).map_err(|e| {
            warn!(%source, error = %e, "rejected event");
            e
        })?;

        self.accept(&event).await?;

        Ok(RecordReceipt {
            source,
            event_type: event.event_type,
        })
    }

    /// Persist then count an already parsed event
    pub async fn accept(&self, event: &RawEvent) -> Result<(), ServiceError> {
        if let Err(e) = self.log.append(event).await {
            error!(source = %event.source, error = %e, "failed to persist event");
            return Err(e.into());
        }

        self.store.increment(event.source, event.event_type);
        debug!(source = %event.source, event_type = %event.event_type, "event recorded");
        Ok(())
    }

    /// Count events for `source`, optionally restricted to one type
    pub fn query(&self, source: IpAddr, event_type: Option<&str>) -> Result<QueryOutcome, ServiceError> {
        let scope = match event_type {
            Some(name) => QueryScope::Type(name.parse()?),
            None => QueryScope::Total,
        };

        let count = match scope {
            QueryScope::Total => self.store.query_total(source),
            QueryScope::Type(t) => self.store.count_of(source, t),
        };

        Ok(match count {
            SourceCount::NoData => QueryOutcome::NoData { source },
            SourceCount::Count(count) => QueryOutcome::Count { scope, count },
        })
    }

    /// Events written to the log but not yet reflected in the counters
    ///
    /// Zero whenever no `record` call is in flight; a persistent non-zero
    /// value means a count was lost after its line was written.
    pub fn pending(&self) -> u64 {
        self.log
            .lines_written()
            .saturating_sub(self.store.total_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventLogConfig;
    use std::net::Ipv4Addr;
    use tempfile::TempDir;

    async fn test_service(dir: &TempDir) -> IngestionService {
        let config = EventLogConfig::new(dir.path().join("events.log")).with_fsync(false);
        let log = Arc::new(DurableLog::open(&config).await.unwrap());
        IngestionService::new(Arc::new(AggregationStore::new()), log)
    }

    fn addr(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 1, 1, last))
    }

    #[tokio::test]
    async fn test_record_then_query() {
        let dir = TempDir::new().unwrap();
        let service = test_service(&dir).await;

        let receipt = service.record(addr(1), b"Alpha: one").await.unwrap();
        assert_eq!(receipt.source, addr(1));
        assert_eq!(receipt.event_type, EventType::Alpha);
        service.record(addr(1), b"beta: two").await.unwrap();

        assert_eq!(
            service.query(addr(1), None).unwrap(),
            QueryOutcome::Count { scope: QueryScope::Total, count: 2 }
        );
        assert_eq!(
            service.query(addr(1), Some("ALPHA")).unwrap(),
            QueryOutcome::Count { scope: QueryScope::Type(EventType::Alpha), count: 1 }
        );
        assert_eq!(service.pending(), 0);
    }

    #[tokio::test]
    async fn test_rejected_event_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let service = test_service(&dir).await;

        let err = service.record(addr(1), b"").await.unwrap_err();
        assert!(matches!(err, ServiceError::Parse(ParseError::EmptyBody)));
        let err = service.record(addr(1), b"Zeta: nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Parse(ParseError::InvalidEventType(_))));

        assert_eq!(service.store().total_events(), 0);
        assert_eq!(service.log().lines_written(), 0);
        assert_eq!(service.query(addr(1), None).unwrap(), QueryOutcome::NoData { source: addr(1) });
    }

    #[tokio::test]
    async fn test_query_unknown_type_is_an_error() {
        let dir = TempDir::new().unwrap();
        let service = test_service(&dir).await;
        service.record(addr(1), b"Gamma: x").await.unwrap();

        let err = service.query(addr(1), Some("Zeta")).unwrap_err();
        assert!(matches!(err, ServiceError::Parse(ParseError::InvalidEventType(_))));
        assert_eq!(service.store().total_events(), 1);
    }

    #[tokio::test]
    async fn test_durability_fault_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let service = test_service(&dir).await;
        service.log().close().await.unwrap();

        let err = service.record(addr(1), b"Delta: lost?").await.unwrap_err();
        assert!(matches!(err, ServiceError::Durability(LogError::Closed)));
        assert_eq!(service.query(addr(1), None).unwrap(), QueryOutcome::NoData { source: addr(1) });
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(QueryScope::Total.label(), "Events");
        assert_eq!(QueryScope::Type(EventType::Epsilon).label(), "Epsilon");
    }
}
