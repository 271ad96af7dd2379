//! Aggregation store - per-producer event counters
//!
//! Counts are kept in memory only, keyed by source address and event type.
//! Every mutation goes through [`AggregationStore::increment`], which takes
//! the write lock for the whole read-modify-write so concurrent producers
//! never lose an update.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use parking_lot::RwLock;
use serde::Serialize;

use crate::codec::ParseError;
use crate::types::EventType;

/// Per-type counters for a single source
pub type TypeCounts = BTreeMap<EventType, u64>;

/// Result of a count query
///
/// `NoData` means the source has never had an event accepted, which is
/// different from a source that was seen but has zero events of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCount {
    NoData,
    Count(u64),
}

/// Counters for one source, as reported by [`AggregationStore::snapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub source: IpAddr,
    pub total: u64,
    pub by_type: TypeCounts,
}

/// Thread-safe in-memory event counters
#[derive(Debug, Default)]
pub struct AggregationStore {
    counts: RwLock<HashMap<IpAddr, TypeCounts>>,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `event_type` for `source`
    pub fn increment(&self, source: IpAddr, event_type: EventType) {
        let mut counts = self.counts.write();
        *counts
            .entry(source)
            .or_default()
            .entry(event_type)
            .or_insert(0) += 1;
    }

    /// Total number of events recorded for `source`
    pub fn query_total(&self, source: IpAddr) -> SourceCount {
        let counts = self.counts.read();
        match counts.get(&source) {
            Some(by_type) => SourceCount::Count(by_type.values().sum()),
            None => SourceCount::NoData,
        }
    }

    /// Number of `event_type` events recorded for `source`
    ///
    /// The type name is matched case-insensitively; unknown names fail with
    /// [`ParseError::InvalidEventType`] before the counters are consulted.
    pub fn query_by_type(&self, source: IpAddr, event_type: &str) -> Result<SourceCount, ParseError> {
        let event_type: EventType = event_type.parse()?;
        Ok(self.count_of(source, event_type))
    }

    /// Typed variant of [`query_by_type`](Self::query_by_type)
    pub fn count_of(&self, source: IpAddr, event_type: EventType) -> SourceCount {
        let counts = self.counts.read();
        match counts.get(&source) {
            Some(by_type) => SourceCount::Count(by_type.get(&event_type).copied().unwrap_or(0)),
            None => SourceCount::NoData,
        }
    }

    /// Sum of all counters across all sources
    pub fn total_events(&self) -> u64 {
        self.counts
            .read()
            .values()
            .flat_map(|by_type| by_type.values())
            .sum()
    }

    /// Number of distinct sources seen so far
    pub fn source_count(&self) -> usize {
        self.counts.read().len()
    }

    /// Consistent copy of every counter, ordered by source address
    pub fn snapshot(&self) -> Vec<SourceSummary> {
        let counts = self.counts.read();
        let mut summaries: Vec<SourceSummary> = counts
            .iter()
            .map(|(source, by_type)| SourceSummary {
                source: *source,
                total: by_type.values().sum(),
                by_type: by_type.clone(),
            })
            .collect();
        summaries.sort_by_key(|s| s.source);
        summaries
    }
}
