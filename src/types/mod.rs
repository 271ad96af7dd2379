//! Data types shared across the collector

mod event;

pub use event::{EventType, RawEvent};
