//! crypto_observe Library
//!
//! Polls a crypto ticker endpoint on a fixed cadence and emits
//! `increase` / `decrease` / `danger` events when percentage-change
//! thresholds are crossed, with a per-asset cooldown between alerts.

pub mod coinmarketcap;
pub mod common;
pub mod config;
pub mod observer;

// Re-export commonly used types
pub use coinmarketcap::TickerRestClient;
pub use common::channels::{create_event_channel, ChannelObserver};
pub use common::errors::{ObserveError, Result};
pub use common::traits::{EventObserver, SnapshotFetcher};
pub use common::types::{AssetSnapshot, Direction, EventKind, RuleName, WatchEvent, WindowKind};
pub use config::types::{NamedRule, ObserverConfig, PollConfig, ThresholdRule};

// Observer engine
pub use observer::{
    CooldownTracker, CycleOutcome, CycleReport, ErrorPolicy, EventSink, FireDecision,
    LogObserver, Scheduler, SchedulerState,
};
