//! Threshold observer: scheduling, evaluation and cooldowns
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FETCHING (async)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scheduler                                                  │
//! │    - Fans out one fetch per configured asset                │
//! │    - Fails the whole cycle on the first error               │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    EVALUATING (sync)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  For each asset, for each rule:                             │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  evaluate() → Fire / Suppressed / NotTriggered / Unmapped   │
//! │       │                                                     │
//! │       ▼ (if Fire)                                           │
//! │  CooldownTracker records the fire time                      │
//! │                                                             │
//! │  EventSink: fired events in asset order, then `data`        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Scheduler`]: Drives cycles on the configured interval, or once
//! - [`evaluate`]: Decides whether a rule fires for a snapshot
//! - [`CooldownTracker`]: Last-fired timestamps per (asset, rule)
//! - [`EventSink`]: Synchronous, ordered delivery to observers
//!
//! # Example
//!
//! ```ignore
//! let config = raw_config.validate()?;
//! let fetcher = TickerRestClient::from_config(&raw_config.source)?;
//!
//! let mut scheduler = Scheduler::new(config, fetcher);
//! scheduler.on(EventKind::Decrease, |event: &WatchEvent| {
//!     println!("Danger... {:?}", event.snapshot());
//! });
//! scheduler.run().await;
//! ```

mod cooldown;
mod evaluator;
mod scheduler;
mod sink;

pub use cooldown::{CooldownTracker, Elapsed};
pub use evaluator::{crosses, evaluate, FireDecision};
pub use scheduler::{CycleOutcome, CycleReport, ErrorPolicy, Scheduler, SchedulerState};
pub use sink::{EventSink, LogObserver};
