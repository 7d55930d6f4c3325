//! Poll scheduler driving the fetch → evaluate → emit cycle

use futures_util::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, instrument, Span};

use super::cooldown::CooldownTracker;
use super::evaluator::{evaluate, FireDecision};
use super::sink::EventSink;
use crate::common::errors::{ObserveError, Result};
use crate::common::traits::{EventObserver, SnapshotFetcher};
use crate::common::types::{AssetSnapshot, EventKind, RuleName, WatchEvent};
use crate::config::types::PollConfig;

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching,
    Evaluating,
    Sleeping(Duration),
    Terminal,
}

/// What `run` does after a cycle that emitted an `error` event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Keep polling
    #[default]
    Continue,
    /// Stop after the failing cycle
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// All snapshots fetched and evaluated
    Completed,
    /// A fetch failed; nothing was evaluated
    FetchFailed,
}

/// Summary of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Fired (asset, rule) pairs in emission order
    pub fired: Vec<(String, RuleName)>,
    /// Pairs that crossed their threshold but were still cooling down
    pub suppressed: usize,
    /// Number of `error` events emitted
    pub errors: usize,
}

impl CycleReport {
    fn fetch_failed() -> Self {
        Self {
            outcome: CycleOutcome::FetchFailed,
            fired: Vec::new(),
            suppressed: 0,
            errors: 1,
        }
    }
}

/// Polls the fetcher, evaluates every rule and emits events
///
/// Cycles never overlap: the next fetch starts only after the previous
/// cycle emitted all of its events and the poll interval elapsed.
pub struct Scheduler<F> {
    config: PollConfig,
    fetcher: F,
    tracker: CooldownTracker,
    sink: EventSink,
    state: SchedulerState,
    error_policy: ErrorPolicy,
    cycles: u64,
}

impl<F: SnapshotFetcher> Scheduler<F> {
    pub fn new(config: PollConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            tracker: CooldownTracker::new(),
            sink: EventSink::new(),
            state: SchedulerState::Idle,
            error_policy: ErrorPolicy::default(),
            cycles: 0,
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Register an observer for one event kind
    pub fn on(&mut self, kind: EventKind, observer: impl EventObserver + 'static) {
        self.sink.on(kind, observer);
    }

    /// Register an observer for every event kind
    pub fn on_any(&mut self, observer: impl EventObserver + 'static) {
        self.sink.on_any(observer);
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn tracker(&self) -> &CooldownTracker {
        &self.tracker
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Fetch every configured asset concurrently; the first failure fails the batch
    async fn fetch_all(&self) -> Result<Vec<AssetSnapshot>> {
        try_join_all(
            self.config
                .asset_ids()
                .iter()
                .map(|id| self.fetcher.fetch(id)),
        )
        .await
    }

    /// Run a single cycle and emit its events
    ///
    /// Fetch failures are reported through the `error` event only; the
    /// cooldown state is untouched and no `data` event is emitted.
    #[instrument(skip(self), fields(cycle))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        Span::current().record("cycle", self.cycles);

        self.state = SchedulerState::Fetching;
        debug!(assets = self.config.asset_ids().len(), "Fetching snapshots");

        let report = match self.fetch_all().await {
            Ok(snapshots) => {
                self.state = SchedulerState::Evaluating;
                self.evaluate_batch(snapshots, Instant::now())
            }
            Err(e) => {
                info!(error = %e, "Fetch failed, skipping evaluation");
                self.sink.emit(&WatchEvent::error(e));
                CycleReport::fetch_failed()
            }
        };

        self.state = SchedulerState::Idle;
        report
    }

    /// Evaluate a fetched batch at `now` and emit fire events followed by `data`
    fn evaluate_batch(&mut self, snapshots: Vec<AssetSnapshot>, now: Instant) -> CycleReport {
        let mut errors = 0;

        // One error per rule whose window the batch does not carry
        for rule in self.config.rules() {
            let window = rule.rule.window();
            if snapshots.iter().any(|s| s.change(window).is_none()) {
                let err = ObserveError::RuleMapping {
                    rule: rule.name,
                    window,
                };
                self.sink.emit(&WatchEvent::error(err));
                errors += 1;
            }
        }

        let mut fired = Vec::new();
        let mut events = Vec::new();
        let mut suppressed = 0;

        for snapshot in &snapshots {
            for rule in self.config.rules() {
                match evaluate(snapshot, rule, &mut self.tracker, now) {
                    FireDecision::Fire => {
                        debug!(asset = %snapshot.asset_id, rule = %rule.name, "Rule fired");
                        fired.push((snapshot.asset_id.clone(), rule.name));
                        events.push(WatchEvent::fired(rule.name, snapshot.clone()));
                    }
                    FireDecision::Suppressed { remaining } => {
                        debug!(
                            asset = %snapshot.asset_id,
                            rule = %rule.name,
                            remaining_ms = remaining.as_millis() as u64,
                            "Rule suppressed by cooldown"
                        );
                        suppressed += 1;
                    }
                    FireDecision::NotTriggered | FireDecision::Unmapped => {}
                }
            }
        }

        for event in &events {
            self.sink.emit(event);
        }
        self.sink.emit(&WatchEvent::Data(Arc::new(snapshots)));

        info!(fired = fired.len(), suppressed, errors, "Cycle complete");

        CycleReport {
            outcome: CycleOutcome::Completed,
            fired,
            suppressed,
            errors,
        }
    }

    /// Run cycles until single-shot completion or the error policy stops us
    ///
    /// Returns the total number of cycles run.
    pub async fn run(&mut self) -> u64 {
        self.run_until(std::future::pending()).await
    }

    /// Like [`Scheduler::run`], but also stops when `shutdown` resolves
    ///
    /// Shutdown is only observed between cycles; a started cycle always
    /// runs to completion.
    pub async fn run_until<S>(&mut self, shutdown: S) -> u64
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let report = self.run_cycle().await;

            if report.errors > 0 && self.error_policy == ErrorPolicy::Stop {
                info!(errors = report.errors, "Stopping after error");
                break;
            }

            let Some(interval) = self.config.poll_interval() else {
                debug!("No poll interval, single-shot run complete");
                break;
            };

            self.state = SchedulerState::Sleeping(interval);
            debug!(interval_ms = interval.as_millis() as u64, "Sleeping until next cycle");

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.state = SchedulerState::Terminal;
        self.cycles
    }
}

impl<F> std::fmt::Debug for Scheduler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("error_policy", &self.error_policy)
            .field("cycles", &self.cycles)
            .field("sink", &self.sink)
            .finish()
    }
}
