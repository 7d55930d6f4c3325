//! Observer registration and synchronous event delivery

use tracing::{error, info, trace, warn};

use crate::common::traits::{BoxedObserver, EventObserver};
use crate::common::types::{EventKind, WatchEvent};

struct Subscription {
    /// `None` receives every kind
    kind: Option<EventKind>,
    observer: BoxedObserver,
}

/// Delivers events to registered observers
///
/// Delivery is synchronous and follows registration order. Events emitted
/// before an observer registers are not replayed to it.
#[derive(Default)]
pub struct EventSink {
    subscriptions: Vec<Subscription>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for one event kind
    pub fn on(&mut self, kind: EventKind, observer: impl EventObserver + 'static) {
        self.subscriptions.push(Subscription {
            kind: Some(kind),
            observer: Box::new(observer),
        });
    }

    /// Register an observer for every event kind
    pub fn on_any(&mut self, observer: impl EventObserver + 'static) {
        self.subscriptions.push(Subscription {
            kind: None,
            observer: Box::new(observer),
        });
    }

    pub fn observer_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver an event; returns how many observers received it
    pub fn emit(&mut self, event: &WatchEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.kind.map_or(true, |k| k == kind))
        {
            sub.observer.on_event(event);
            delivered += 1;
        }
        trace!(%kind, delivered, "Event emitted");
        delivered
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("observers", &self.subscriptions.len())
            .finish()
    }
}

/// Observer that writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl EventObserver for LogObserver {
    fn on_event(&mut self, event: &WatchEvent) {
        match event {
            WatchEvent::Data(batch) => {
                info!(assets = batch.len(), "Received snapshot batch");
            }
            WatchEvent::Increase(s) => {
                info!(asset = %s.asset_id, changes = ?s.changes, "Increasing...");
            }
            WatchEvent::Decrease(s) | WatchEvent::Danger(s) => {
                warn!(asset = %s.asset_id, kind = %event.kind(), changes = ?s.changes, "Danger...");
            }
            WatchEvent::Error(e) => {
                error!(error = %e, "Observer error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ObserveError;
    use crate::common::types::AssetSnapshot;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> impl EventObserver {
        let log = Arc::clone(log);
        move |event: &WatchEvent| log.lock().unwrap().push(format!("{}:{}", tag, event.kind()))
    }

    #[test]
    fn test_delivery_respects_kind_and_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sink = EventSink::new();
        sink.on(EventKind::Data, recorder(&log, "a"));
        sink.on_any(recorder(&log, "b"));
        sink.on(EventKind::Error, recorder(&log, "c"));
        sink.on(EventKind::Data, recorder(&log, "d"));

        assert_eq!(sink.emit(&WatchEvent::Data(Default::default())), 3);
        assert_eq!(sink.emit(&WatchEvent::error(ObserveError::Timeout("x".into()))), 2);
        assert_eq!(
            sink.emit(&WatchEvent::Increase(AssetSnapshot::new("bitcoin"))),
            1
        );

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:data", "b:data", "d:data", "b:error", "c:error", "b:increase"]
        );
    }

    #[test]
    fn test_no_replay_for_late_observers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sink = EventSink::new();
        sink.emit(&WatchEvent::Data(Default::default()));
        sink.on_any(recorder(&log, "late"));

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(sink.observer_count(), 1);
    }

    #[test]
    fn test_log_observer_handles_every_kind() {
        let mut sink = EventSink::new();
        sink.on_any(LogObserver);
        let snap = AssetSnapshot::new("bitcoin");
        for event in [
            WatchEvent::Data(Default::default()),
            WatchEvent::Increase(snap.clone()),
            WatchEvent::Decrease(snap.clone()),
            WatchEvent::Danger(snap),
            WatchEvent::error(ObserveError::Internal("boom".into())),
        ] {
            assert_eq!(sink.emit(&event), 1);
        }
    }
}
