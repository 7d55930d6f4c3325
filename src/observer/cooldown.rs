use std::collections::HashMap;
use tokio::time::{Duration, Instant};

use crate::common::types::RuleName;

/// Time since the last fire of an (asset, rule) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// The pair has never fired
    Unbounded,
    Since(Duration),
}

impl Elapsed {
    /// Whether at least `cooldown` has passed
    pub fn at_least(&self, cooldown: Duration) -> bool {
        match self {
            Elapsed::Unbounded => true,
            Elapsed::Since(elapsed) => *elapsed >= cooldown,
        }
    }
}

/// Last-fired timestamps per rule and asset
///
/// Entries are only created by [`CooldownTracker::record_fire`], so a pair
/// that never fired has no entry. Nothing is evicted; the map is bounded by
/// assets × rules of the configuration.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_fired: HashMap<RuleName, HashMap<String, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fire(&mut self, asset_id: &str, rule: RuleName, at: Instant) {
        self.last_fired
            .entry(rule)
            .or_default()
            .insert(asset_id.to_string(), at);
    }

    pub fn last_fired(&self, asset_id: &str, rule: RuleName) -> Option<Instant> {
        self.last_fired
            .get(&rule)
            .and_then(|by_asset| by_asset.get(asset_id))
            .copied()
    }

    pub fn elapsed_since(&self, asset_id: &str, rule: RuleName, now: Instant) -> Elapsed {
        match self.last_fired(asset_id, rule) {
            Some(at) => Elapsed::Since(now.saturating_duration_since(at)),
            None => Elapsed::Unbounded,
        }
    }

    /// Number of (asset, rule) pairs that have fired
    pub fn len(&self) -> usize {
        self.last_fired.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fired_is_unbounded() {
        let tracker = CooldownTracker::new();
        let now = Instant::now();
        assert_eq!(
            tracker.elapsed_since("bitcoin", RuleName::Decrease, now),
            Elapsed::Unbounded
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_elapsed_after_fire() {
        let mut tracker = CooldownTracker::new();
        let t0 = Instant::now();
        tracker.record_fire("bitcoin", RuleName::Decrease, t0);

        let elapsed = tracker.elapsed_since("bitcoin", RuleName::Decrease, t0 + Duration::from_secs(10));
        assert_eq!(elapsed, Elapsed::Since(Duration::from_secs(10)));
        assert!(!elapsed.at_least(Duration::from_secs(25)));
        assert!(elapsed.at_least(Duration::from_secs(10)));
    }

    #[test]
    fn test_pairs_are_independent() {
        let mut tracker = CooldownTracker::new();
        let t0 = Instant::now();
        tracker.record_fire("bitcoin", RuleName::Decrease, t0);

        assert_eq!(
            tracker.elapsed_since("bitcoin", RuleName::Increase, t0),
            Elapsed::Unbounded
        );
        assert_eq!(
            tracker.elapsed_since("litecoin", RuleName::Decrease, t0),
            Elapsed::Unbounded
        );
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_record_overwrites() {
        let mut tracker = CooldownTracker::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(30);
        tracker.record_fire("tron", RuleName::Danger, t0);
        tracker.record_fire("tron", RuleName::Danger, t1);

        assert_eq!(tracker.last_fired("tron", RuleName::Danger), Some(t1));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_clock_going_backwards_saturates() {
        let mut tracker = CooldownTracker::new();
        let t0 = Instant::now() + Duration::from_secs(5);
        tracker.record_fire("bitcoin", RuleName::Increase, t0);
        assert_eq!(
            tracker.elapsed_since("bitcoin", RuleName::Increase, t0 - Duration::from_secs(5)),
            Elapsed::Since(Duration::ZERO)
        );
    }
}
