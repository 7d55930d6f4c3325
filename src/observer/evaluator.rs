//! Threshold evaluation for a single (asset, rule) pair

use tokio::time::{Duration, Instant};

use super::cooldown::{CooldownTracker, Elapsed};
use crate::common::types::{AssetSnapshot, Direction};
use crate::config::types::NamedRule;

/// Outcome of evaluating one rule against one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireDecision {
    /// Threshold crossed and cooldown passed; the tracker has been updated
    Fire,
    /// Threshold crossed but the pair fired too recently
    Suppressed { remaining: Duration },
    /// Threshold not crossed
    NotTriggered,
    /// The snapshot has no value for the rule's window
    Unmapped,
}

impl FireDecision {
    pub fn is_fire(&self) -> bool {
        matches!(self, FireDecision::Fire)
    }
}

/// Whether `change` crosses `percentage` in the given direction (inclusive)
pub fn crosses(direction: Direction, change: f64, percentage: f64) -> bool {
    match direction {
        Direction::Increase => change >= percentage,
        Direction::Decrease => change <= -percentage,
    }
}

/// Decide whether `rule` fires for `snapshot` at `now`
///
/// On [`FireDecision::Fire`] the tracker records `now` for the pair; no
/// other outcome touches it.
pub fn evaluate(
    snapshot: &AssetSnapshot,
    rule: &NamedRule,
    tracker: &mut CooldownTracker,
    now: Instant,
) -> FireDecision {
    let Some(change) = snapshot.change(rule.rule.window()) else {
        return FireDecision::Unmapped;
    };

    if !crosses(rule.direction(), change, rule.rule.percentage()) {
        return FireDecision::NotTriggered;
    }

    if let Some(cooldown) = rule.rule.cooldown() {
        let elapsed = tracker.elapsed_since(&snapshot.asset_id, rule.name, now);
        if !elapsed.at_least(cooldown) {
            let remaining = match elapsed {
                Elapsed::Since(e) => cooldown.saturating_sub(e),
                Elapsed::Unbounded => Duration::ZERO,
            };
            return FireDecision::Suppressed { remaining };
        }
    }

    tracker.record_fire(&snapshot.asset_id, rule.name, now);
    FireDecision::Fire
}
