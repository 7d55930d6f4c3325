//! Domain types shared by the fetcher, the evaluator and observers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use super::errors::{ObserveError, Result};

/// Time horizon over which a percentage change is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Hourly,
    Daily,
    Weekly,
}

impl WindowKind {
    /// Accepted configuration spellings
    pub const ALIASES: [&'static str; 6] = ["hourly", "hour", "daily", "day", "weekly", "week"];
}

impl FromStr for WindowKind {
    type Err = ObserveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hourly" | "hour" => Ok(WindowKind::Hourly),
            "daily" | "day" => Ok(WindowKind::Daily),
            "weekly" | "week" => Ok(WindowKind::Weekly),
            other => Err(ObserveError::Configuration(format!(
                "unknown threshold type '{}', expected one of {}",
                other,
                WindowKind::ALIASES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowKind::Hourly => write!(f, "1h"),
            WindowKind::Daily => write!(f, "24h"),
            WindowKind::Weekly => write!(f, "7d"),
        }
    }
}

/// Which way a rule looks at the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Increase,
    Decrease,
}

/// Named slot a threshold rule occupies; also the event it emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleName {
    Increase,
    Decrease,
    /// Single-threshold warning mode
    Danger,
}

impl RuleName {
    pub fn direction(&self) -> Direction {
        match self {
            RuleName::Increase => Direction::Increase,
            RuleName::Decrease | RuleName::Danger => Direction::Decrease,
        }
    }

    pub fn event_kind(&self) -> EventKind {
        match self {
            RuleName::Increase => EventKind::Increase,
            RuleName::Decrease => EventKind::Decrease,
            RuleName::Danger => EventKind::Danger,
        }
    }
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleName::Increase => write!(f, "increase"),
            RuleName::Decrease => write!(f, "decrease"),
            RuleName::Danger => write!(f, "danger"),
        }
    }
}

/// Percentage changes for one asset, captured in a single poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Asset identifier as requested (e.g. "bitcoin")
    pub asset_id: String,
    /// Signed percentage change per window; windows the source omitted are absent
    pub changes: BTreeMap<WindowKind, f64>,
    /// Human-readable asset name
    #[serde(default)]
    pub name: Option<String>,
    /// Ticker symbol (e.g. "BTC")
    #[serde(default)]
    pub symbol: Option<String>,
    /// Market-cap rank
    #[serde(default)]
    pub rank: Option<u32>,
    /// Last price in USD
    #[serde(default)]
    pub price_usd: Option<Decimal>,
    /// When the source last refreshed this ticker
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl AssetSnapshot {
    /// Create a snapshot with no changes recorded yet
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            changes: BTreeMap::new(),
            name: None,
            symbol: None,
            rank: None,
            price_usd: None,
            last_updated: None,
        }
    }

    /// Builder-style setter for a window's change
    pub fn with_change(mut self, window: WindowKind, change: f64) -> Self {
        self.changes.insert(window, change);
        self
    }

    /// Change for the given window, if the source provided one
    pub fn change(&self, window: WindowKind) -> Option<f64> {
        self.changes.get(&window).copied()
    }
}

/// Event names observers can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Data,
    Increase,
    Decrease,
    Danger,
    Error,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Data => write!(f, "data"),
            EventKind::Increase => write!(f, "increase"),
            EventKind::Decrease => write!(f, "decrease"),
            EventKind::Danger => write!(f, "danger"),
            EventKind::Error => write!(f, "error"),
        }
    }
}

/// Event delivered to observers
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Full ordered batch for a successful cycle
    Data(Arc<Vec<AssetSnapshot>>),
    /// Increase rule fired for an asset
    Increase(AssetSnapshot),
    /// Decrease rule fired for an asset
    Decrease(AssetSnapshot),
    /// Warning threshold fired for an asset
    Danger(AssetSnapshot),
    /// Fetch, parse or rule-mapping failure
    Error(Arc<ObserveError>),
}

impl WatchEvent {
    /// Build the fire event for a rule
    pub fn fired(rule: RuleName, snapshot: AssetSnapshot) -> Self {
        match rule {
            RuleName::Increase => WatchEvent::Increase(snapshot),
            RuleName::Decrease => WatchEvent::Decrease(snapshot),
            RuleName::Danger => WatchEvent::Danger(snapshot),
        }
    }

    pub fn error(err: ObserveError) -> Self {
        WatchEvent::Error(Arc::new(err))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            WatchEvent::Data(_) => EventKind::Data,
            WatchEvent::Increase(_) => EventKind::Increase,
            WatchEvent::Decrease(_) => EventKind::Decrease,
            WatchEvent::Danger(_) => EventKind::Danger,
            WatchEvent::Error(_) => EventKind::Error,
        }
    }

    /// The fired snapshot, for increase/decrease/danger events
    pub fn snapshot(&self) -> Option<&AssetSnapshot> {
        match self {
            WatchEvent::Increase(s) | WatchEvent::Decrease(s) | WatchEvent::Danger(s) => Some(s),
            _ => None,
        }
    }
}
