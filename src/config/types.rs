//! Configuration types
//!
//! [`ObserverConfig`] is the raw, deserialized shape of the config file.
//! [`ObserverConfig::validate`] turns it into an immutable [`PollConfig`]
//! or fails with a [`ObserveError::Configuration`].

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::common::duration::parse_duration;
use crate::common::errors::{ObserveError, Result};
use crate::common::types::{Direction, RuleName, WindowKind};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Asset identifiers to poll, in evaluation order
    #[serde(default)]
    pub currencies: Vec<String>,
    /// Poll interval as a duration string; absent means poll once
    #[serde(default)]
    pub frequency: Option<String>,
    /// Fires when the change rises to or above the percentage
    #[serde(default)]
    pub increase: Option<ThresholdConfig>,
    /// Fires when the change falls to or below minus the percentage
    #[serde(default)]
    pub decrease: Option<ThresholdConfig>,
    /// Single warning threshold, emitted as `danger`
    #[serde(default)]
    pub threshold: Option<ThresholdConfig>,
    /// Ticker endpoint settings
    #[serde(default)]
    pub source: SourceConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Raw threshold rule as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Window alias: hourly, hour, daily, day, weekly, week
    #[serde(rename = "type")]
    pub kind: String,
    /// Threshold in percent, 1 to 100
    pub percentage: f64,
    /// Cooldown between two alerts for the same asset
    #[serde(default)]
    pub rest: Option<String>,
}

/// Ticker REST endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the ticker API; the asset id is appended as a path segment
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_rest_url() -> String {
    "https://api.coinmarketcap.com/v1/ticker".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Stop polling after the first cycle that emits an error
    #[serde(default)]
    pub stop_on_error: bool,
    /// Buffer size for channel observers
    #[serde(default = "default_channel_size")]
    pub channel_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            stop_on_error: false,
            channel_size: default_channel_size(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_channel_size() -> usize {
    crate::common::channels::DEFAULT_CHANNEL_SIZE
}

/// Validated threshold rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    window: WindowKind,
    percentage: f64,
    cooldown: Option<Duration>,
}

impl ThresholdRule {
    /// Lowest accepted percentage
    pub const MIN_PERCENTAGE: f64 = 1.0;
    /// Highest accepted percentage
    pub const MAX_PERCENTAGE: f64 = 100.0;

    /// Create a rule, rejecting percentages outside 1..=100
    pub fn new(window: WindowKind, percentage: f64, cooldown: Option<Duration>) -> Result<Self> {
        if !(Self::MIN_PERCENTAGE..=Self::MAX_PERCENTAGE).contains(&percentage) {
            return Err(ObserveError::Configuration(format!(
                "percentage must be between 1-100, got {}",
                percentage
            )));
        }

        Ok(Self {
            window,
            percentage,
            // A zero cooldown places no restriction on firing
            cooldown: cooldown.filter(|d| !d.is_zero()),
        })
    }

    /// Validate a raw threshold from the config file
    pub fn from_config(raw: &ThresholdConfig) -> Result<Self> {
        let window: WindowKind = raw.kind.parse()?;

        let cooldown = match raw.rest.as_deref() {
            Some(rest) => Some(parse_duration(rest).ok_or_else(|| {
                ObserveError::Configuration(format!(
                    "invalid rest duration '{}'. E.g: '15m', '3h', '1d'",
                    rest
                ))
            })?),
            None => None,
        };

        Self::new(window, raw.percentage, cooldown)
    }

    pub fn window(&self) -> WindowKind {
        self.window
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Minimum time between fires; `None` means fire every time the condition holds
    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }
}

/// A threshold rule together with the slot it was configured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedRule {
    pub name: RuleName,
    pub rule: ThresholdRule,
}

impl NamedRule {
    pub fn new(name: RuleName, rule: ThresholdRule) -> Self {
        Self { name, rule }
    }

    pub fn direction(&self) -> Direction {
        self.name.direction()
    }
}

/// Validated, immutable polling configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    asset_ids: Vec<String>,
    poll_interval: Option<Duration>,
    rules: Vec<NamedRule>,
}

impl PollConfig {
    /// Create a config, rejecting empty asset or rule lists and repeated rule names
    pub fn new(
        asset_ids: Vec<String>,
        poll_interval: Option<Duration>,
        rules: Vec<NamedRule>,
    ) -> Result<Self> {
        if asset_ids.is_empty() {
            return Err(ObserveError::Configuration(
                "Please provide currencies array in config".to_string(),
            ));
        }
        if let Some(blank) = asset_ids.iter().position(|id| id.trim().is_empty()) {
            return Err(ObserveError::Configuration(format!(
                "currency at position {} is empty",
                blank
            )));
        }
        if rules.is_empty() {
            return Err(ObserveError::Configuration(
                "Please provide threshold config (increase, decrease or threshold)".to_string(),
            ));
        }
        // Cooldowns are tracked per (asset, rule name)
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|earlier| earlier.name == rule.name) {
                return Err(ObserveError::Configuration(format!(
                    "{} rule is configured more than once",
                    rule.name
                )));
            }
        }

        Ok(Self {
            asset_ids,
            poll_interval: poll_interval.filter(|d| !d.is_zero()),
            rules,
        })
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    /// Gap between the end of one cycle and the start of the next
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    pub fn rules(&self) -> &[NamedRule] {
        &self.rules
    }

    pub fn is_single_shot(&self) -> bool {
        self.poll_interval.is_none()
    }
}

impl ObserverConfig {
    /// Validate the raw config into a [`PollConfig`]
    ///
    /// Rules are ordered decrease, increase, threshold.
    pub fn validate(&self) -> Result<PollConfig> {
        if self.currencies.is_empty() {
            return Err(ObserveError::Configuration(
                "Please provide currencies array in config".to_string(),
            ));
        }

        let slots = [
            (RuleName::Decrease, &self.decrease),
            (RuleName::Increase, &self.increase),
            (RuleName::Danger, &self.threshold),
        ];

        let mut rules = Vec::with_capacity(slots.len());
        for (name, raw) in slots {
            if let Some(raw) = raw {
                let rule = ThresholdRule::from_config(raw).map_err(|e| match e {
                    ObserveError::Configuration(msg) => {
                        ObserveError::Configuration(format!("{} rule: {}", name, msg))
                    }
                    other => other,
                })?;
                rules.push(NamedRule::new(name, rule));
            }
        }

        let poll_interval = match self.frequency.as_deref() {
            Some(freq) => match parse_duration(freq) {
                Some(d) if !d.is_zero() => Some(d),
                _ => {
                    warn!(frequency = freq, "Frequency is not defined correctly, polling only once");
                    None
                }
            },
            None => {
                warn!("Frequency is not defined, polling only once");
                None
            }
        };

        PollConfig::new(self.currencies.clone(), poll_interval, rules)
    }
}
