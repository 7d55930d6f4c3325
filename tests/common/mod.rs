//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use crypto_observe::common::errors::{ObserveError, Result};
use crypto_observe::common::traits::{EventObserver, SnapshotFetcher};
use crypto_observe::common::types::{AssetSnapshot, WatchEvent, WindowKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Fetcher serving daily changes from a shared, mutable table
#[derive(Clone, Default)]
pub struct FakeFetcher {
    daily: Arc<Mutex<HashMap<String, f64>>>,
    failing: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl FakeFetcher {
    pub fn new(daily: &[(&str, f64)]) -> Self {
        let fetcher = Self::default();
        for (id, change) in daily {
            fetcher.set_daily(id, *change);
        }
        fetcher
    }

    /// Make every fetch take `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_daily(&self, asset_id: &str, change: f64) {
        self.daily.lock().unwrap().insert(asset_id.to_string(), change);
    }

    /// Fail fetches for `asset_id` until cleared with `None`
    pub fn fail_on(&self, asset_id: Option<&str>) {
        *self.failing.lock().unwrap() = asset_id.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotFetcher for FakeFetcher {
    async fn fetch(&self, asset_id: &str) -> Result<AssetSnapshot> {
        self.calls
            .lock()
            .unwrap()
            .push((asset_id.to_string(), Instant::now()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().as_deref() == Some(asset_id) {
            return Err(ObserveError::InvalidResponse(format!(
                "Server returned status 503 Service Unavailable: {}",
                asset_id
            )));
        }

        let change = self.daily.lock().unwrap().get(asset_id).copied();
        match change {
            Some(change) => Ok(AssetSnapshot::new(asset_id).with_change(WindowKind::Daily, change)),
            None => Err(ObserveError::AssetNotFound(asset_id.to_string())),
        }
    }

    fn source_name(&self) -> &'static str {
        "fake"
    }
}

/// Observer recording events as "kind" or "kind:asset"
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl EventObserver for EventLog {
    fn on_event(&mut self, event: &WatchEvent) {
        let entry = match event.snapshot() {
            Some(s) => format!("{}:{}", event.kind(), s.asset_id),
            None => event.kind().to_string(),
        };
        self.entries.lock().unwrap().push(entry);
    }
}

/// Sample API responses for testing
pub mod api_responses {
    /// Ticker for bitcoin, down 6% over 24h
    pub const BITCOIN_DOWN: &str = r#"[{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "BTC",
        "rank": "1",
        "price_usd": "6512.34",
        "percent_change_1h": "-0.41",
        "percent_change_24h": "-6.0",
        "percent_change_7d": "-9.12",
        "last_updated": "1530000000"
    }]"#;

    /// Ticker for litecoin, up 5% over 24h
    pub const LITECOIN_UP: &str = r#"[{
        "id": "litecoin",
        "name": "Litecoin",
        "symbol": "LTC",
        "rank": "6",
        "price_usd": "81.20",
        "percent_change_1h": "0.3",
        "percent_change_24h": "5.0",
        "percent_change_7d": "1.1",
        "last_updated": "1530000000"
    }]"#;

    /// Ticker for tron with no weekly change reported
    pub const TRON_NO_WEEKLY: &str = r#"[{
        "id": "tron",
        "name": "TRON",
        "symbol": "TRX",
        "rank": "10",
        "price_usd": "0.035",
        "percent_change_1h": "0.0",
        "percent_change_24h": "1.2",
        "percent_change_7d": null,
        "last_updated": "1530000000"
    }]"#;

    /// Error body for unknown ids
    pub const NOT_FOUND: &str = r#"{"error": "id not found"}"#;
}
