//! Trait definitions for the data source and event observers

use async_trait::async_trait;

use super::errors::Result;
use super::types::{AssetSnapshot, WatchEvent};

/// Trait for market data sources
///
/// Implementations return the latest percentage changes for one asset.
/// Any transport failure, non-success status or unparseable payload is
/// reported as an error; the scheduler treats them all alike.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch the current snapshot for a single asset
    ///
    /// # Arguments
    /// * `asset_id` - Identifier understood by the data source (e.g. "bitcoin")
    async fn fetch(&self, asset_id: &str) -> Result<AssetSnapshot>;

    /// Name of the data source, used in logs
    fn source_name(&self) -> &'static str {
        "unknown"
    }
}

/// Trait for receiving events from the scheduler
///
/// Called synchronously from the emission step, so implementations
/// should not block.
pub trait EventObserver: Send {
    /// Handle a single event
    fn on_event(&mut self, event: &WatchEvent);
}

impl<F> EventObserver for F
where
    F: FnMut(&WatchEvent) + Send,
{
    fn on_event(&mut self, event: &WatchEvent) {
        self(event)
    }
}

/// Boxed observer for dynamic dispatch
pub type BoxedObserver = Box<dyn EventObserver>;
