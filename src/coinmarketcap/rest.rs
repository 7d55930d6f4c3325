//! REST client for the CoinMarketCap-style ticker endpoint

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::messages::{ErrorResponse, TickerResponse};
use crate::common::errors::{ObserveError, Result};
use crate::common::traits::SnapshotFetcher;
use crate::common::types::AssetSnapshot;
use crate::config::types::SourceConfig;

/// REST client for the ticker API
///
/// Issues `GET {base_url}/{asset_id}/` and expects a JSON array whose first
/// element is the ticker for that asset.
#[derive(Debug, Clone)]
pub struct TickerRestClient {
    /// HTTP client
    client: Client,
    /// Base URL of the ticker endpoint
    base_url: Url,
}

impl TickerRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ObserveError::Configuration(format!("invalid ticker URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ObserveError::Configuration(format!(
                "ticker URL '{}' cannot be used as a base",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ObserveError::Internal(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Create a client from the `[source]` config section
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        if config.request_timeout_seconds == 0 {
            return Err(ObserveError::Configuration(
                "request_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Self::with_timeout(
            &config.rest_url,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the ticker for one asset
    fn ticker_url(&self, asset_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ObserveError::Internal("ticker URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(asset_id)
            .push("");
        Ok(url)
    }

    /// Get the raw ticker for an asset
    #[instrument(skip(self))]
    pub async fn get_ticker(&self, asset_id: &str) -> Result<TickerResponse> {
        let url = self.ticker_url(asset_id)?;
        debug!("Fetching ticker from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ObserveError::Timeout(format!("ticker request for {}", asset_id))
            } else {
                ObserveError::HttpRequest(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND {
                return Err(ObserveError::AssetNotFound(asset_id.to_string()));
            }
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ObserveError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, detail
            )));
        }

        let body = response.bytes().await?;
        let tickers: Vec<TickerResponse> = serde_json::from_slice(&body)?;
        tickers.into_iter().next().ok_or_else(|| {
            ObserveError::InvalidResponse(format!("empty ticker list for {}", asset_id))
        })
    }
}

#[async_trait]
impl SnapshotFetcher for TickerRestClient {
    async fn fetch(&self, asset_id: &str) -> Result<AssetSnapshot> {
        let ticker = self.get_ticker(asset_id).await?;
        debug!(asset_id, ticker_id = %ticker.id, "Ticker received");
        Ok(ticker.into_snapshot(asset_id))
    }

    fn source_name(&self) -> &'static str {
        "coinmarketcap"
    }
}
