//! Ticker API message types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::common::types::{AssetSnapshot, WindowKind};

/// Numeric field that the API sends either as a string or as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumericField::Number(n) => Some(*n),
            NumericField::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            NumericField::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            NumericField::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumericField::Number(n) => Some(*n as i64),
            NumericField::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One ticker entry; the endpoint returns a one-element array of these
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub rank: Option<NumericField>,
    #[serde(default)]
    pub price_usd: Option<NumericField>,
    #[serde(default)]
    pub percent_change_1h: Option<NumericField>,
    #[serde(default)]
    pub percent_change_24h: Option<NumericField>,
    #[serde(default)]
    pub percent_change_7d: Option<NumericField>,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub last_updated: Option<NumericField>,
}

impl TickerResponse {
    /// Change field for a window, if present and numeric
    pub fn change(&self, window: WindowKind) -> Option<f64> {
        let field = match window {
            WindowKind::Hourly => &self.percent_change_1h,
            WindowKind::Daily => &self.percent_change_24h,
            WindowKind::Weekly => &self.percent_change_7d,
        };
        field.as_ref().and_then(NumericField::as_f64)
    }

    /// Convert into the unified snapshot type, keyed by the requested id
    pub fn into_snapshot(self, asset_id: &str) -> AssetSnapshot {
        let mut snapshot = AssetSnapshot::new(asset_id);
        for window in [WindowKind::Hourly, WindowKind::Daily, WindowKind::Weekly] {
            if let Some(change) = self.change(window) {
                snapshot.changes.insert(window, change);
            }
        }

        snapshot.rank = self
            .rank
            .as_ref()
            .and_then(NumericField::as_i64)
            .and_then(|r| u32::try_from(r).ok());
        snapshot.price_usd = self.price_usd.as_ref().and_then(NumericField::as_decimal);
        snapshot.last_updated = self
            .last_updated
            .as_ref()
            .and_then(NumericField::as_i64)
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));
        snapshot.name = self.name;
        snapshot.symbol = self.symbol;
        snapshot
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const BITCOIN: &str = r#"[{
        "id": "bitcoin",
        "name": "Bitcoin",
        "symbol": "BTC",
        "rank": "1",
        "price_usd": "6512.34",
        "percent_change_1h": "0.12",
        "percent_change_24h": "-6.01",
        "percent_change_7d": null,
        "last_updated": "1530000000"
    }]"#;

    #[test]
    fn test_parse_ticker() {
        let tickers: Vec<TickerResponse> = serde_json::from_str(BITCOIN).unwrap();
        let snapshot = tickers.into_iter().next().unwrap().into_snapshot("bitcoin");

        assert_eq!(snapshot.asset_id, "bitcoin");
        assert_eq!(snapshot.change(WindowKind::Hourly), Some(0.12));
        assert_eq!(snapshot.change(WindowKind::Daily), Some(-6.01));
        assert_eq!(snapshot.change(WindowKind::Weekly), None);
        assert_eq!(snapshot.symbol.as_deref(), Some("BTC"));
        assert_eq!(snapshot.rank, Some(1));
        assert_eq!(snapshot.price_usd, Some(dec!(6512.34)));
        assert_eq!(snapshot.last_updated.map(|t| t.timestamp()), Some(1_530_000_000));
    }

    #[test]
    fn test_numeric_fields_accept_numbers() {
        let json = r#"{"id": "tron", "percent_change_24h": 7.5, "rank": 12}"#;
        let ticker: TickerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.change(WindowKind::Daily), Some(7.5));
        assert_eq!(ticker.into_snapshot("tron").rank, Some(12));
    }

    #[test]
    fn test_garbage_change_is_dropped() {
        let json = r#"{"id": "tron", "percent_change_1h": "n/a"}"#;
        let ticker: TickerResponse = serde_json::from_str(json).unwrap();
        assert!(ticker.into_snapshot("tron").changes.is_empty());
    }
}
