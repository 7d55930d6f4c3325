//! CoinMarketCap module - snapshot fetcher over the public ticker API

pub mod messages;
pub mod rest;

pub use rest::TickerRestClient;
