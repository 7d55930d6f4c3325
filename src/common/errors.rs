//! Error types for the application

use thiserror::Error;

use super::types::{RuleName, WindowKind};

/// Result type alias using our ObserveError
pub type Result<T> = std::result::Result<T, ObserveError>;

/// Main error type for observer operations
#[derive(Error, Debug)]
pub enum ObserveError {
    /// Invalid or missing configuration, raised at construction
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Asset not known to the data source
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// A rule's window is not present in the fetched snapshots
    #[error("Rule '{rule}' uses window '{window}' which the data source did not provide")]
    RuleMapping { rule: RuleName, window: WindowKind },

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ObserveError {
    /// Whether this error happened while fetching snapshots
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ObserveError::HttpRequest(_)
                | ObserveError::JsonParse(_)
                | ObserveError::InvalidResponse(_)
                | ObserveError::AssetNotFound(_)
                | ObserveError::Timeout(_)
        )
    }
}
