//! Core error types for the stock dashboard.
//!
//! Provider and store failures are wrapped so the HTTP layer can map every
//! error to a status code from one place.

use thiserror::Error;

use crate::accounts::AccountError;
use stockdash_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the dashboard services.
#[derive(Error, Debug)]
pub enum Error {
    /// No market data credential is configured. Never substituted by fallback data.
    #[error("API key not configured")]
    NotConfigured,

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Account operation failed: {0}")]
    Account(#[from] AccountError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_message_is_fixed() {
        assert_eq!(Error::NotConfigured.to_string(), "API key not configured");
    }

    #[test]
    fn test_account_error_converts() {
        let err: Error = AccountError::Unauthorized.into();
        assert!(matches!(err, Error::Account(AccountError::Unauthorized)));
    }
}
