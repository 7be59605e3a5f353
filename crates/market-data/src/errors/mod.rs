//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all provider operations
//! - [`FailureKind`]: The coarse signal the aggregation layer acts on

mod kind;

pub use kind::FailureKind;

use thiserror::Error;

/// Errors that can occur while talking to a market data provider.
///
/// Each variant is classified into a [`FailureKind`] via [`kind`](Self::kind).
/// None of these are retried; the aggregation layer substitutes fallback data.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// No credential is configured for the provider.
    #[error("API key not configured for {provider}")]
    NotConfigured {
        /// The provider missing its key
        provider: String,
    },

    /// The provider returned nothing usable for the symbol
    /// (empty series, zeroed quote, empty profile).
    #[error("No data for symbol: {0}")]
    NoData(String),

    /// The provider rate limited the request.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider could not be reached or answered with a non-2xx status.
    #[error("Provider unavailable: {provider} - {message}")]
    Unavailable {
        /// The provider that failed
        provider: String,
        /// Transport error or HTTP status description
        message: String,
    },

    /// The provider answered but reported an error, or the body was malformed.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} not supported by {provider}")]
    NotSupported {
        /// The operation requested (e.g. "profile")
        operation: String,
        /// The provider that lacks it
        provider: String,
    },
}

impl MarketDataError {
    /// Returns the failure signal for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockdash_market_data::errors::{FailureKind, MarketDataError};
    ///
    /// let error = MarketDataError::Timeout { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.kind(), FailureKind::UpstreamUnavailable);
    ///
    /// let error = MarketDataError::NoData("ZZZZ".to_string());
    /// assert_eq!(error.kind(), FailureKind::NoData);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured { .. } => FailureKind::NotConfigured,
            Self::Timeout { .. } | Self::Unavailable { .. } => FailureKind::UpstreamUnavailable,
            Self::RateLimited { .. } | Self::ProviderError { .. } => FailureKind::UpstreamError,
            Self::NoData(_) | Self::NotSupported { .. } => FailureKind::NoData,
        }
    }

    pub(crate) fn provider_error(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Map a reqwest transport error, keeping timeouts distinct.
    pub(crate) fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Unavailable {
                provider: provider.to_string(),
                message: format!("Request failed: {}", err),
            }
        }
    }
}
