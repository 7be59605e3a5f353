//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all providers implement
//! - Provider capabilities
//! - Concrete provider implementations (Twelve Data, Finnhub)
//!
//! Providers never substitute data themselves. They report what the upstream
//! said, per symbol, and leave fallback decisions to the caller.

mod capabilities;
mod traits;

pub mod finnhub;
pub mod twelve_data;

use std::time::Duration;

pub use capabilities::ProviderCapabilities;
pub use traits::QuoteProvider;

/// Timeout applied to every outbound provider call unless overridden.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bounded by `timeout`. A builder failure falls back to the
/// default client, which has no per-call timeout; the server's request
/// timeout still bounds the call.
pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to build HTTP client with {:?} timeout, using defaults: {}",
                timeout,
                e
            );
            reqwest::Client::new()
        })
}
