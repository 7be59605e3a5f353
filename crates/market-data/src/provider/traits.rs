//! Quote provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{HistoryRequest, QuoteBatch, RawBar, RawProfile};

use super::capabilities::ProviderCapabilities;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source. One
/// implementation is selected at startup and shared by every request handler.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockdash_market_data::{QuoteProvider, ProviderCapabilities};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             batch_quotes: true,
///             profiles: false,
///             volume: true,
///             market_cap: false,
///             max_batch_size: 50,
///         }
///     }
///
///     // ... implement fetch_quotes and fetch_history
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch the latest quotes for a set of uppercase symbols.
    ///
    /// An `Err` means the whole call failed and no symbol has data. Inside an
    /// `Ok` batch, each symbol succeeds or fails on its own; symbols the
    /// provider did not mention are simply absent.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch, MarketDataError>;

    /// Fetch historical bars.
    ///
    /// Bars may be returned in any order. A symbol the provider does not know
    /// yields `Ok(vec![])` or `Err(NoData)`, never a panic.
    async fn fetch_history(&self, request: &HistoryRequest)
        -> Result<Vec<RawBar>, MarketDataError>;

    /// Fetch descriptive data (name, sector, market cap).
    ///
    /// Default implementation returns `NotSupported`.
    async fn fetch_profile(&self, symbol: &str) -> Result<RawProfile, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "profile".to_string(),
            provider: self.id().to_string(),
        })
    }
}
