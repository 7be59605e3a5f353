//! Stockdash Market Data Crate
//!
//! Provider adapters that turn a normalized quote, history or profile request
//! into a provider-specific HTTP call and map the response back into raw,
//! provider-neutral records.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  QuoteService    |  (aggregation, cache, fallback; lives in stockdash-core)
//! +------------------+
//!          |
//!          v
//! +------------------+     +--------------------+
//! |  QuoteProvider   | --> | TwelveDataProvider |  (batch quotes, time series)
//! +------------------+     +--------------------+
//!          |
//!          +-------------> +--------------------+
//!                          |  FinnhubProvider   |  (per-symbol quotes, profiles)
//!                          +--------------------+
//!          |
//!          v
//! +------------------+
//! | RawQuote/RawBar  |  (provider-neutral, unvalidated)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteProvider`] - Capability set every adapter implements
//! - [`RawQuote`] - One symbol's quote as the provider reported it
//! - [`RawBar`] - One historical bar
//! - [`RawProfile`] - Descriptive data (name, sector, market cap)
//! - [`Interval`] - Logical bar interval shared by all providers
//! - [`MarketDataError`] / [`FailureKind`] - Failure taxonomy

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{FailureKind, MarketDataError};
pub use models::{HistoryRequest, Interval, QuoteBatch, RawBar, RawProfile, RawQuote};

pub use provider::finnhub::FinnhubProvider;
pub use provider::twelve_data::TwelveDataProvider;
pub use provider::{ProviderCapabilities, QuoteProvider, DEFAULT_UPSTREAM_TIMEOUT};
