//! Quotes module - response cache, normalization and the aggregation service.

pub mod cache;
pub mod model;
pub mod normalize;
pub mod service;


pub use cache::{CacheKey, CacheTier, CachedPayload, QuoteCache};
pub use model::{HistoryPoint, LinePoint, Quote, StockHistory};
pub use normalize::{canonical_symbol, fallback_quote};
pub use service::{QuoteService, QuoteServiceTrait};
