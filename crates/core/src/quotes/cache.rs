//! In-memory response cache with TTL using moka

use moka::future::Cache;
use std::time::Duration;

use stockdash_market_data::Interval;

use super::model::{Quote, StockHistory};
use crate::constants::{CACHE_MAX_CAPACITY, HISTORY_CACHE_TTL, QUOTE_CACHE_TTL};
use crate::portfolio::PortfolioSnapshot;

/// Validity tier of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Live quotes: stock list, single stock, portfolio
    Live,
    /// History series
    History,
}

/// Deterministic key for one logical request.
///
/// Symbol sets are uppercased, de-duplicated and sorted, so the same set in
/// any order maps to one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn stock_list(symbols: &[String]) -> Self {
        Self(format!("stocks:{}", canonical_symbols(symbols).join(",")))
    }

    pub fn stock(symbol: &str) -> Self {
        Self(format!("stock:{}", symbol.trim().to_uppercase()))
    }

    pub fn portfolio(symbols: &[String]) -> Self {
        Self(format!("portfolio:{}", canonical_symbols(symbols).join(",")))
    }

    pub fn history(symbol: &str, interval: Interval, output_size: u32) -> Self {
        Self(format!(
            "history:{}:{}:{}",
            symbol.trim().to_uppercase(),
            interval,
            output_size
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonical_symbols(symbols: &[String]) -> Vec<String> {
    let mut canonical: Vec<String> = symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    canonical.sort();
    canonical.dedup();
    canonical
}

/// A cached response. Reads hand out clones, never the stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedPayload {
    Quotes(Vec<Quote>),
    Quote(Quote),
    History(StockHistory),
    Portfolio(PortfolioSnapshot),
}

/// Process-wide response cache with one TTL per tier.
///
/// Entries expire a fixed window after insertion; there is no other eviction
/// policy beyond the capacity bound.
pub struct QuoteCache {
    /// Live quote payloads (30 s TTL by default)
    live_cache: Cache<CacheKey, CachedPayload>,
    /// History payloads (60 s TTL by default)
    history_cache: Cache<CacheKey, CachedPayload>,
}

impl QuoteCache {
    /// Create a cache with the default TTLs.
    pub fn new() -> Self {
        Self::with_ttls(QUOTE_CACHE_TTL, HISTORY_CACHE_TTL)
    }

    /// Create a cache with custom TTLs.
    pub fn with_ttls(live_ttl: Duration, history_ttl: Duration) -> Self {
        Self {
            live_cache: Cache::builder()
                .time_to_live(live_ttl)
                .max_capacity(CACHE_MAX_CAPACITY)
                .build(),
            history_cache: Cache::builder()
                .time_to_live(history_ttl)
                .max_capacity(CACHE_MAX_CAPACITY)
                .build(),
        }
    }

    /// Get a payload; expired entries read as absent.
    pub async fn get(&self, tier: CacheTier, key: &CacheKey) -> Option<CachedPayload> {
        self.cache_for(tier).get(key).await
    }

    /// Store a payload. Last writer wins.
    pub async fn put(&self, tier: CacheTier, key: CacheKey, payload: CachedPayload) {
        self.cache_for(tier).insert(key, payload).await;
    }

    fn cache_for(&self, tier: CacheTier) -> &Cache<CacheKey, CachedPayload> {
        match tier {
            CacheTier::Live => &self.live_cache,
            CacheTier::History => &self.history_cache,
        }
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
