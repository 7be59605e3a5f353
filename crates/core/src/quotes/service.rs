//! Quote aggregation service.
//!
//! Every read follows the same path: cache lookup, provider call(s) fanned out
//! in parallel, per-symbol fallback substitution, aggregation, cache store.
//! Upstream faults never fail a read; a missing provider or credential always does.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;

use stockdash_market_data::{HistoryRequest, Interval, QuoteBatch, QuoteProvider, RawProfile};

use super::cache::{CacheKey, CacheTier, CachedPayload, QuoteCache};
use super::model::{Quote, StockHistory};
use super::normalize::{canonical_symbol, display_name, fallback_quote, history_points, quote_from_raw};
use crate::constants::MAX_OUTPUT_SIZE;
use crate::errors::{Error, Result};
use crate::portfolio::{build_position_view, build_snapshot, PortfolioBook, PortfolioSnapshot};
use crate::trading::{OrderPreview, OrderRequest};

/// Read operations backing the dashboard's market endpoints.
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Quotes for the tracked symbol list, in list order.
    async fn get_stocks(&self) -> Result<Vec<Quote>>;

    /// Quote for one symbol.
    async fn get_stock(&self, symbol: &str) -> Result<Quote>;

    /// Bars for one symbol, oldest first. Upstream failure yields an empty series.
    async fn get_history(&self, symbol: &str, interval: Interval, output_size: u32)
        -> Result<StockHistory>;

    /// Every position valued at its current quote, plus totals and watchlist.
    async fn get_portfolio(&self) -> Result<PortfolioSnapshot>;

    /// Cost, fee and total of a hypothetical order.
    async fn preview_order(&self, request: OrderRequest) -> Result<OrderPreview>;
}

/// Live quotes for a symbol set, keyed by symbol.
struct AssembledQuotes {
    live: HashMap<String, Quote>,
    requested: usize,
}

impl AssembledQuotes {
    /// No symbol got live data; the payload is fallback-only
    fn degraded(&self) -> bool {
        self.live.is_empty() && self.requested > 0
    }

    fn quote_or_fallback(&self, symbol: &str, fallback_price: Decimal) -> Quote {
        self.live
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| fallback_quote(symbol, fallback_price))
    }
}

/// Quote service backed by one provider, the response cache and the static book.
pub struct QuoteService {
    provider: Option<Arc<dyn QuoteProvider>>,
    cache: Arc<QuoteCache>,
    book: Arc<PortfolioBook>,
}

impl QuoteService {
    /// Creates a new QuoteService. `provider` is `None` when no API key is configured.
    pub fn new(
        provider: Option<Arc<dyn QuoteProvider>>,
        cache: Arc<QuoteCache>,
        book: Arc<PortfolioBook>,
    ) -> Self {
        Self {
            provider,
            cache,
            book,
        }
    }

    pub fn book(&self) -> &PortfolioBook {
        &self.book
    }

    fn provider(&self) -> Result<&Arc<dyn QuoteProvider>> {
        self.provider.as_ref().ok_or(Error::NotConfigured)
    }

    /// Average cost when held, zero otherwise.
    fn fallback_price(&self, symbol: &str) -> Decimal {
        self.book
            .position(symbol)
            .map(|p| p.avg_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Fetch quotes (and profiles when the provider needs them) concurrently
    /// for each distinct symbol. Symbols missing from the result need a fallback.
    async fn load_quotes(
        &self,
        provider: &dyn QuoteProvider,
        symbols: &[String],
    ) -> Result<AssembledQuotes> {
        let mut seen = HashSet::new();
        let symbols: Vec<String> = symbols
            .iter()
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect();

        let (batch_result, profiles) = if provider.capabilities().needs_profile_lookup() {
            let profile_calls = join_all(symbols.iter().map(|s| provider.fetch_profile(s)));
            let (batch_result, profile_results) =
                futures::join!(provider.fetch_quotes(&symbols), profile_calls);

            let mut profiles: HashMap<String, RawProfile> = HashMap::new();
            for (symbol, result) in symbols.iter().zip(profile_results) {
                match result {
                    Ok(profile) => {
                        profiles.insert(symbol.clone(), profile);
                    }
                    Err(e) => debug!("Profile for {} unavailable from {}: {}", symbol, provider.id(), e),
                }
            }
            (batch_result, profiles)
        } else {
            (provider.fetch_quotes(&symbols).await, HashMap::new())
        };

        let batch = match batch_result {
            Ok(batch) => batch,
            Err(e) if !e.kind().is_recoverable() => return Err(Error::NotConfigured),
            Err(e) => {
                warn!(
                    "Quote fetch for {} symbols from {} failed ({:?}): {}",
                    symbols.len(),
                    provider.id(),
                    e.kind(),
                    e
                );
                QuoteBatch::new()
            }
        };

        let mut live = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            let built = match batch.get(symbol) {
                Some(Ok(raw)) => {
                    let quote = quote_from_raw(symbol, raw, profiles.get(symbol));
                    if quote.is_none() {
                        warn!("Unusable price for {} from {}", symbol, provider.id());
                    }
                    quote
                }
                Some(Err(e)) if !e.kind().is_recoverable() => return Err(Error::NotConfigured),
                Some(Err(e)) => {
                    warn!(
                        "Quote for {} from {} failed ({:?}): {}",
                        symbol,
                        provider.id(),
                        e.kind(),
                        e
                    );
                    None
                }
                None => {
                    warn!("No quote for {} in {} response", symbol, provider.id());
                    None
                }
            };
            if let Some(quote) = built {
                live.insert(symbol.clone(), quote);
            }
        }

        Ok(AssembledQuotes {
            live,
            requested: symbols.len(),
        })
    }

    /// One quote per symbol in request order, with fallbacks filled in.
    fn quotes_in_order(&self, assembled: &AssembledQuotes, symbols: &[String]) -> Vec<Quote> {
        symbols
            .iter()
            .map(|symbol| assembled.quote_or_fallback(symbol, self.fallback_price(symbol)))
            .collect()
    }
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn get_stocks(&self) -> Result<Vec<Quote>> {
        let provider = self.provider()?;
        let symbols = self.book.tracked_symbols();
        let key = CacheKey::stock_list(symbols);

        if let Some(CachedPayload::Quotes(quotes)) = self.cache.get(CacheTier::Live, &key).await {
            debug!("Cache hit for {}", key.as_str());
            return Ok(quotes);
        }

        let assembled = self.load_quotes(provider.as_ref(), symbols).await?;
        let quotes = self.quotes_in_order(&assembled, symbols);
        if !assembled.degraded() {
            self.cache
                .put(CacheTier::Live, key, CachedPayload::Quotes(quotes.clone()))
                .await;
        }

        Ok(quotes)
    }

    async fn get_stock(&self, symbol: &str) -> Result<Quote> {
        let provider = self.provider()?;
        let symbol = canonical_symbol(symbol)?;
        let key = CacheKey::stock(&symbol);

        if let Some(CachedPayload::Quote(quote)) = self.cache.get(CacheTier::Live, &key).await {
            debug!("Cache hit for {}", key.as_str());
            return Ok(quote);
        }

        let assembled = self
            .load_quotes(provider.as_ref(), std::slice::from_ref(&symbol))
            .await?;
        let quote = assembled.quote_or_fallback(&symbol, self.fallback_price(&symbol));

        if !assembled.degraded() {
            self.cache
                .put(CacheTier::Live, key, CachedPayload::Quote(quote.clone()))
                .await;
        }

        Ok(quote)
    }

    async fn get_history(
        &self,
        symbol: &str,
        interval: Interval,
        output_size: u32,
    ) -> Result<StockHistory> {
        let provider = self.provider()?;
        let symbol = canonical_symbol(symbol)?;
        let output_size = output_size.clamp(1, MAX_OUTPUT_SIZE);
        let key = CacheKey::history(&symbol, interval, output_size);

        if let Some(CachedPayload::History(history)) =
            self.cache.get(CacheTier::History, &key).await
        {
            debug!("Cache hit for {}", key.as_str());
            return Ok(history);
        }

        let name = display_name(&symbol, None);
        let request = HistoryRequest::new(symbol.clone(), interval, output_size);

        let bars = match provider.fetch_history(&request).await {
            Ok(bars) => bars,
            Err(e) if !e.kind().is_recoverable() => return Err(Error::NotConfigured),
            Err(e) => {
                warn!(
                    "History for {} ({}, {}) from {} failed ({:?}): {}",
                    symbol,
                    interval,
                    output_size,
                    provider.id(),
                    e.kind(),
                    e
                );
                return Ok(StockHistory::empty(symbol, name));
            }
        };

        let history = StockHistory::new(symbol, name, history_points(bars, output_size));
        if !history.is_empty() {
            self.cache
                .put(CacheTier::History, key, CachedPayload::History(history.clone()))
                .await;
        }

        Ok(history)
    }

    async fn get_portfolio(&self) -> Result<PortfolioSnapshot> {
        let provider = self.provider()?;
        let symbols = self.book.position_symbols();
        let key = CacheKey::portfolio(&symbols);

        if let Some(CachedPayload::Portfolio(snapshot)) =
            self.cache.get(CacheTier::Live, &key).await
        {
            debug!("Cache hit for {}", key.as_str());
            return Ok(snapshot);
        }

        let assembled = self.load_quotes(provider.as_ref(), &symbols).await?;
        let views = self
            .book
            .positions()
            .iter()
            .map(|position| {
                let quote = assembled.quote_or_fallback(&position.symbol, position.avg_price);
                build_position_view(position, &quote)
            })
            .collect();

        let snapshot = build_snapshot(views, self.book.watchlist().to_vec());
        if !assembled.degraded() {
            self.cache
                .put(CacheTier::Live, key, CachedPayload::Portfolio(snapshot.clone()))
                .await;
        }

        Ok(snapshot)
    }

    async fn preview_order(&self, request: OrderRequest) -> Result<OrderPreview> {
        let symbol = canonical_symbol(&request.symbol)?;
        let price = match request.price {
            Some(price) => price,
            None => self.get_stock(&symbol).await?.price,
        };

        OrderPreview::compute(&symbol, request.side, request.quantity, price)
    }
}
