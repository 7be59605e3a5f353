//! Finnhub market data provider implementation.
//!
//! This module provides market data from Finnhub API:
//! - Equities via /quote and /stock/candle endpoints
//! - Company profiles via /stock/profile2 endpoint
//!
//! Finnhub has no batch quote call, so a symbol set fans out into one
//! request per symbol. Quotes carry no name, volume or market cap; callers
//! fill those from profiles.
//!
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{HistoryRequest, QuoteBatch, RawBar, RawProfile, RawQuote};
use crate::provider::{build_client, ProviderCapabilities, QuoteProvider, DEFAULT_UPSTREAM_TIMEOUT};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// High price of the day
    h: Option<f64>,
    /// Low price of the day
    l: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Previous close
    pc: Option<f64>,
}

/// Response from /stock/candle endpoint
#[derive(Debug, Deserialize)]
struct CandleResponse {
    /// Status: "ok" or "no_data"
    s: String,
    /// Close prices
    #[serde(default)]
    c: Vec<f64>,
    /// High prices
    #[serde(default)]
    h: Vec<f64>,
    /// Low prices
    #[serde(default)]
    l: Vec<f64>,
    /// Open prices
    #[serde(default)]
    o: Vec<f64>,
    /// Volume
    #[serde(default)]
    v: Vec<f64>,
    /// Timestamps (Unix)
    #[serde(default)]
    t: Vec<i64>,
}

/// Response from /stock/profile2 endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    /// Company name
    name: Option<String>,
    /// Stock ticker
    ticker: Option<String>,
    /// Finnhub industry classification
    finnhub_industry: Option<String>,
    /// Market capitalization (in millions)
    market_capitalization: Option<f64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
///
/// Free tier is limited to 60 API calls per minute.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_UPSTREAM_TIMEOUT)
    }

    /// Create a new provider with a custom per-call timeout.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::NotConfigured {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        // API key goes in a header, not the query string
        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();

        // 403 is returned once the key's quota is exhausted
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::provider_error(
                PROVIDER_ID,
                "Invalid or missing API key",
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(ErrorResponse { error: Some(message) }) = serde_json::from_str(&body) {
                return Err(MarketDataError::provider_error(PROVIDER_ID, message));
            }

            return Err(MarketDataError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::provider_error(PROVIDER_ID, format!("Failed to read response: {}", e)))
    }

    async fn fetch_latest_quote(&self, symbol: &str) -> Result<RawQuote, MarketDataError> {
        let text = self.fetch("/quote", &[("symbol", symbol)]).await?;
        parse_quote(symbol, &text)
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            batch_quotes: false,
            profiles: true,
            volume: false,
            market_cap: false,
            max_batch_size: 1,
        }
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch, MarketDataError> {
        debug!("Fetching {} quotes from Finnhub", symbols.len());

        let results = join_all(symbols.iter().map(|s| self.fetch_latest_quote(s))).await;

        Ok(symbols.iter().cloned().zip(results).collect())
    }

    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Vec<RawBar>, MarketDataError> {
        let (start, end) = candle_window(Utc::now(), request);
        let from_ts = start.timestamp().to_string();
        let to_ts = end.timestamp().to_string();

        let params = [
            ("symbol", request.symbol.as_str()),
            ("resolution", request.interval.resolution()),
            ("from", from_ts.as_str()),
            ("to", to_ts.as_str()),
        ];

        debug!(
            "Fetching {} candles for {} from {} to {} from Finnhub",
            request.interval,
            request.symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let text = self.fetch("/stock/candle", &params).await?;
        let bars = parse_candles(&text, request.interval.is_daily_or_longer())?;

        Ok(keep_latest(bars, request.output_size))
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<RawProfile, MarketDataError> {
        debug!("Fetching profile for {} from Finnhub", symbol);
        let text = self.fetch("/stock/profile2", &[("symbol", symbol)]).await?;
        parse_profile(symbol, &text)
    }
}

/// `(from, to)` for a candle request ending at `now`.
fn candle_window(now: DateTime<Utc>, request: &HistoryRequest) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - request.interval.lookback(request.output_size), now)
}

/// Keep the newest `output_size` bars of an ascending series.
fn keep_latest(mut bars: Vec<RawBar>, output_size: u32) -> Vec<RawBar> {
    let keep = output_size as usize;
    if bars.len() > keep {
        bars.drain(..bars.len() - keep);
    }
    bars
}

// ============================================================================
// Response parsing
// ============================================================================

fn parse_quote(symbol: &str, body: &str) -> Result<RawQuote, MarketDataError> {
    let response: QuoteResponse = serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse quote response: {}", e))
    })?;

    // Finnhub returns zeros for unknown symbols instead of an error
    let close = response.c.unwrap_or(0.0);
    if close == 0.0 && response.pc.unwrap_or(0.0) == 0.0 {
        return Err(MarketDataError::NoData(symbol.to_string()));
    }

    Ok(RawQuote {
        symbol: symbol.to_string(),
        name: None,
        price: to_decimal(response.c),
        previous_close: to_decimal(response.pc),
        open: to_decimal(response.o),
        high: to_decimal(response.h),
        low: to_decimal(response.l),
        volume: None,
        market_cap: None,
    })
}

fn parse_candles(body: &str, date_only: bool) -> Result<Vec<RawBar>, MarketDataError> {
    let response: CandleResponse = serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse candle response: {}", e))
    })?;

    if response.s == "no_data" {
        return Ok(Vec::new());
    }

    if response.s != "ok" {
        return Err(MarketDataError::provider_error(
            PROVIDER_ID,
            format!("Unexpected candle status: {}", response.s),
        ));
    }

    let len = response.t.len();
    if response.c.len() != len
        || response.o.len() != len
        || response.h.len() != len
        || response.l.len() != len
    {
        return Err(MarketDataError::provider_error(
            PROVIDER_ID,
            "Mismatched array lengths in candle response",
        ));
    }

    let mut bars = Vec::with_capacity(len);

    for i in 0..len {
        let timestamp = match DateTime::<Utc>::from_timestamp(response.t[i], 0) {
            Some(ts) => ts.naive_utc(),
            None => {
                warn!("Invalid timestamp at index {}: {}", i, response.t[i]);
                continue;
            }
        };

        let close = match Decimal::try_from(response.c[i]) {
            Ok(d) => d,
            Err(_) => {
                warn!("Invalid close price at index {}: {}", i, response.c[i]);
                continue;
            }
        };

        bars.push(RawBar {
            timestamp,
            date_only,
            open: Decimal::try_from(response.o[i]).unwrap_or(close),
            high: Decimal::try_from(response.h[i]).unwrap_or(close),
            low: Decimal::try_from(response.l[i]).unwrap_or(close),
            close,
            volume: response
                .v
                .get(i)
                .filter(|v| **v >= 0.0)
                .map(|v| *v as u64)
                .unwrap_or(0),
        });
    }

    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(bars)
}

fn parse_profile(symbol: &str, body: &str) -> Result<RawProfile, MarketDataError> {
    // Unknown symbols come back as an empty object
    if body.trim() == "{}" {
        return Err(MarketDataError::NoData(symbol.to_string()));
    }

    let response: ProfileResponse = serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse profile response: {}", e))
    })?;

    if response.name.is_none() && response.ticker.is_none() {
        return Err(MarketDataError::NoData(symbol.to_string()));
    }

    Ok(RawProfile {
        name: response.name.filter(|n| !n.trim().is_empty()),
        sector: response.finnhub_industry.filter(|s| !s.trim().is_empty()),
        // Finnhub reports market cap in millions
        market_cap: response
            .market_capitalization
            .and_then(|mc| Decimal::try_from(mc).ok())
            .map(|mc| mc * Decimal::from(1_000_000)),
    })
}

fn to_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use crate::models::Interval;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provider_id() {
        let provider = FinnhubProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "FINNHUB");
    }

    #[test]
    fn test_provider_capabilities() {
        let provider = FinnhubProvider::new("test_key".to_string());
        let caps = provider.capabilities();
        assert!(!caps.batch_quotes);
        assert!(caps.profiles);
        assert!(!caps.volume);
        assert!(caps.needs_profile_lookup());
    }

    #[tokio::test]
    async fn test_blank_key_is_not_configured() {
        let provider = FinnhubProvider::new(String::new());

        let batch = provider.fetch_quotes(&["AAPL".to_string()]).await.unwrap();
        assert_eq!(
            batch["AAPL"].as_ref().unwrap_err().kind(),
            FailureKind::NotConfigured
        );

        let request = HistoryRequest::new("AAPL", Interval::OneDay, 5);
        let err = provider.fetch_history(&request).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotConfigured);
    }

    #[test]
    fn test_quote_parsing() {
        let json = r#"{
            "c": 150.25,
            "d": 1.50,
            "dp": 1.01,
            "h": 152.00,
            "l": 148.50,
            "o": 149.00,
            "pc": 148.75,
            "t": 1704067200
        }"#;

        let quote = parse_quote("AAPL", json).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, Some(dec!(150.25)));
        assert_eq!(quote.previous_close, Some(dec!(148.75)));
        assert_eq!(quote.open, Some(dec!(149)));
        assert_eq!(quote.high, Some(dec!(152)));
        assert_eq!(quote.low, Some(dec!(148.5)));
        assert_eq!(quote.volume, None);
    }

    #[test]
    fn test_zeroed_quote_is_no_data() {
        let json = r#"{"c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0}"#;
        let err = parse_quote("ZZZZ", json).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoData);
    }

    #[test]
    fn test_malformed_quote() {
        let err = parse_quote("AAPL", "not json").unwrap_err();
        assert_eq!(err.kind(), FailureKind::UpstreamError);
    }

    #[test]
    fn test_candle_parsing_sorts_ascending() {
        let json = r#"{
            "s": "ok",
            "c": [152.0, 150.0, 151.0],
            "h": [153.0, 151.0, 152.0],
            "l": [151.0, 149.0, 150.0],
            "o": [151.5, 149.5, 150.5],
            "v": [1200000, 1000000, 1100000],
            "t": [1704240000, 1704067200, 1704153600]
        }"#;

        let bars = parse_candles(json, true).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].label(), "2024-01-01");
        assert_eq!(bars[2].label(), "2024-01-03");
        assert_eq!(bars[0].close, dec!(150));
        assert_eq!(bars[0].volume, 1_000_000);
    }

    #[test]
    fn test_candle_window_spans_output_size_days() {
        let now = DateTime::parse_from_rfc3339("2024-03-31T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = HistoryRequest::new("AAPL", Interval::OneDay, 30);

        let (from, to) = candle_window(now, &request);
        assert_eq!(to, now);
        assert_eq!(to - from, chrono::Duration::days(30));
        assert_eq!(from.format("%Y-%m-%d").to_string(), "2024-03-01");
    }

    #[test]
    fn test_keep_latest_trims_oldest_bars() {
        let json = r#"{
            "s": "ok",
            "c": [150.0, 151.0, 152.0],
            "h": [151.0, 152.0, 153.0],
            "l": [149.0, 150.0, 151.0],
            "o": [149.5, 150.5, 151.5],
            "v": [1000000, 1100000, 1200000],
            "t": [1704067200, 1704153600, 1704240000]
        }"#;
        let bars = parse_candles(json, true).unwrap();

        let kept = keep_latest(bars.clone(), 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].label(), "2024-01-02");
        assert_eq!(kept[1].label(), "2024-01-03");

        assert_eq!(keep_latest(bars, 10).len(), 3);
    }

    #[test]
    fn test_candle_no_data_is_empty() {
        let bars = parse_candles(r#"{"s": "no_data"}"#, true).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn test_candle_mismatched_lengths() {
        let json = r#"{"s": "ok", "c": [1.0, 2.0], "h": [1.0], "l": [1.0], "o": [1.0], "t": [1704067200]}"#;
        let err = parse_candles(json, true).unwrap_err();
        assert_eq!(err.kind(), FailureKind::UpstreamError);
    }

    #[test]
    fn test_profile_parsing() {
        let json = r#"{
            "name": "Apple Inc",
            "ticker": "AAPL",
            "exchange": "NASDAQ NMS - GLOBAL MARKET",
            "currency": "USD",
            "finnhubIndustry": "Technology",
            "country": "US",
            "marketCapitalization": 2800000,
            "shareOutstanding": 15550
        }"#;

        let profile = parse_profile("AAPL", json).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Apple Inc"));
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        // Market cap converted from millions
        assert_eq!(profile.market_cap, Some(dec!(2800000000000)));
    }

    #[test]
    fn test_empty_profile_is_no_data() {
        let err = parse_profile("ZZZZ", "{}").unwrap_err();
        assert!(matches!(err, MarketDataError::NoData(_)));
    }
}
