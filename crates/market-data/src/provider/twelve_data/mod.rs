//! Twelve Data market data provider implementation.
//!
//! This module provides market data from the Twelve Data REST API:
//! - Batch quotes via /quote (comma-separated symbols, up to 120 per call)
//! - Time series via /time_series
//!
//! Quotes embed the company name, volume and previous close. Numeric fields
//! arrive as strings. The free tier allows 8 calls per minute, which is why
//! quotes are always requested in one batch.
//! API documentation: https://twelvedata.com/docs

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures::future::join_all;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{HistoryRequest, QuoteBatch, RawBar, RawQuote};
use crate::provider::{build_client, ProviderCapabilities, QuoteProvider, DEFAULT_UPSTREAM_TIMEOUT};

const BASE_URL: &str = "https://api.twelvedata.com";
const PROVIDER_ID: &str = "TWELVE_DATA";
const MAX_BATCH_SIZE: usize = 120;

// ============================================================================
// API Response Structures
// ============================================================================

/// One entry of a /quote response (batch value or the whole single response).
#[derive(Debug, Default, Deserialize)]
struct QuoteEntry {
    symbol: Option<String>,
    name: Option<String>,
    open: Option<Value>,
    high: Option<Value>,
    low: Option<Value>,
    close: Option<Value>,
    /// Some plans report `price` instead of `close`
    price: Option<Value>,
    previous_close: Option<Value>,
    volume: Option<Value>,
    market_cap: Option<Value>,
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}

/// Response from /time_series endpoint
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
    #[serde(default)]
    values: Vec<TimeSeriesValue>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    open: Option<Value>,
    high: Option<Value>,
    low: Option<Value>,
    close: Option<Value>,
    volume: Option<Value>,
}

// ============================================================================
// TwelveDataProvider
// ============================================================================

/// Twelve Data provider: one call fetches quotes for the whole symbol set.
pub struct TwelveDataProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataProvider {
    /// Create a new provider with the default upstream timeout.
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

    /// Make a GET request to the Twelve Data API and return the raw body.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::NotConfigured {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Twelve Data request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
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

    async fn fetch_chunk(&self, symbols: &[String]) -> Result<QuoteBatch, MarketDataError> {
        let joined = symbols.join(",");
        let text = self.fetch("/quote", &[("symbol", joined.as_str())]).await?;
        parse_quote_response(&text)
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for TwelveDataProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            batch_quotes: true,
            profiles: false,
            volume: true,
            market_cap: true,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<QuoteBatch, MarketDataError> {
        if symbols.is_empty() {
            return Ok(QuoteBatch::new());
        }

        debug!("Fetching {} quotes from Twelve Data", symbols.len());

        let chunks: Vec<&[String]> = symbols.chunks(MAX_BATCH_SIZE).collect();
        if chunks.len() == 1 {
            return self.fetch_chunk(chunks[0]).await;
        }

        let results = join_all(chunks.iter().map(|chunk| self.fetch_chunk(chunk))).await;
        Ok(merge_chunks(&chunks, results))
    }

    async fn fetch_history(&self, request: &HistoryRequest) -> Result<Vec<RawBar>, MarketDataError> {
        let output_size = request.output_size.to_string();
        let params = [
            ("symbol", request.symbol.as_str()),
            ("interval", request.interval.as_str()),
            ("outputsize", output_size.as_str()),
        ];

        debug!(
            "Fetching {} {} bars for {} from Twelve Data",
            request.output_size, request.interval, request.symbol
        );

        let text = self.fetch("/time_series", &params).await?;
        parse_time_series(&text, request.interval.is_daily_or_longer())
    }
}

/// Combine per-chunk results. Every chunk must succeed on its own for its
/// symbols to have data; a failed chunk marks each of its symbols as failed.
fn merge_chunks(
    chunks: &[&[String]],
    results: Vec<Result<QuoteBatch, MarketDataError>>,
) -> QuoteBatch {
    let mut batch = QuoteBatch::new();
    for (chunk, result) in chunks.iter().zip(results) {
        match result {
            Ok(part) => batch.extend(part),
            Err(e) => {
                warn!(
                    "Twelve Data chunk of {} symbols failed ({:?}): {}",
                    chunk.len(),
                    e.kind(),
                    e
                );
                for symbol in chunk.iter() {
                    batch.insert(
                        symbol.clone(),
                        Err(MarketDataError::provider_error(PROVIDER_ID, e.to_string())),
                    );
                }
            }
        }
    }
    batch
}

// ============================================================================
// Response normalization
// ============================================================================

/// Normalize a /quote body into a batch.
///
/// Handles both shapes: a single quote object (detected by a top-level
/// `symbol`) and an object keyed by symbol.
fn parse_quote_response(body: &str) -> Result<QuoteBatch, MarketDataError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse quote response: {}", e))
    })?;

    let object = value.as_object().ok_or_else(|| {
        MarketDataError::provider_error(PROVIDER_ID, "Quote response is not an object")
    })?;

    check_error_payload(
        object.get("status").and_then(Value::as_str),
        object.get("code").and_then(Value::as_i64),
        object.get("message").and_then(Value::as_str),
    )?;

    let mut batch = QuoteBatch::new();

    if object.get("symbol").map(Value::is_string).unwrap_or(false) {
        let entry: QuoteEntry = serde_json::from_value(value.clone()).map_err(|e| {
            MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse quote: {}", e))
        })?;
        let symbol = entry.symbol.clone().unwrap_or_default().to_uppercase();
        let quote = entry_to_quote(&symbol, entry);
        batch.insert(symbol, quote);
        return Ok(batch);
    }

    for (key, raw_entry) in object {
        let symbol = key.to_uppercase();
        let quote = match serde_json::from_value::<QuoteEntry>(raw_entry.clone()) {
            Ok(entry) => entry_to_quote(&symbol, entry),
            Err(e) => Err(MarketDataError::provider_error(
                PROVIDER_ID,
                format!("Failed to parse quote for {}: {}", symbol, e),
            )),
        };
        batch.insert(symbol, quote);
    }

    Ok(batch)
}

fn entry_to_quote(symbol: &str, entry: QuoteEntry) -> Result<RawQuote, MarketDataError> {
    if entry.status.as_deref() == Some("error") || entry.code.is_some() {
        let message = entry
            .message
            .unwrap_or_else(|| format!("Quote unavailable for {}", symbol));
        return Err(MarketDataError::provider_error(PROVIDER_ID, message));
    }

    let price = entry
        .close
        .as_ref()
        .and_then(value_to_decimal)
        .or_else(|| entry.price.as_ref().and_then(value_to_decimal));

    Ok(RawQuote {
        symbol: symbol.to_string(),
        name: entry.name.filter(|n| !n.trim().is_empty()),
        price,
        previous_close: entry.previous_close.as_ref().and_then(value_to_decimal),
        open: entry.open.as_ref().and_then(value_to_decimal),
        high: entry.high.as_ref().and_then(value_to_decimal),
        low: entry.low.as_ref().and_then(value_to_decimal),
        volume: entry.volume.as_ref().and_then(value_to_u64),
        market_cap: entry.market_cap.as_ref().and_then(value_to_decimal),
    })
}

/// Reject top-level error payloads (`{"status":"error","code":...}`).
fn check_error_payload(
    status: Option<&str>,
    code: Option<i64>,
    message: Option<&str>,
) -> Result<(), MarketDataError> {
    if status != Some("error") && code.is_none() {
        return Ok(());
    }

    match code {
        Some(429) => Err(MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        }),
        Some(401) => Err(MarketDataError::provider_error(
            PROVIDER_ID,
            "Invalid or missing API key",
        )),
        _ => Err(MarketDataError::provider_error(
            PROVIDER_ID,
            message.unwrap_or("API error").to_string(),
        )),
    }
}

fn parse_time_series(body: &str, date_only: bool) -> Result<Vec<RawBar>, MarketDataError> {
    let response: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(PROVIDER_ID, format!("Failed to parse time series response: {}", e))
    })?;

    check_error_payload(
        response.status.as_deref(),
        response.code,
        response.message.as_deref(),
    )?;

    let mut bars = Vec::with_capacity(response.values.len());
    for value in response.values {
        let Some((timestamp, has_time)) = parse_datetime(&value.datetime) else {
            warn!("Invalid datetime in time series: {}", value.datetime);
            continue;
        };

        let Some(close) = value.close.as_ref().and_then(value_to_decimal) else {
            warn!("Missing close price at {}", value.datetime);
            continue;
        };

        bars.push(RawBar {
            timestamp,
            date_only: date_only || !has_time,
            open: value.open.as_ref().and_then(value_to_decimal).unwrap_or(close),
            high: value.high.as_ref().and_then(value_to_decimal).unwrap_or(close),
            low: value.low.as_ref().and_then(value_to_decimal).unwrap_or(close),
            close,
            volume: value.volume.as_ref().and_then(value_to_u64).unwrap_or(0),
        });
    }

    Ok(bars)
}

/// Parse `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`; the flag is true when a time was present.
fn parse_datetime(raw: &str) -> Option<(NaiveDateTime, bool)> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some((ts, true));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| (ts, false))
}

fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .or_else(|| n.as_i64().map(Decimal::from)),
        _ => None,
    }
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse::<u64>().ok().or_else(|| {
            // Volumes occasionally come back as "1234.0"
            s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64)
        }),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
