//! Turn raw provider records into dashboard payloads.

use rust_decimal::Decimal;
use stockdash_market_data::{RawBar, RawProfile, RawQuote};

use super::model::{HistoryPoint, Quote};
use crate::constants::UNKNOWN_SECTOR;
use crate::errors::{Error, Result};
use crate::portfolio::{lookup_metadata, percent_of};

const MAX_SYMBOL_LEN: usize = 20;

/// Trim and uppercase a caller-supplied symbol, rejecting anything that
/// cannot be a ticker.
pub fn canonical_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '/'));
    if !valid {
        return Err(Error::InvalidInput(format!("Invalid symbol: {}", raw.trim())));
    }
    Ok(symbol)
}

/// Static metadata name, then the provider's name, then the symbol.
pub fn display_name(symbol: &str, provided: Option<&str>) -> String {
    lookup_metadata(symbol)
        .map(|m| m.name.to_string())
        .or_else(|| provided.map(str::to_string))
        .unwrap_or_else(|| symbol.to_string())
}

/// Static metadata sector, then the provider's sector, then "Unknown".
pub fn display_sector(symbol: &str, provided: Option<&str>) -> String {
    lookup_metadata(symbol)
        .map(|m| m.sector.to_string())
        .or_else(|| provided.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SECTOR.to_string())
}

/// Build a quote from a provider record.
///
/// Returns `None` when the record has no usable price, so the caller can
/// substitute a fallback.
pub fn quote_from_raw(symbol: &str, raw: &RawQuote, profile: Option<&RawProfile>) -> Option<Quote> {
    let price = raw.usable_price()?;
    let previous_close = raw.previous_close.unwrap_or(price);
    let change = price - previous_close;

    let provided_name = raw
        .name
        .as_deref()
        .or_else(|| profile.and_then(|p| p.name.as_deref()));
    let provided_sector = profile.and_then(|p| p.sector.as_deref());
    let market_cap = raw
        .market_cap
        .or_else(|| profile.and_then(|p| p.market_cap))
        .filter(|mc| *mc > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO);

    Some(Quote {
        symbol: symbol.to_string(),
        name: display_name(symbol, provided_name),
        price,
        previous_close,
        change,
        change_percent: percent_of(change, previous_close),
        volume: raw.volume.unwrap_or(0),
        market_cap,
        sector: display_sector(symbol, provided_sector),
        open: raw.open,
        high: raw.high,
        low: raw.low,
    })
}

/// Synthetic quote priced at `price` with no movement.
pub fn fallback_quote(symbol: &str, price: Decimal) -> Quote {
    Quote {
        symbol: symbol.to_string(),
        name: display_name(symbol, None),
        price,
        previous_close: price,
        change: Decimal::ZERO,
        change_percent: Decimal::ZERO,
        volume: 0,
        market_cap: Decimal::ZERO,
        sector: display_sector(symbol, None),
        open: None,
        high: None,
        low: None,
    }
}

/// Order bars oldest first, collapse repeated timestamps and keep the most
/// recent `output_size`.
pub fn history_points(mut bars: Vec<RawBar>, output_size: u32) -> Vec<HistoryPoint> {
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    // Later duplicates win
    bars.reverse();
    bars.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
    bars.reverse();

    let keep = output_size as usize;
    if bars.len() > keep {
        bars.drain(..bars.len() - keep);
    }

    bars.into_iter()
        .map(|bar| HistoryPoint {
            date: bar.label(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> RawBar {
        RawBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            date_only: true,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
        }
    }

    #[test]
    fn test_canonical_symbol() {
        assert_eq!(canonical_symbol(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(canonical_symbol("aapl").unwrap(), "AAPL");
        assert!(canonical_symbol("").is_err());
        assert!(canonical_symbol("AAPL;DROP").is_err());
        assert!(canonical_symbol(&"A".repeat(21)).is_err());
    }

    #[test]
    fn test_quote_from_raw_computes_change() {
        let mut raw = RawQuote::new("AAPL");
        raw.name = Some("Apple Inc".to_string());
        raw.price = Some(dec!(200));
        raw.previous_close = Some(dec!(190));
        raw.volume = Some(1000);

        let quote = quote_from_raw("AAPL", &raw, None).unwrap();
        assert_eq!(quote.change, dec!(10));
        assert_eq!(quote.change_percent.round_dp(4), dec!(5.2632));
        // Static metadata wins over the provider's name
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.sector, "Technology");
        assert_eq!(quote.volume, 1000);
    }

    #[test]
    fn test_missing_previous_close_means_no_change() {
        let mut raw = RawQuote::new("XYZ");
        raw.price = Some(dec!(12.5));

        let quote = quote_from_raw("XYZ", &raw, None).unwrap();
        assert_eq!(quote.previous_close, dec!(12.5));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.name, "XYZ");
        assert_eq!(quote.sector, "Unknown");
        assert_eq!(quote.market_cap, Decimal::ZERO);
    }

    #[test]
    fn test_zero_previous_close_gives_zero_percent() {
        let mut raw = RawQuote::new("XYZ");
        raw.price = Some(dec!(5));
        raw.previous_close = Some(Decimal::ZERO);

        let quote = quote_from_raw("XYZ", &raw, None).unwrap();
        assert_eq!(quote.change, dec!(5));
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_unusable_price_yields_none() {
        let mut raw = RawQuote::new("AAPL");
        assert!(quote_from_raw("AAPL", &raw, None).is_none());
        raw.price = Some(Decimal::ZERO);
        assert!(quote_from_raw("AAPL", &raw, None).is_none());
    }

    #[test]
    fn test_profile_fills_missing_fields() {
        let mut raw = RawQuote::new("ROKU");
        raw.price = Some(dec!(70));
        let profile = RawProfile {
            name: Some("Roku Inc".to_string()),
            sector: Some("Media".to_string()),
            market_cap: Some(dec!(10000000000)),
        };

        let quote = quote_from_raw("ROKU", &raw, Some(&profile)).unwrap();
        assert_eq!(quote.name, "Roku Inc");
        assert_eq!(quote.sector, "Media");
        assert_eq!(quote.market_cap, dec!(10000000000));
    }

    #[test]
    fn test_fallback_quote() {
        let quote = fallback_quote("TSLA", dec!(250));
        assert_eq!(quote.price, dec!(250));
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.name, "Tesla, Inc.");
        assert_eq!(quote.sector, "Consumer Cyclical");
    }

    #[test]
    fn test_history_points_sorted_deduped_and_trimmed() {
        let bars = vec![
            bar(5, dec!(5)),
            bar(3, dec!(3)),
            bar(4, dec!(4)),
            bar(3, dec!(33)),
            bar(1, dec!(1)),
        ];

        let points = history_points(bars, 3);
        let dates: Vec<_> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-04", "2024-01-05"]);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_history_points_empty() {
        assert!(history_points(Vec::new(), 30).is_empty());
    }
}
