use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Quotes keyed by requested symbol.
///
/// A symbol missing from the map means the provider returned nothing for it;
/// an `Err` entry means that symbol's call failed on its own.
pub type QuoteBatch = HashMap<String, Result<RawQuote, MarketDataError>>;

/// One symbol's quote as reported by a provider, before validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Symbol as echoed by the provider
    pub symbol: String,

    /// Display name when the provider embeds it in the quote
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Current or last traded price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Session volume (absent on providers that do not report it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
}

impl RawQuote {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// The price if it is usable for valuation (present and strictly positive).
    pub fn usable_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ZERO)
    }
}

/// One historical bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// Bar start, naive in the exchange's local time
    pub timestamp: NaiveDateTime,
    /// True when the bar covers a whole session or longer
    pub date_only: bool,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl RawBar {
    /// ISO label for the bar: `YYYY-MM-DD` for daily and longer bars,
    /// `YYYY-MM-DD HH:MM:SS` for intraday bars.
    pub fn label(&self) -> String {
        if self.date_only {
            self.timestamp.format("%Y-%m-%d").to_string()
        } else {
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }
}

/// Descriptive data for a symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    /// Market capitalization in currency units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_usable_price_rejects_zero_and_missing() {
        let mut quote = RawQuote::new("AAPL");
        assert_eq!(quote.usable_price(), None);

        quote.price = Some(Decimal::ZERO);
        assert_eq!(quote.usable_price(), None);

        quote.price = Some(dec!(-1));
        assert_eq!(quote.usable_price(), None);

        quote.price = Some(dec!(189.50));
        assert_eq!(quote.usable_price(), Some(dec!(189.50)));
    }

    #[test]
    fn test_bar_label() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut bar = RawBar {
            timestamp: ts,
            date_only: true,
            open: dec!(1),
            high: dec!(1),
            low: dec!(1),
            close: dec!(1),
            volume: 0,
        };
        assert_eq!(bar.label(), "2024-01-15");

        bar.date_only = false;
        assert_eq!(bar.label(), "2024-01-15 09:30:00");
    }
}
