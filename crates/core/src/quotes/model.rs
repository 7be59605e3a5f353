//! Quote and history payloads served to the dashboard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalized price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Uppercase canonical symbol
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub previous_close: Decimal,
    /// price − previous_close
    pub change: Decimal,
    /// change / previous_close × 100, zero when previous_close is zero
    pub change_percent: Decimal,
    /// Zero when the provider does not report volume
    pub volume: u64,
    /// Zero when unknown
    pub market_cap: Decimal,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
}

/// One bar of a history series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` for intraday intervals
    pub date: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Close-only point for line charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: String,
    pub price: Decimal,
}

impl From<&HistoryPoint> for LinePoint {
    fn from(point: &HistoryPoint) -> Self {
        Self {
            date: point.date.clone(),
            price: point.close,
        }
    }
}

/// History for one symbol, oldest bar first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHistory {
    pub symbol: String,
    pub name: String,
    pub line_data: Vec<LinePoint>,
    pub candle_data: Vec<HistoryPoint>,
}

impl StockHistory {
    /// Build both chart views from one ascending series.
    pub fn new(symbol: String, name: String, points: Vec<HistoryPoint>) -> Self {
        Self {
            symbol,
            name,
            line_data: points.iter().map(LinePoint::from).collect(),
            candle_data: points,
        }
    }

    pub fn empty(symbol: String, name: String) -> Self {
        Self::new(symbol, name, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.candle_data.is_empty()
    }
}
