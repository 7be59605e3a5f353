//! The static book: held positions, watchlist and tracked symbol list.

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::portfolio_model::Position;
use crate::errors::{Error, Result};

/// Positions, watchlist and the symbols shown on the stock list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBook {
    positions: Vec<Position>,
    #[serde(default)]
    watchlist: Vec<String>,
    /// Symbols for the stock list; defaults to positions then watchlist
    #[serde(default)]
    tracked_symbols: Vec<String>,
}

impl PortfolioBook {
    pub fn new(positions: Vec<Position>, watchlist: Vec<String>, tracked_symbols: Vec<String>) -> Self {
        let mut book = Self {
            positions,
            watchlist,
            tracked_symbols,
        };
        book.normalize();
        book
    }

    /// The built-in demo book.
    pub fn demo() -> Self {
        let positions = [
            ("AAPL", 50, dec!(170.00)),
            ("MSFT", 30, dec!(375.00)),
            ("GOOGL", 40, dec!(140.00)),
            ("TSLA", 25, dec!(250.00)),
            ("NVDA", 15, dec!(850.00)),
            ("META", 20, dec!(480.00)),
        ]
        .into_iter()
        .map(|(symbol, shares, avg_price)| Position {
            symbol: symbol.to_string(),
            shares,
            avg_price,
        })
        .collect();

        Self::new(
            positions,
            to_strings(&["AMZN", "JPM", "V", "JNJ"]),
            to_strings(&["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM"]),
        )
    }

    /// Parse a book from JSON. Positions are validated on the way in.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut book: PortfolioBook = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Invalid portfolio file: {}", e)))?;
        book.normalize();
        Ok(book)
    }

    /// Load a book from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading portfolio book from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("Cannot read portfolio file {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn watchlist(&self) -> &[String] {
        &self.watchlist
    }

    pub fn tracked_symbols(&self) -> &[String] {
        &self.tracked_symbols
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn position_symbols(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.symbol.clone()).collect()
    }

    fn normalize(&mut self) {
        self.watchlist = dedup_upper(&self.watchlist);
        if self.tracked_symbols.is_empty() {
            let mut tracked = self.position_symbols();
            tracked.extend(self.watchlist.iter().cloned());
            self.tracked_symbols = tracked;
        }
        self.tracked_symbols = dedup_upper(&self.tracked_symbols);
    }
}

impl Default for PortfolioBook {
    fn default() -> Self {
        Self::demo()
    }
}

fn to_strings(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// Uppercase, drop blanks and repeats, keep first-seen order.
fn dedup_upper(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}
