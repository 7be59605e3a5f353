//! Portfolio domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A held lot: symbol, share count and average cost.
///
/// Shares and average price are strictly positive; [`Position::new`] and
/// deserialization both enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PositionInput")]
pub struct Position {
    pub symbol: String,
    pub shares: u32,
    pub avg_price: Decimal,
}

impl Position {
    pub fn new(symbol: impl Into<String>, shares: u32, avg_price: Decimal) -> Result<Self> {
        let symbol = symbol.into().trim().to_uppercase();
        if symbol.is_empty() {
            return Err(Error::InvalidInput("Position symbol is empty".to_string()));
        }
        if shares == 0 {
            return Err(Error::InvalidInput(format!(
                "Position {} must hold at least one share",
                symbol
            )));
        }
        if avg_price <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "Position {} must have a positive average price",
                symbol
            )));
        }
        Ok(Self {
            symbol,
            shares,
            avg_price,
        })
    }

    /// shares × avg_price
    pub fn total_cost(&self) -> Decimal {
        Decimal::from(self.shares) * self.avg_price
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionInput {
    symbol: String,
    shares: u32,
    avg_price: Decimal,
}

impl TryFrom<PositionInput> for Position {
    type Error = Error;

    fn try_from(input: PositionInput) -> Result<Self> {
        Position::new(input.symbol, input.shares, input.avg_price)
    }
}

/// A position joined with its current quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub shares: u32,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub total_cost: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
    pub gain_percent: Decimal,
}

/// Aggregate view of every position plus the watchlist. Derived on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain: Decimal,
    pub total_gain_percent: Decimal,
    pub positions: Vec<PositionView>,
    pub watchlist: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_position_new_normalizes_symbol() {
        let position = Position::new(" aapl ", 50, dec!(170)).unwrap();
        assert_eq!(position.symbol, "AAPL");
        assert_eq!(position.total_cost(), dec!(8500));
    }

    #[test]
    fn test_position_rejects_non_positive_values() {
        assert!(Position::new("AAPL", 0, dec!(170)).is_err());
        assert!(Position::new("AAPL", 10, dec!(0)).is_err());
        assert!(Position::new("AAPL", 10, dec!(-1)).is_err());
        assert!(Position::new("  ", 10, dec!(1)).is_err());
    }

    #[test]
    fn test_position_deserialize_validates() {
        let ok: Position =
            serde_json::from_str(r#"{"symbol":"msft","shares":30,"avgPrice":375.0}"#).unwrap();
        assert_eq!(ok.symbol, "MSFT");
        assert_eq!(ok.avg_price, dec!(375));

        let bad = serde_json::from_str::<Position>(r#"{"symbol":"MSFT","shares":0,"avgPrice":375}"#);
        assert!(bad.is_err());
    }
}
