//! Order preview models.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Flat fee charged on the order value (0.1 %).
pub const FEE_RATE: Decimal = dec!(0.001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A buy/sell ticket as submitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    /// Limit price; the current quote is used when absent
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Estimated cost of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreview {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub price: Decimal,
    pub estimated_cost: Decimal,
    pub estimated_fee: Decimal,
    /// Cost plus fee for buys, cost minus fee for sells
    pub total: Decimal,
}

impl OrderPreview {
    pub fn compute(symbol: &str, side: OrderSide, quantity: u32, price: Decimal) -> Result<Self> {
        if quantity == 0 {
            return Err(Error::InvalidInput("Quantity must be greater than zero".to_string()));
        }
        if price <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!("No usable price for {}", symbol)));
        }

        let too_large = || Error::InvalidInput("Order value too large".to_string());
        let estimated_cost = price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(too_large)?;
        let estimated_fee = estimated_cost.checked_mul(FEE_RATE).ok_or_else(too_large)?;
        let total = match side {
            OrderSide::Buy => estimated_cost.checked_add(estimated_fee),
            OrderSide::Sell => estimated_cost.checked_sub(estimated_fee),
        }
        .ok_or_else(too_large)?;

        Ok(Self {
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            estimated_cost,
            estimated_fee,
            total,
        })
    }
}
