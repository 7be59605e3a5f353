//! Trading module - order previews. Nothing is executed.

mod trading_model;

pub use trading_model::{OrderPreview, OrderRequest, OrderSide, FEE_RATE};
