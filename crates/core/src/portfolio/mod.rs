//! Portfolio module - positions, the static book and valuation arithmetic.

mod portfolio_book;
mod portfolio_calculator;
mod portfolio_model;
mod symbol_metadata;

pub use portfolio_book::PortfolioBook;
pub use portfolio_calculator::{build_position_view, build_snapshot, percent_of};
pub use portfolio_model::{PortfolioSnapshot, Position, PositionView};
pub use symbol_metadata::{lookup_metadata, SymbolMetadata, SYMBOL_METADATA};
