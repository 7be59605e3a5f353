//! Stockdash Core - quote aggregation, portfolio valuation and accounts.
//!
//! This crate holds the dashboard's business logic. It talks to market data
//! through the `QuoteProvider` trait from `stockdash-market-data` and to user
//! records through the [`accounts::AccountStore`] trait, which the
//! `storage-supabase` crate implements.

pub mod accounts;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod trading;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
