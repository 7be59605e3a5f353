//! Market data models
//!
//! - `raw` - Provider-neutral records (RawQuote, RawBar, RawProfile, QuoteBatch)
//! - `interval` - Logical bar interval and its provider encodings
//! - `request` - History request parameters

mod interval;
mod raw;
mod request;

pub use interval::Interval;
pub use raw::{QuoteBatch, RawBar, RawProfile, RawQuote};
pub use request::HistoryRequest;
