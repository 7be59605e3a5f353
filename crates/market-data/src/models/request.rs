use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Parameters of a history request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Uppercase symbol
    pub symbol: String,
    pub interval: Interval,
    /// Maximum number of bars to return (most recent kept)
    pub output_size: u32,
}

impl HistoryRequest {
    pub fn new(symbol: impl Into<String>, interval: Interval, output_size: u32) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            output_size,
        }
    }
}
