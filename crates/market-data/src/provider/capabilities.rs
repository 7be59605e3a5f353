//! Provider capabilities.
//!
//! Describes what a provider can do so the aggregation layer can plan its
//! calls without inspecting the concrete provider type.

/// Describes the capabilities of a quote provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// One network call returns quotes for many symbols.
    pub batch_quotes: bool,

    /// `fetch_profile` is implemented; quotes lack name/sector/market cap.
    pub profiles: bool,

    /// Quotes carry a session volume.
    pub volume: bool,

    /// Quotes carry a market capitalization.
    pub market_cap: bool,

    /// Largest symbol set accepted by a single batch call.
    pub max_batch_size: usize,
}

impl ProviderCapabilities {
    /// Whether the caller should fan out profile lookups alongside quotes.
    pub fn needs_profile_lookup(&self) -> bool {
        self.profiles && !self.market_cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_profile_lookup() {
        let caps = ProviderCapabilities {
            batch_quotes: false,
            profiles: true,
            volume: false,
            market_cap: false,
            max_batch_size: 1,
        };
        assert!(caps.needs_profile_lookup());

        let caps = ProviderCapabilities {
            profiles: false,
            ..caps
        };
        assert!(!caps.needs_profile_lookup());
    }
}
