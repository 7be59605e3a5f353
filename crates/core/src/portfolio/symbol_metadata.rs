//! Static display metadata for well-known symbols.

/// Display name and sector for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMetadata {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

pub static SYMBOL_METADATA: [SymbolMetadata; 10] = [
    SymbolMetadata {
        symbol: "AAPL",
        name: "Apple Inc.",
        sector: "Technology",
    },
    SymbolMetadata {
        symbol: "MSFT",
        name: "Microsoft Corporation",
        sector: "Technology",
    },
    SymbolMetadata {
        symbol: "GOOGL",
        name: "Alphabet Inc.",
        sector: "Technology",
    },
    SymbolMetadata {
        symbol: "AMZN",
        name: "Amazon.com Inc.",
        sector: "Consumer Cyclical",
    },
    SymbolMetadata {
        symbol: "TSLA",
        name: "Tesla, Inc.",
        sector: "Consumer Cyclical",
    },
    SymbolMetadata {
        symbol: "META",
        name: "Meta Platforms Inc.",
        sector: "Technology",
    },
    SymbolMetadata {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        sector: "Technology",
    },
    SymbolMetadata {
        symbol: "JPM",
        name: "JPMorgan Chase & Co.",
        sector: "Financial Services",
    },
    SymbolMetadata {
        symbol: "V",
        name: "Visa Inc.",
        sector: "Financial Services",
    },
    SymbolMetadata {
        symbol: "JNJ",
        name: "Johnson & Johnson",
        sector: "Healthcare",
    },
];

/// Case-insensitive lookup.
pub fn lookup_metadata(symbol: &str) -> Option<&'static SymbolMetadata> {
    SYMBOL_METADATA
        .iter()
        .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
}
