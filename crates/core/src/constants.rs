use std::time::Duration;

/// Validity window of live quote payloads (stock list, single stock, portfolio)
pub const QUOTE_CACHE_TTL: Duration = Duration::from_secs(30);

/// Validity window of history payloads
pub const HISTORY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Upper bound on entries per cache tier
pub const CACHE_MAX_CAPACITY: u64 = 10_000;

/// Bars returned when the caller does not ask for a size
pub const DEFAULT_OUTPUT_SIZE: u32 = 30;

/// Largest history size accepted from callers
pub const MAX_OUTPUT_SIZE: u32 = 5000;

/// Sector reported when metadata has none
pub const UNKNOWN_SECTOR: &str = "Unknown";
