use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};

/// Market data backends the server can be wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketProviderKind {
    TwelveData,
    Finnhub,
}

impl FromStr for MarketProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twelvedata" | "twelve_data" | "twelve-data" => Ok(Self::TwelveData),
            "finnhub" => Ok(Self::Finnhub),
            other => Err(anyhow!("Unknown market provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub upstream_timeout: Duration,
    /// Explicit provider choice; otherwise the first provider with a key wins
    pub market_provider: Option<MarketProviderKind>,
    pub twelvedata_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_service_role_key: Option<String>,
    /// JSON portfolio book; the built-in demo book is used when unset
    pub portfolio_file: Option<PathBuf>,
    pub quote_ttl: Duration,
    pub history_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            upstream_timeout: Duration::from_millis(10_000),
            market_provider: None,
            twelvedata_api_key: None,
            finnhub_api_key: None,
            supabase_url: None,
            supabase_anon_key: None,
            supabase_service_role_key: None,
            portfolio_file: None,
            quote_ttl: Duration::from_secs(30),
            history_ttl: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(k));
        let defaults = Self::default();

        let listen_addr = match get("STOCKDASH_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid STOCKDASH_LISTEN_ADDR '{}'", addr))?,
            None => defaults.listen_addr,
        };
        let cors_allow = get("STOCKDASH_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let number = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };
        let market_provider = get("STOCKDASH_MARKET_PROVIDER")
            .map(|v| v.parse::<MarketProviderKind>())
            .transpose()?;

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(number("STOCKDASH_REQUEST_TIMEOUT_MS", 30_000)),
            upstream_timeout: Duration::from_millis(number("STOCKDASH_UPSTREAM_TIMEOUT_MS", 10_000)),
            market_provider,
            twelvedata_api_key: first(&["TWELVEDATA_API_KEY", "NEXT_PUBLIC_TWELVEDATA_API_KEY"]),
            finnhub_api_key: first(&["FINNHUB_API_KEY", "NEXT_PUBLIC_FINNHUB_API_KEY"]),
            supabase_url: first(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]),
            supabase_anon_key: first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            portfolio_file: get("STOCKDASH_PORTFOLIO_FILE").map(PathBuf::from),
            quote_ttl: Duration::from_secs(number("STOCKDASH_QUOTE_TTL_SECS", 30)),
            history_ttl: Duration::from_secs(number("STOCKDASH_HISTORY_TTL_SECS", 60)),
        })
    }

    /// The provider to wire up and its key, if any key is configured.
    pub fn selected_provider(&self) -> Option<(MarketProviderKind, String)> {
        let key_for = |kind: MarketProviderKind| match kind {
            MarketProviderKind::TwelveData => self.twelvedata_api_key.clone(),
            MarketProviderKind::Finnhub => self.finnhub_api_key.clone(),
        };
        match self.market_provider {
            Some(kind) => key_for(kind).map(|key| (kind, key)),
            None => [MarketProviderKind::TwelveData, MarketProviderKind::Finnhub]
                .into_iter()
                .find_map(|kind| key_for(kind).map(|key| (kind, key))),
        }
    }
}
