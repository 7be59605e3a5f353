use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, MarketProviderKind};
use stockdash_core::{
    accounts::{AccountService, AccountServiceTrait},
    portfolio::PortfolioBook,
    quotes::{QuoteCache, QuoteService, QuoteServiceTrait},
};
use stockdash_market_data::{FinnhubProvider, QuoteProvider, TwelveDataProvider};
use stockdash_storage_supabase::{SupabaseAccountStore, SupabaseClient, SupabaseConfig};

pub struct AppState {
    pub quote_service: Arc<dyn QuoteServiceTrait>,
    /// `None` when no Supabase project is configured
    pub account_service: Option<Arc<dyn AccountServiceTrait>>,
}

pub fn init_tracing() {
    let log_format = std::env::var("STOCKDASH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn build_provider(config: &Config) -> Option<Arc<dyn QuoteProvider>> {
    let Some((kind, api_key)) = config.selected_provider() else {
        tracing::warn!("No market data API key configured; market endpoints will return 500");
        return None;
    };
    let provider: Arc<dyn QuoteProvider> = match kind {
        MarketProviderKind::TwelveData => {
            Arc::new(TwelveDataProvider::with_timeout(api_key, config.upstream_timeout))
        }
        MarketProviderKind::Finnhub => {
            Arc::new(FinnhubProvider::with_timeout(api_key, config.upstream_timeout))
        }
    };
    tracing::info!("Market data provider: {}", provider.id());
    Some(provider)
}

fn build_account_service(config: &Config) -> anyhow::Result<Option<Arc<dyn AccountServiceTrait>>> {
    let Some(url) = config.supabase_url.clone() else {
        tracing::warn!("SUPABASE_URL not set; user endpoints will return 500");
        return Ok(None);
    };
    let Some(supabase) = SupabaseConfig::from_keys(
        url,
        config.supabase_service_role_key.clone(),
        config.supabase_anon_key.clone(),
    ) else {
        tracing::warn!("No Supabase key configured; user endpoints will return 500");
        return Ok(None);
    };

    let client = SupabaseClient::new(supabase.with_timeout(config.upstream_timeout))
        .context("Failed to build Supabase client")?;
    let store = Arc::new(SupabaseAccountStore::new(Arc::new(client)));
    let service: Arc<dyn AccountServiceTrait> = Arc::new(AccountService::new(store));
    Ok(Some(service))
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let book = match &config.portfolio_file {
        Some(path) => {
            tracing::info!("Loading portfolio book from {}", path.display());
            PortfolioBook::from_file(path)
                .with_context(|| format!("Failed to load portfolio file {}", path.display()))?
        }
        None => PortfolioBook::demo(),
    };

    let cache = Arc::new(QuoteCache::with_ttls(config.quote_ttl, config.history_ttl));
    let quote_service: Arc<dyn QuoteServiceTrait> = Arc::new(QuoteService::new(
        build_provider(config),
        cache,
        Arc::new(book),
    ));

    Ok(Arc::new(AppState {
        quote_service,
        account_service: build_account_service(config)?,
    }))
}
