use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use stockdash_core::constants::DEFAULT_OUTPUT_SIZE;
use stockdash_core::quotes::{Quote, StockHistory};
use stockdash_market_data::Interval;

const STOCK_FAILURE: &str = "Failed to fetch stock data";
const HISTORY_FAILURE: &str = "Failed to fetch stock history";

async fn get_stocks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Quote>>> {
    let quotes = state
        .quote_service
        .get_stocks()
        .await
        .map_err(|e| ApiError::failed(STOCK_FAILURE, e))?;
    Ok(Json(quotes))
}

async fn get_stock(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Quote>> {
    let quote = state
        .quote_service
        .get_stock(&symbol)
        .await
        .map_err(|e| ApiError::failed(STOCK_FAILURE, e))?;
    Ok(Json(quote))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    interval: Option<String>,
    outputsize: Option<String>,
}

impl HistoryQuery {
    /// Unknown intervals fall back to daily bars.
    fn interval(&self) -> Interval {
        Interval::parse_or_default(self.interval.as_deref())
    }

    fn output_size(&self) -> ApiResult<u32> {
        match self.outputsize.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_OUTPUT_SIZE),
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid outputsize: {}", raw))),
        }
    }
}

async fn get_history(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StockHistory>> {
    let output_size = query.output_size()?;
    let history = state
        .quote_service
        .get_history(&symbol, query.interval(), output_size)
        .await
        .map_err(|e| ApiError::failed(HISTORY_FAILURE, e))?;
    Ok(Json(history))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks", get(get_stocks))
        .route("/stock/{symbol}", get(get_stock))
        .route("/stock/{symbol}/history", get(get_history))
}
