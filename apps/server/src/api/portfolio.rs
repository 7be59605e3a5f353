use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use stockdash_core::portfolio::PortfolioSnapshot;

async fn get_portfolio(State(state): State<Arc<AppState>>) -> ApiResult<Json<PortfolioSnapshot>> {
    let snapshot = state
        .quote_service
        .get_portfolio()
        .await
        .map_err(|e| ApiError::failed("Failed to fetch portfolio data", e))?;
    Ok(Json(snapshot))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio", get(get_portfolio))
}
