use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use stockdash_core::trading::{OrderPreview, OrderRequest};

/// Cost and fee of a hypothetical order. Nothing is executed.
async fn preview_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Json<OrderPreview>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let preview = state
        .quote_service
        .preview_order(request)
        .await
        .map_err(|e| ApiError::failed("Failed to preview order", e))?;
    Ok(Json(preview))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/orders/preview", post(preview_order))
}
