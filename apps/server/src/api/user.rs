use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};

use crate::{
    auth::BearerToken,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use stockdash_core::accounts::{AccountError, AccountServiceTrait, UserPatch, UserRecord};

fn account_service(state: &AppState) -> ApiResult<&Arc<dyn AccountServiceTrait>> {
    state
        .account_service
        .as_ref()
        .ok_or_else(|| ApiError::Core(AccountError::NotConfigured.into()))
}

/// The caller's record, created with starter values on first access.
async fn get_user(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<UserRecord>> {
    let record = account_service(&state)?
        .get_or_create_user(&token)
        .await
        .map_err(|e| ApiError::failed("Failed to create user profile", e))?;
    Ok(Json(record))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<UserRecord>> {
    let Json(patch) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let record = account_service(&state)?
        .update_user(&token, patch)
        .await
        .map_err(|e| ApiError::failed("Failed to update user", e))?;
    Ok(Json(record))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/user", get(get_user).put(update_user))
}
