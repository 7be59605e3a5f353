use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use stockdash_core::accounts::AccountError;
use stockdash_core::errors::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Core failure with no endpoint context.
    #[error("{0}")]
    Core(#[from] CoreError),
    /// Core failure surfaced under a fixed endpoint message.
    #[error("{context}: {source}")]
    Failed {
        context: &'static str,
        source: CoreError,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
}

impl ApiError {
    pub fn failed(context: &'static str, source: CoreError) -> Self {
        ApiError::Failed { context, source }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Status and body for a core error. `context` replaces the message of
/// server-side failures.
fn core_response(err: &CoreError, context: Option<&'static str>) -> (StatusCode, ErrorBody) {
    let body = |error: String, details: Option<String>| ErrorBody { error, details };
    match err {
        CoreError::NotConfigured => (
            StatusCode::INTERNAL_SERVER_ERROR,
            body(err.to_string(), None),
        ),
        CoreError::InvalidInput(reason) => (StatusCode::BAD_REQUEST, body(reason.clone(), None)),
        CoreError::Account(AccountError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, body("Unauthorized".to_string(), None))
        }
        CoreError::Account(AccountError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            body("User not found".to_string(), None),
        ),
        CoreError::Account(AccountError::NotConfigured) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            body(AccountError::NotConfigured.to_string(), None),
        ),
        _ => match context {
            Some(context) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                body(context.to_string(), Some(err.to_string())),
            ),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                body(err.to_string(), None),
            ),
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Core(e) => core_response(e, None),
            ApiError::Failed { context, source } => core_response(source, Some(*context)),
            ApiError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: reason.clone(),
                    details: None,
                },
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: self.to_string(),
                    details: None,
                },
            ),
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_configured_is_fixed_500() {
        let (status, body) = render(ApiError::failed(
            "Failed to fetch stock data",
            CoreError::NotConfigured,
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "API key not configured"}));
    }

    #[tokio::test]
    async fn test_context_message_with_details() {
        let (status, body) = render(ApiError::failed(
            "Failed to create user profile",
            CoreError::Account(AccountError::Store("duplicate key".to_string())),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create user profile");
        assert_eq!(body["details"], "Account store error: duplicate key");
    }

    #[tokio::test]
    async fn test_client_errors() {
        let (status, body) = render(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));

        let (status, _) = render(ApiError::failed(
            "Failed to update user",
            CoreError::Account(AccountError::Unauthorized),
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            render(CoreError::InvalidInput("Invalid symbol: ''".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid symbol: ''");

        let (status, _) = render(ApiError::failed(
            "Failed to update user",
            CoreError::Account(AccountError::NotFound("u1".to_string())),
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
