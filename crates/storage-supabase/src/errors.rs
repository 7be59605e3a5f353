//! Storage-specific error types for Supabase operations.
//!
//! These wrap transport and HTTP failures and convert them to the
//! store-agnostic error types defined in `stockdash_core`.

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use stockdash_core::accounts::AccountError;
use stockdash_core::errors::Error;

/// Storage-specific errors that wrap reqwest types and Supabase error payloads.
///
/// These errors are internal to the storage layer and are converted to
/// `stockdash_core::Error` before being returned to callers.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Request to Supabase failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The auth API rejected the bearer token.
    #[error("Token rejected by Supabase auth")]
    Unauthorized,

    #[error("Supabase returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected Supabase response: {0}")]
    Decode(String),

    #[error("Row not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// Reinterpret a credential rejection from the auth API as a bad user token.
    ///
    /// Only meaningful for calls that carry the user's token; a 401 or 403
    /// from the REST API concerns the project key and stays a status error.
    pub(crate) fn into_token_rejection(self) -> Self {
        match self {
            StorageError::Status { status: 401 | 403, message } => {
                debug!("Supabase auth rejected token: {}", message);
                StorageError::Unauthorized
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Decode(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unauthorized => Error::Account(AccountError::Unauthorized),
            StorageError::NotFound(id) => Error::Account(AccountError::NotFound(id)),
            other => Error::Account(AccountError::Store(other.to_string())),
        }
    }
}

/// Error body shared by PostgREST (`message`) and GoTrue (`msg`, `error_description`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

/// Best-effort human message from an error body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.msg).or(b.error_description))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_postgrest_body() {
        let body = r#"{"code":"23505","details":"Key (id)=(u1) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"users_pkey\""}"#;
        assert_eq!(
            error_message(body),
            "duplicate key value violates unique constraint \"users_pkey\""
        );
    }

    #[test]
    fn test_error_message_from_gotrue_body() {
        let body = r#"{"code":401,"error_code":"bad_jwt","msg":"invalid JWT: token is expired"}"#;
        assert_eq!(error_message(body), "invalid JWT: token is expired");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("upstream connect error"), "upstream connect error");
    }

    #[test]
    fn test_only_auth_credential_statuses_become_unauthorized() {
        let status = |status: u16| StorageError::Status {
            status,
            message: "permission denied for table users".to_string(),
        };

        assert!(matches!(status(401).into_token_rejection(), StorageError::Unauthorized));
        assert!(matches!(status(403).into_token_rejection(), StorageError::Unauthorized));
        assert!(matches!(
            status(500).into_token_rejection(),
            StorageError::Status { status: 500, .. }
        ));

        // A REST 403 (row-level security, bad project key) is a store failure
        let err: Error = status(403).into();
        assert!(matches!(err, Error::Account(AccountError::Store(_))));
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: Error = StorageError::Unauthorized.into();
        assert!(matches!(err, Error::Account(AccountError::Unauthorized)));

        let err: Error = StorageError::Status {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Account(AccountError::Store(_))));

        let err: Error = StorageError::NotFound("u1".to_string()).into();
        assert!(matches!(err, Error::Account(AccountError::NotFound(_))));
    }
}
