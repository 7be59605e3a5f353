use thiserror::Error;

/// Errors raised by account operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    /// Bearer token missing, malformed, expired or rejected by the auth service.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found: {0}")]
    NotFound(String),

    /// No account store is configured.
    #[error("Account store not configured")]
    NotConfigured,

    /// The store rejected or failed the request.
    #[error("Account store error: {0}")]
    Store(String),
}
