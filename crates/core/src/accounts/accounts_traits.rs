//! Account store and service traits.
//!
//! The store trait mirrors the hosted auth + database service without any
//! transport types, so tests and local development can swap in memory.

use async_trait::async_trait;

use super::accounts_model::{AuthUser, NewUser, UserPatch, UserRecord};
use crate::errors::Result;

/// Trait defining the contract for the hosted account store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Resolve a bearer token to its user.
    ///
    /// Rejected or expired tokens yield `AccountError::Unauthorized`.
    async fn verify_token(&self, token: &str) -> Result<AuthUser>;

    /// Fetch the `users` row for an id, if one exists.
    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Insert a new `users` row and return it as stored.
    async fn insert_user(&self, new_user: &NewUser) -> Result<UserRecord>;

    /// Patch the given fields of a `users` row and return the full row.
    async fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<UserRecord>;
}

/// Trait defining the contract for user record operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Return the caller's record, creating it with starter values on first access.
    async fn get_or_create_user(&self, token: &str) -> Result<UserRecord>;

    /// Patch the caller's record and return it.
    async fn update_user(&self, token: &str, patch: UserPatch) -> Result<UserRecord>;
}
