//! In-memory account store for local development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::accounts_errors::AccountError;
use super::accounts_model::{AuthUser, NewUser, UserPatch, UserRecord};
use super::accounts_traits::AccountStore;
use crate::errors::{Error, Result};

/// Account store kept in process memory. Tokens are registered up front.
#[derive(Default)]
pub struct InMemoryAccountStore {
    tokens: RwLock<HashMap<String, AuthUser>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a bearer token for `user`.
    pub fn register_token(&self, token: impl Into<String>, user: AuthUser) -> Result<()> {
        self.tokens
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(token.into(), user);
        Ok(())
    }

    /// Seed a stored row.
    pub fn insert_record(&self, record: UserRecord) -> Result<()> {
        self.users
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(record.id.clone(), record);
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }
}

fn lock_poisoned() -> Error {
    Error::Account(AccountError::Store("In-memory store lock poisoned".to_string()))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn verify_token(&self, token: &str) -> Result<AuthUser> {
        self.tokens
            .read()
            .map_err(|_| lock_poisoned())?
            .get(token)
            .cloned()
            .ok_or(Error::Account(AccountError::Unauthorized))
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .map_err(|_| lock_poisoned())?
            .get(user_id)
            .cloned())
    }

    async fn insert_user(&self, new_user: &NewUser) -> Result<UserRecord> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users.contains_key(&new_user.id) {
            return Err(Error::Account(AccountError::Store(format!(
                "duplicate key value violates unique constraint \"users_pkey\" ({})",
                new_user.id
            ))));
        }
        let record = new_user.clone().into_record();
        users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<UserRecord> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| Error::Account(AccountError::NotFound(user_id.to_string())))?;
        record.apply(patch);
        Ok(record.clone())
    }
}
