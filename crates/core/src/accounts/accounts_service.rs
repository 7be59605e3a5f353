use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

use super::accounts_errors::AccountError;
use super::accounts_model::{AuthUser, NewUser, UserPatch, UserRecord};
use super::accounts_traits::{AccountServiceTrait, AccountStore};
use crate::errors::{Error, Result};

/// Service for user records
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    async fn authenticate(&self, token: &str) -> Result<AuthUser> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AccountError::Unauthorized.into());
        }
        self.store.verify_token(token).await
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn get_or_create_user(&self, token: &str) -> Result<UserRecord> {
        let user = self.authenticate(token).await?;

        if let Some(record) = self.store.find_user(&user.id).await? {
            return Ok(record);
        }

        info!("Creating user record for {}", user.id);
        let new_user = NewUser::for_auth_user(&user, Utc::now());
        match self.store.insert_user(&new_user).await {
            Ok(record) => Ok(record),
            Err(e) => {
                // A concurrent first access may have inserted the row already
                warn!("Insert for user {} failed, re-reading: {}", user.id, e);
                self.store.find_user(&user.id).await?.ok_or(e)
            }
        }
    }

    async fn update_user(&self, token: &str, patch: UserPatch) -> Result<UserRecord> {
        let user = self.authenticate(token).await?;
        patch.validate()?;

        if patch.is_empty() {
            debug!("Empty patch for user {}", user.id);
            return self
                .store
                .find_user(&user.id)
                .await?
                .ok_or_else(|| Error::Account(AccountError::NotFound(user.id.clone())));
        }

        debug!("Updating user {}", user.id);
        self.store.update_user(&user.id, &patch).await
    }
}
