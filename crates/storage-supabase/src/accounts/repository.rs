use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use std::sync::Arc;

use stockdash_core::accounts::{AccountStore, AuthUser, NewUser, UserPatch, UserRecord, USERS_TABLE};
use stockdash_core::errors::Result;

use super::model::AuthUserDB;
use crate::client::SupabaseClient;
use crate::errors::StorageError;

const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// `AccountStore` backed by Supabase auth and the `users` table.
pub struct SupabaseAccountStore {
    client: Arc<SupabaseClient>,
    table: String,
}

impl SupabaseAccountStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            table: USERS_TABLE.to_string(),
        }
    }

    async fn fetch_auth_user(&self, token: &str) -> std::result::Result<AuthUser, StorageError> {
        let url = self.client.auth_url("user");
        let builder = self.client.request(Method::GET, &url, Some(token));
        let user: AuthUserDB = self
            .client
            .send_json(builder)
            .await
            .map_err(StorageError::into_token_rejection)?;
        Ok(user.into())
    }

    async fn select_user(&self, user_id: &str) -> std::result::Result<Option<UserRecord>, StorageError> {
        let url = self.client.rest_url(&self.table);
        let builder = self
            .client
            .request(Method::GET, &url, None)
            .query(&[("id", eq_filter(user_id)), ("select", "*".to_string())]);
        let rows: Vec<UserRecord> = self.client.send_json(builder).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_row(&self, new_user: &NewUser) -> std::result::Result<UserRecord, StorageError> {
        let url = self.client.rest_url(&self.table);
        let builder = self
            .client
            .request(Method::POST, &url, None)
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(new_user);
        let rows: Vec<UserRecord> = self.client.send_json(builder).await?;
        single_row(rows, &new_user.id)
    }

    async fn update_row(
        &self,
        user_id: &str,
        patch: &UserPatch,
    ) -> std::result::Result<UserRecord, StorageError> {
        let url = self.client.rest_url(&self.table);
        let builder = self
            .client
            .request(Method::PATCH, &url, None)
            .query(&[("id", eq_filter(user_id))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(patch);
        let rows: Vec<UserRecord> = self.client.send_json(builder).await?;
        single_row(rows, user_id)
    }
}

/// PostgREST equality filter value.
fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

/// Writes with `return=representation` answer with the affected rows.
/// No rows means the filter matched nothing.
fn single_row(rows: Vec<UserRecord>, user_id: &str) -> std::result::Result<UserRecord, StorageError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StorageError::NotFound(user_id.to_string()))
}

#[async_trait]
impl AccountStore for SupabaseAccountStore {
    async fn verify_token(&self, token: &str) -> Result<AuthUser> {
        Ok(self.fetch_auth_user(token).await?)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.select_user(user_id).await?)
    }

    async fn insert_user(&self, new_user: &NewUser) -> Result<UserRecord> {
        debug!("Inserting users row for {}", new_user.id);
        Ok(self.insert_row(new_user).await?)
    }

    async fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<UserRecord> {
        Ok(self.update_row(user_id, patch).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseConfig;
    use rust_decimal_macros::dec;
    use stockdash_core::accounts::AccountError;
    use stockdash_core::errors::Error;

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq_filter("user-1"), "eq.user-1");
    }

    #[test]
    fn test_single_row_from_representation() {
        let body = r#"[{
            "id": "user-1",
            "email": "jane@example.com",
            "name": "X",
            "account_balance": 100000,
            "total_invested": 0,
            "trading_level": "Beginner",
            "member_since": "2024-01-15T10:00:00+00:00",
            "avatar_url": null
        }]"#;
        let rows: Vec<UserRecord> = serde_json::from_str(body).unwrap();
        let record = single_row(rows, "user-1").unwrap();
        assert_eq!(record.name.as_deref(), Some("X"));
        assert_eq!(record.account_balance, dec!(100000));
        assert!(record.extra.contains_key("avatar_url"));
    }

    #[test]
    fn test_empty_representation_is_not_found() {
        let err = single_row(Vec::new(), "user-1").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref id) if id == "user-1"));

        let core: Error = err.into();
        assert!(matches!(core, Error::Account(AccountError::NotFound(_))));
    }

    #[test]
    fn test_patch_body_only_carries_given_fields() {
        let patch = UserPatch {
            name: Some("X".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({"name": "X"}));
    }

    #[test]
    fn test_store_uses_users_table() {
        let client = Arc::new(
            SupabaseClient::new(SupabaseConfig::new("https://abc.supabase.co", "k")).unwrap(),
        );
        let store = SupabaseAccountStore::new(client.clone());
        assert_eq!(
            client.rest_url(&store.table),
            "https://abc.supabase.co/rest/v1/users"
        );
    }
}
