//! Tests for AccountService first-access creation and patching.

#[cfg(test)]
mod tests {
    use crate::accounts::{
        AccountError, AccountService, AccountServiceTrait, AccountStore, AuthUser,
        InMemoryAccountStore, NewUser, UserPatch, UserRecord,
    };
    use crate::errors::{Error, Result};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn jane() -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: Some("jane@example.com".to_string()),
            name: None,
        }
    }

    fn setup() -> (Arc<InMemoryAccountStore>, AccountService) {
        let store = Arc::new(InMemoryAccountStore::new());
        store.register_token("token-1", jane()).unwrap();
        let service = AccountService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_first_access_creates_starter_record() {
        let (store, service) = setup();

        let record = service.get_or_create_user("token-1").await.unwrap();
        assert_eq!(record.id, "user-1");
        assert_eq!(record.name.as_deref(), Some("jane"));
        assert_eq!(record.account_balance, dec!(100000));
        assert_eq!(record.total_invested, Decimal::ZERO);
        assert_eq!(record.trading_level.as_deref(), Some("Beginner"));
        assert!(record.member_since.is_some());

        let again = service.get_or_create_user("token-1").await.unwrap();
        assert_eq!(again, record);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_or_missing_token_is_unauthorized() {
        let (_, service) = setup();

        let err = service.get_or_create_user("bogus").await.unwrap_err();
        assert!(matches!(err, Error::Account(AccountError::Unauthorized)));

        let err = service.get_or_create_user("   ").await.unwrap_err();
        assert!(matches!(err, Error::Account(AccountError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_field() {
        let (store, service) = setup();

        let mut seeded = NewUser::for_auth_user(&jane(), chrono::Utc::now()).into_record();
        seeded.account_balance = dec!(91234.5);
        seeded
            .extra
            .insert("favorite_sector".to_string(), Value::String("Energy".to_string()));
        store.insert_record(seeded.clone()).unwrap();

        let patch = UserPatch {
            name: Some("X".to_string()),
            ..Default::default()
        };
        let updated = service.update_user("token-1", patch).await.unwrap();

        assert_eq!(updated.name.as_deref(), Some("X"));
        assert_eq!(updated.email, seeded.email);
        assert_eq!(updated.account_balance, dec!(91234.5));
        assert_eq!(updated.trading_level, seeded.trading_level);
        assert_eq!(updated.member_since, seeded.member_since);
        assert_eq!(updated.extra, seeded.extra);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_patch() {
        let (_, service) = setup();
        service.get_or_create_user("token-1").await.unwrap();

        let patch = UserPatch {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        let err = service.update_user("token-1", patch).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let (_, service) = setup();

        let patch = UserPatch {
            name: Some("X".to_string()),
            ..Default::default()
        };
        let err = service.update_user("token-1", patch).await.unwrap_err();
        assert!(matches!(err, Error::Account(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_patch_returns_current_record() {
        let (_, service) = setup();
        let created = service.get_or_create_user("token-1").await.unwrap();

        let record = service
            .update_user("token-1", UserPatch::default())
            .await
            .unwrap();
        assert_eq!(record, created);
    }

    // =========================================================================
    // Racing first access
    // =========================================================================

    /// Store whose first lookup misses even though the row exists, so the
    /// insert collides like a concurrent first access would.
    struct RacingStore {
        inner: InMemoryAccountStore,
        finds: AtomicUsize,
    }

    #[async_trait]
    impl AccountStore for RacingStore {
        async fn verify_token(&self, token: &str) -> Result<AuthUser> {
            self.inner.verify_token(token).await
        }

        async fn find_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
            if self.finds.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(None);
            }
            self.inner.find_user(user_id).await
        }

        async fn insert_user(&self, new_user: &NewUser) -> Result<UserRecord> {
            self.inner.insert_user(new_user).await
        }

        async fn update_user(&self, user_id: &str, patch: &UserPatch) -> Result<UserRecord> {
            self.inner.update_user(user_id, patch).await
        }
    }

    #[tokio::test]
    async fn test_insert_conflict_rereads_existing_row() {
        let inner = InMemoryAccountStore::new();
        inner.register_token("token-1", jane()).unwrap();
        let mut existing = NewUser::for_auth_user(&jane(), chrono::Utc::now()).into_record();
        existing.name = Some("Existing".to_string());
        inner.insert_record(existing).unwrap();

        let store = Arc::new(RacingStore {
            inner,
            finds: AtomicUsize::new(0),
        });
        let service = AccountService::new(store);

        let record = service.get_or_create_user("token-1").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Existing"));
    }
}
