//! User record models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::accounts_constants::{DEFAULT_TRADING_LEVEL, DEFAULT_USER_NAME, STARTING_BALANCE};
use crate::errors::{Error, Result};

/// The identity behind a verified bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    /// Display name from the auth provider's user metadata
    pub name: Option<String>,
}

/// A row of the `users` table.
///
/// Columns not modelled here are kept in `extra` and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_balance: Decimal,
    #[serde(default)]
    pub total_invested: Decimal,
    #[serde(default)]
    pub trading_level: Option<String>,
    #[serde(default)]
    pub member_since: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Apply the provided patch fields; everything else is untouched.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(trading_level) = &patch.trading_level {
            self.trading_level = Some(trading_level.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.extra
                .insert("avatar_url".to_string(), Value::String(avatar_url.clone()));
        }
    }
}

/// Values for a first-access insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub account_balance: Decimal,
    pub total_invested: Decimal,
    pub trading_level: String,
    pub member_since: DateTime<Utc>,
}

impl NewUser {
    /// Starter record for a verified user.
    ///
    /// The name comes from auth metadata, else the email's local part, else "User".
    pub fn for_auth_user(user: &AuthUser, now: DateTime<Utc>) -> Self {
        let name = user
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                user.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name,
            account_balance: STARTING_BALANCE,
            total_invested: Decimal::ZERO,
            trading_level: DEFAULT_TRADING_LEVEL.to_string(),
            member_since: now,
        }
    }

    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            email: self.email,
            name: Some(self.name),
            account_balance: self.account_balance,
            total_invested: self.total_invested,
            trading_level: Some(self.trading_level),
            member_since: Some(self.member_since),
            extra: Map::new(),
        }
    }
}

/// Fields a user may change. Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_level: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.avatar_url.is_none()
            && self.trading_level.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("Name cannot be empty".to_string()));
            }
        }
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                .unwrap_or(false);
            if !valid {
                return Err(Error::InvalidInput(format!("Invalid email: {}", email)));
            }
        }
        if let Some(level) = &self.trading_level {
            if level.trim().is_empty() {
                return Err(Error::InvalidInput("Trading level cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn auth_user(email: Option<&str>, name: Option<&str>) -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_new_user_name_derivation() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();

        let user = NewUser::for_auth_user(&auth_user(Some("jane@example.com"), Some("Jane D")), now);
        assert_eq!(user.name, "Jane D");

        let user = NewUser::for_auth_user(&auth_user(Some("jane@example.com"), Some("  ")), now);
        assert_eq!(user.name, "jane");

        let user = NewUser::for_auth_user(&auth_user(None, None), now);
        assert_eq!(user.name, "User");
        assert_eq!(user.account_balance, dec!(100000));
        assert_eq!(user.total_invested, Decimal::ZERO);
        assert_eq!(user.trading_level, "Beginner");
        assert_eq!(user.member_since, now);
    }

    #[test]
    fn test_record_keeps_unknown_columns() {
        let json = r#"{
            "id": "user-1",
            "email": "jane@example.com",
            "name": "Jane",
            "account_balance": 95000.5,
            "total_invested": 4999.5,
            "trading_level": "Intermediate",
            "member_since": "2024-01-15T10:00:00.123456+00:00",
            "avatar_url": null,
            "favorite_sector": "Technology"
        }"#;

        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.account_balance, dec!(95000.5));
        assert_eq!(record.extra.get("favorite_sector").unwrap(), "Technology");
        assert!(record.extra.get("avatar_url").unwrap().is_null());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["favorite_sector"], "Technology");
        assert_eq!(back["trading_level"], "Intermediate");
    }

    #[test]
    fn test_apply_patch_changes_only_given_fields() {
        let mut record = NewUser::for_auth_user(&auth_user(Some("a@b.co"), None), Utc::now()).into_record();
        let before = record.clone();

        record.apply(&UserPatch {
            name: Some("X".to_string()),
            ..Default::default()
        });

        assert_eq!(record.name.as_deref(), Some("X"));
        assert_eq!(record.email, before.email);
        assert_eq!(record.account_balance, before.account_balance);
        assert_eq!(record.member_since, before.member_since);

        record.apply(&UserPatch {
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            ..Default::default()
        });
        assert_eq!(record.extra["avatar_url"], "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<UserPatch>(r#"{"name":"X","account_balance":1e9}"#);
        assert!(err.is_err());

        let patch: UserPatch = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("X"));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_validation() {
        let patch = UserPatch {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = UserPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        assert!(UserPatch::default().validate().is_ok());
    }
}
