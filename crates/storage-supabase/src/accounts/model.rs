//! Wire models for the Supabase auth API.

use serde::Deserialize;
use serde_json::{Map, Value};

use stockdash_core::accounts::AuthUser;

/// User object returned by `GET /auth/v1/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUserDB {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl AuthUserDB {
    fn metadata_str(&self, key: &str) -> Option<String> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl From<AuthUserDB> for AuthUser {
    fn from(db: AuthUserDB) -> Self {
        let name = db
            .metadata_str("name")
            .or_else(|| db.metadata_str("full_name"));
        let email = db.email.filter(|e| !e.is_empty());
        Self {
            id: db.id,
            email,
            name,
        }
    }
}
