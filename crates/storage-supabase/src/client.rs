//! Thin HTTP client for the Supabase auth and REST APIs.

use log::debug;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::errors::{error_message, StorageError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service role key when available, else the anon key
    pub api_key: String,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Pick the server key: the service role key wins over the anon key.
    pub fn from_keys(
        url: impl Into<String>,
        service_role_key: Option<String>,
        anon_key: Option<String>,
    ) -> Option<Self> {
        let key = service_role_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| anon_key.filter(|k| !k.trim().is_empty()))?;
        Some(Self::new(url, key))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared HTTP client bound to one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path.trim_start_matches('/'))
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table.trim_start_matches('/'))
    }

    /// Request with the project key attached. `bearer` overrides the
    /// Authorization header for calls made on behalf of a user.
    pub(crate) fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        debug!("Supabase {} {}", method, url);
        let bearer = bearer.unwrap_or(&self.config.api_key);
        self.http
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer)
    }

    /// Send and decode a JSON body. Non-2xx statuses, 401 and 403 included,
    /// become `StorageError::Status`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, StorageError> {
        let response = builder.send().await?;
        let body = check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<String, StorageError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> StorageError {
    StorageError::Status {
        status: status.as_u16(),
        message: error_message(body),
    }
}
