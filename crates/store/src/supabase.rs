use crate::{CacheStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supabase (PostgREST) store configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Service role key, sent as `apikey` and bearer token
    pub api_key: String,
    /// Table holding cached rows
    pub table_name: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            table_name: "products".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SupabaseConfig {
    /// Defaults overridden by `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var(SUPABASE_URL_ENV).unwrap_or(defaults.base_url),
            api_key: std::env::var(SUPABASE_KEY_ENV).unwrap_or(defaults.api_key),
            ..defaults
        }
    }
}

/// A cached row as stored in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRow {
    cache_key: String,
    #[serde(default)]
    cache_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// Cache store backed by a Supabase table keyed on `cache_key`.
pub struct SupabaseStore {
    config: SupabaseConfig,
    client: reqwest::Client,
}

impl SupabaseStore {
    /// Create a new Supabase store.
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table_name
        )
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn build_row(key: &str, value: Value, ttl_hours: u32, now: DateTime<Utc>) -> CacheRow {
        CacheRow {
            cache_key: key.to_string(),
            cache_data: value,
            expires_at: Some((now + Duration::hours(i64::from(ttl_hours))).to_rfc3339()),
            updated_at: Some(now.to_rfc3339()),
        }
    }

    /// Pick the live payload out of a PostgREST response.
    fn parse_rows(response: Value, now: DateTime<Utc>) -> Result<Option<Value>, StoreError> {
        let rows: Vec<CacheRow> =
            serde_json::from_value(response).map_err(|e| StoreError::ParseError(e.to_string()))?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        if let Some(raw) = row.expires_at.as_deref() {
            let expires_at = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| StoreError::ParseError(format!("expires_at {raw:?}: {e}")))?;
            if expires_at <= now {
                tracing::debug!(key = %row.cache_key, expires_at = raw, "cache entry expired");
                return Ok(None);
            }
        }

        Ok(Some(row.cache_data))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::QueryFailed(format!("HTTP {}: {}", status, body)))
    }
}

impl CacheStore for SupabaseStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        tracing::debug!(key, "reading cache row");

        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "cache_key,cache_data,expires_at".to_string()),
                ("cache_key", format!("eq.{}", key)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let json: Value = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::ParseError(e.to_string()))?;

        Self::parse_rows(json, Utc::now())
    }

    async fn put(&self, key: &str, value: Value, ttl_hours: u32) -> Result<(), StoreError> {
        let row = Self::build_row(key, value, ttl_hours, Utc::now());

        let response = self
            .request(reqwest::Method::POST)
            .query(&[("on_conflict", "cache_key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if let Err(e) = Self::check_status(response).await {
            tracing::warn!(key, error = %e, "cache write failed");
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("cache_key", format!("eq.{}", key))])
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::check_status(response).await.map(|_| ())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "cache_key"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SupabaseStore {
        SupabaseStore::new(SupabaseConfig {
            base_url: "https://example.supabase.co/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_table_url() {
        assert_eq!(store().table_url(), "https://example.supabase.co/rest/v1/products");
    }

    #[test]
    fn test_build_row_expiry() {
        let now = Utc::now();
        let row = SupabaseStore::build_row("v1:ownership:oatly", json!({"a": 1}), 24, now);
        let expires = DateTime::parse_from_rfc3339(row.expires_at.as_deref().unwrap()).unwrap();
        assert_eq!(expires.with_timezone(&Utc) - now, Duration::hours(24));
    }

    #[test]
    fn test_parse_live_row() {
        let now = Utc::now();
        let response = json!([{
            "cache_key": "v1:ownership:oatly",
            "cache_data": {"financial_beneficiary": "Oatly AB"},
            "expires_at": (now + Duration::hours(1)).to_rfc3339(),
        }]);
        let data = SupabaseStore::parse_rows(response, now).unwrap();
        assert_eq!(data, Some(json!({"financial_beneficiary": "Oatly AB"})));
    }

    #[test]
    fn test_parse_expired_and_empty() {
        let now = Utc::now();
        let expired = json!([{
            "cache_key": "k",
            "cache_data": {},
            "expires_at": (now - Duration::hours(1)).to_rfc3339(),
        }]);
        assert_eq!(SupabaseStore::parse_rows(expired, now).unwrap(), None);
        assert_eq!(SupabaseStore::parse_rows(json!([]), now).unwrap(), None);
    }

    #[test]
    fn test_parse_without_expiry() {
        let response = json!([{"cache_key": "k", "cache_data": [1, 2]}]);
        assert_eq!(SupabaseStore::parse_rows(response, Utc::now()).unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SupabaseStore::parse_rows(json!({"message": "boom"}), Utc::now()),
            Err(StoreError::ParseError(_))
        ));
        let bad_date = json!([{"cache_key": "k", "cache_data": {}, "expires_at": "tomorrow"}]);
        assert!(SupabaseStore::parse_rows(bad_date, Utc::now()).is_err());
    }
}
