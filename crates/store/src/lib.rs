//! Cache storage for ownership lookup results.
//!
//! Provides the `CacheStore` trait with an in-memory and a Supabase
//! (PostgREST) implementation, plus helpers that key results with
//! `ownerlens-cachekey` before reading or writing.

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::{SupabaseConfig, SupabaseStore};

use ownerlens_cachekey::{generate_cache_key, CacheKeyError, KeyedInput, DEFAULT_CACHE_VERSION};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

/// How long a cached result stays valid by default.
pub const DEFAULT_TTL_HOURS: u32 = 24;

/// Errors from cache store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Store not available")]
    Unavailable,

    #[error("Cache key unavailable: {0}")]
    Key(#[from] CacheKeyError),
}

/// Key-value store for lookup results (in-memory, Supabase, ...).
pub trait CacheStore {
    /// Fetch a live value. Expired entries read as `None`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Insert or replace a value that expires after `ttl_hours`.
    fn put(
        &self,
        key: &str,
        value: Value,
        ttl_hours: u32,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a value if present.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Check if the store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Get the store name for logging.
    fn name(&self) -> &'static str;
}

/// Look up a cached pipeline result.
///
/// An input that cannot be keyed is a miss, not an error.
pub async fn lookup_cached<S, T>(
    store: &S,
    pipeline_name: &str,
    input: &T,
    locale: Option<&str>,
) -> Result<Option<Value>, StoreError>
where
    S: CacheStore,
    T: KeyedInput + ?Sized,
{
    let key = match generate_cache_key(pipeline_name, input, locale, DEFAULT_CACHE_VERSION) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(pipeline = pipeline_name, error = %e, "skipping cache read");
            return Ok(None);
        }
    };

    let value = store.get(&key).await?;
    tracing::debug!(store = store.name(), key = %key, hit = value.is_some(), "cache read");
    Ok(value)
}

/// Cache a pipeline result. Returns the key written, or `None` if the
/// input could not be keyed.
pub async fn cache_result<S, T>(
    store: &S,
    pipeline_name: &str,
    input: &T,
    value: Value,
    locale: Option<&str>,
) -> Result<Option<String>, StoreError>
where
    S: CacheStore,
    T: KeyedInput + ?Sized,
{
    let key = match generate_cache_key(pipeline_name, input, locale, DEFAULT_CACHE_VERSION) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(pipeline = pipeline_name, error = %e, "skipping cache write");
            return Ok(None);
        }
    };

    store.put(&key, value, DEFAULT_TTL_HOURS).await?;
    tracing::debug!(store = store.name(), key = %key, "cache write");
    Ok(Some(key))
}

/// Write, read back, and delete a probe entry.
pub async fn probe<S: CacheStore>(store: &S) -> Result<(), StoreError> {
    let key = format!("health-check:{}", chrono::Utc::now().timestamp_millis());
    let value = serde_json::json!({ "test": true });

    store.put(&key, value.clone(), 1).await?;
    let read = store.get(&key).await?;

    if let Err(e) = store.remove(&key).await {
        tracing::warn!(store = store.name(), error = %e, "probe cleanup failed");
    }

    match read {
        Some(v) if v == value => Ok(()),
        _ => Err(StoreError::QueryFailed("probe entry not readable after write".to_string())),
    }
}
