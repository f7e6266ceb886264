//! Deterministic cache keys for ownership lookups.
//!
//! Two key shapes:
//! - brand keys: `v1:pipeline:brand` or `v1:pipeline:brand::product`
//! - hash keys: `v1:pipeline[:locale]:<stable hash of the input>`
//!
//! The stable hash is SHA-256 over canonical JSON (object keys sorted at
//! every level), truncated to 16 hex characters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Default key version prefix.
pub const DEFAULT_CACHE_VERSION: &str = "v1";

/// Hex characters kept from the SHA-256 digest.
pub const HASH_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CacheKeyError {
    #[error("Empty brand name in cache key generation")]
    EmptyBrand,
    #[error("Failed to generate stable hash: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Input that may carry a brand / product pair.
///
/// Anything serializable can be keyed; the brand and product accessors
/// decide whether the readable brand form is used instead of a hash.
pub trait KeyedInput: Serialize {
    fn brand(&self) -> Option<&str>;
    fn product_name(&self) -> Option<&str>;
}

/// Lookup request as it arrives from a barcode scan or manual entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

impl LookupInput {
    pub fn for_brand(brand: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            ..Default::default()
        }
    }

    pub fn for_barcode(barcode: impl Into<String>) -> Self {
        Self {
            barcode: Some(barcode.into()),
            ..Default::default()
        }
    }

    pub fn with_product(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }
}

impl KeyedInput for LookupInput {
    fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }
}

impl KeyedInput for Value {
    fn brand(&self) -> Option<&str> {
        self.get("brand").and_then(Value::as_str)
    }

    fn product_name(&self) -> Option<&str> {
        self.get("product_name").and_then(Value::as_str)
    }
}

/// Hash any serializable input into a short, order-independent digest.
///
/// Fails only if the input cannot be represented as JSON (for example a
/// map with non-string keys). Callers should treat that as "no cache for
/// this input" rather than a fatal error.
pub fn stable_hash<T: Serialize + ?Sized>(input: &T) -> Result<String, CacheKeyError> {
    let canonical = serde_json::to_string(&canonicalize_json(serde_json::to_value(input)?))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hex::encode(hasher.finalize());

    Ok(digest[..HASH_LEN].to_string())
}

/// Rebuild a JSON value with object keys in sorted order at every level.
pub fn canonicalize_json(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize_json(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_json).collect()),
        other => other,
    }
}

/// Build the cache key for a pipeline result.
///
/// A present-but-blank brand is an error, so results are never cached
/// under a meaningless key. A missing brand falls back to hashing.
pub fn generate_cache_key<T: KeyedInput + ?Sized>(
    pipeline_name: &str,
    input: &T,
    locale: Option<&str>,
    version: &str,
) -> Result<String, CacheKeyError> {
    if let Some(raw_brand) = input.brand() {
        let brand = normalize_part(raw_brand);
        if brand.is_empty() {
            tracing::warn!(pipeline = pipeline_name, "empty brand name in cache key generation");
            return Err(CacheKeyError::EmptyBrand);
        }

        let product = input.product_name().map(normalize_part).unwrap_or_default();
        let key = if product.is_empty() {
            format!("{}:{}:{}", version, pipeline_name, brand)
        } else {
            format!("{}:{}:{}::{}", version, pipeline_name, brand, product)
        };

        tracing::debug!(key = %key, kind = "brand", "generated cache key");
        return Ok(key);
    }

    let hash = stable_hash(input)?;
    let key = match locale {
        Some(locale) => format!("{}:{}:{}:{}", version, pipeline_name, locale, hash),
        None => format!("{}:{}:{}", version, pipeline_name, hash),
    };

    tracing::debug!(key = %key, kind = "hash", "generated cache key");
    Ok(key)
}

fn normalize_part(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_hash_ignores_key_order() {
        let a = json!({"brand": null, "hints": {"country": "SE", "category": "snacks"}, "n": [1, 2]});
        let b = json!({"n": [1, 2], "hints": {"category": "snacks", "country": "SE"}, "brand": null});
        assert_eq!(stable_hash(&a).unwrap(), stable_hash(&b).unwrap());
        assert_eq!(stable_hash(&a).unwrap().len(), HASH_LEN);
    }

    #[test]
    fn test_hash_distinguishes_inputs() {
        let a = stable_hash(&json!({"barcode": "7310865004703"})).unwrap();
        let b = stable_hash(&json!({"barcode": "7310865004704"})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_array_order_matters() {
        assert_ne!(stable_hash(&json!([1, 2])).unwrap(), stable_hash(&json!([2, 1])).unwrap());
    }

    #[test]
    fn test_hash_skipped_fields_match_absent() {
        let input = LookupInput::for_barcode("123");
        assert_eq!(stable_hash(&input).unwrap(), stable_hash(&json!({"barcode": "123"})).unwrap());
    }

    #[test]
    fn test_hash_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "x");
        assert!(matches!(stable_hash(&map), Err(CacheKeyError::Serialization(_))));
    }

    #[test]
    fn test_brand_and_product_key() {
        let input = LookupInput::for_brand("  Oatly ").with_product("Oat Drink Barista");
        let key = generate_cache_key("ownership", &input, None, DEFAULT_CACHE_VERSION).unwrap();
        assert_eq!(key, "v1:ownership:oatly::oat drink barista");
    }

    #[test]
    fn test_brand_only_key_ignores_locale() {
        let input = LookupInput::for_brand("Kit Kat").with_product("   ");
        let key = generate_cache_key("ownership", &input, Some("sv-SE"), "v2").unwrap();
        assert_eq!(key, "v2:ownership:kit kat");
    }

    #[test]
    fn test_empty_brand_is_error() {
        let input = json!({"brand": "", "product_name": "x"});
        assert!(matches!(
            generate_cache_key("pipeline", &input, None, DEFAULT_CACHE_VERSION),
            Err(CacheKeyError::EmptyBrand)
        ));
        assert!(generate_cache_key("pipeline", &LookupInput::for_brand("   "), None, "v1").is_err());
    }

    #[test]
    fn test_hash_fallback_key() {
        let input = LookupInput::for_barcode("7310865004703");
        let hash = stable_hash(&input).unwrap();

        let key = generate_cache_key("vision", &input, Some("en"), DEFAULT_CACHE_VERSION).unwrap();
        assert_eq!(key, format!("v1:vision:en:{}", hash));

        let key = generate_cache_key("vision", &input, None, DEFAULT_CACHE_VERSION).unwrap();
        assert_eq!(key, format!("v1:vision:{}", hash));
    }
}
