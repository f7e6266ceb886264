//! Entity name canonicalization.
//!
//! Maps noisy company names to one canonical display form and resolves
//! known sub-brands to their parent company. Matching is exact on the
//! trimmed, lowercased name: this is a curated dictionary, not fuzzy search.
//!
//! None of these functions fail. An unknown name passes through unchanged,
//! which only costs a cache miss.

mod tables;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Separator between entity and country in an entity key.
pub const KEY_DELIMITER: char = '|';

static BUILTIN: LazyLock<EntityCanonicalizer> = LazyLock::new(EntityCanonicalizer::default);

/// Normalize a raw name into a table lookup key.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Why two entity keys did or did not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMatchReason {
    MatchAfterCanonicalization,
    DifferentCountries,
    DifferentEntities,
    MalformedKey,
}

/// Result of comparing two entity keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMatch {
    pub matched: bool,
    /// Absent when the keys were literally equal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<KeyMatchReason>,
}

impl KeyMatch {
    fn identical() -> Self {
        Self { matched: true, reason: None }
    }

    fn with(matched: bool, reason: KeyMatchReason) -> Self {
        Self { matched, reason: Some(reason) }
    }
}

/// Synonym and sub-brand dictionaries.
///
/// Read-only once built. `Default` loads the built-in tables; tests and
/// callers with their own data use [`EntityCanonicalizer::new`].
#[derive(Debug, Clone)]
pub struct EntityCanonicalizer {
    synonyms: HashMap<String, String>,
    sub_brands: HashMap<String, String>,
}

impl Default for EntityCanonicalizer {
    fn default() -> Self {
        Self::new(
            tables::CANONICAL_ENTITIES.iter().copied(),
            tables::SUB_BRAND_PARENTS.iter().copied(),
        )
    }
}

impl EntityCanonicalizer {
    /// Build from `(variant, canonical)` and `(sub-brand, parent)` pairs.
    ///
    /// Left-hand sides are normalized on the way in.
    pub fn new<S, B, K, V>(synonyms: S, sub_brands: B) -> Self
    where
        S: IntoIterator<Item = (K, V)>,
        B: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let collect = |pairs: Vec<(K, V)>| {
            pairs
                .into_iter()
                .map(|(k, v)| (normalize_name(k.as_ref()), v.into()))
                .collect::<HashMap<_, _>>()
        };

        Self {
            synonyms: collect(synonyms.into_iter().collect()),
            sub_brands: collect(sub_brands.into_iter().collect()),
        }
    }

    /// Canonical display form of `raw`, or `raw` itself when unknown.
    pub fn canonicalize(&self, raw: &str) -> String {
        match self.synonyms.get(&normalize_name(raw)) {
            Some(canonical) => {
                tracing::debug!(original = raw, canonical = %canonical, "canonicalized entity");
                canonical.clone()
            }
            None => raw.to_string(),
        }
    }

    /// Parent company of a known sub-brand.
    ///
    /// `None` means "not a known sub-brand", which is different from a brand
    /// owning itself.
    pub fn resolve_sub_brand_to_parent(&self, raw: &str) -> Option<&str> {
        let parent = self.sub_brands.get(&normalize_name(raw))?;
        tracing::debug!(brand = raw, parent = %parent, "matched sub-brand");
        Some(parent.as_str())
    }

    /// Best static guess at the owner: parent if known, else the canonical name.
    pub fn resolve_owner(&self, raw: &str) -> String {
        match self.resolve_sub_brand_to_parent(raw) {
            Some(parent) => parent.to_string(),
            None => self.canonicalize(raw),
        }
    }

    /// Identity key `entity|country` used for ownership cache lookups.
    pub fn make_entity_key(&self, entity_name: &str, country_code: &str) -> String {
        let entity = normalize_name(&self.canonicalize(entity_name));
        let country = normalize_name(country_code);
        format!("{}{}{}", entity, KEY_DELIMITER, country)
    }

    /// Check whether two entity keys refer to the same entity.
    ///
    /// Keys that were built without canonicalization still match if their
    /// entity parts canonicalize to the same name.
    pub fn keys_match(&self, key1: &str, key2: &str) -> KeyMatch {
        if key1 == key2 {
            return KeyMatch::identical();
        }

        let (Some((entity1, country1)), Some((entity2, country2))) = (split_key(key1), split_key(key2))
        else {
            return KeyMatch::with(false, KeyMatchReason::MalformedKey);
        };

        if country1 != country2 {
            return KeyMatch::with(false, KeyMatchReason::DifferentCountries);
        }

        let canonical1 = normalize_name(&self.canonicalize(entity1));
        let canonical2 = normalize_name(&self.canonicalize(entity2));

        if canonical1 == canonical2 {
            KeyMatch::with(true, KeyMatchReason::MatchAfterCanonicalization)
        } else {
            KeyMatch::with(false, KeyMatchReason::DifferentEntities)
        }
    }

    /// Number of synonym entries.
    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }

    /// Iterate the distinct canonical names.
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .synonyms
            .values()
            .chain(self.sub_brands.values())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }
}

/// The country is whatever follows the last delimiter.
fn split_key(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once(KEY_DELIMITER)
}

/// Shared built-in canonicalizer.
pub fn builtin() -> &'static EntityCanonicalizer {
    &BUILTIN
}

/// Canonicalize with the built-in tables.
pub fn canonicalize(raw: &str) -> String {
    BUILTIN.canonicalize(raw)
}

/// Resolve a sub-brand with the built-in tables.
pub fn resolve_sub_brand_to_parent(raw: &str) -> Option<&'static str> {
    BUILTIN.resolve_sub_brand_to_parent(raw)
}

/// Build an entity key with the built-in tables.
pub fn make_entity_key(entity_name: &str, country_code: &str) -> String {
    BUILTIN.make_entity_key(entity_name, country_code)
}

/// Compare entity keys with the built-in tables.
pub fn keys_match(key1: &str, key2: &str) -> KeyMatch {
    BUILTIN.keys_match(key1, key2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(canonicalize("  Clorox Company  "), "The Clorox Company");
        assert_eq!(canonicalize("clorox company"), "The Clorox Company");
        assert_eq!(canonicalize("LOREAL"), "L'Oréal S.A.");
    }

    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(canonicalize("  Totally Unknown Co "), "  Totally Unknown Co ");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn test_idempotent_over_tables() {
        let canonicalizer = builtin();
        for name in canonicalizer.canonical_names() {
            let once = canonicalizer.canonicalize(name);
            assert_eq!(canonicalizer.canonicalize(&once), once, "not idempotent for {name}");
        }
        for raw in ["p&g", "Nestle", "samsung", "warby parker, inc", "Acme"] {
            let once = canonicalize(raw);
            assert_eq!(canonicalize(&once), once);
        }
    }

    #[test]
    fn test_sub_brand_resolution() {
        assert_eq!(resolve_sub_brand_to_parent("Ben & Jerry's"), Some("Unilever"));
        assert_eq!(resolve_sub_brand_to_parent(" KITKAT "), Some("Nestlé S.A."));
        assert_eq!(resolve_sub_brand_to_parent("Totally Unknown Brand"), None);
        assert_eq!(resolve_sub_brand_to_parent(""), None);
    }

    #[test]
    fn test_resolve_owner() {
        let canonicalizer = builtin();
        assert_eq!(canonicalizer.resolve_owner("Tide"), "The Procter & Gamble Company");
        assert_eq!(canonicalizer.resolve_owner("oatly"), "Oatly AB");
        assert_eq!(canonicalizer.resolve_owner("Zzyzx"), "Zzyzx");
    }

    #[test]
    fn test_entity_key() {
        assert_eq!(make_entity_key("Nestle", "CH"), "nestlé s.a.|ch");
        assert_eq!(make_entity_key(" Acme Ltd ", " GB "), "acme ltd|gb");
    }

    #[test]
    fn test_keys_match_equivalent_spellings() {
        let result = keys_match(&make_entity_key("Nestle", "ch"), &make_entity_key("nestlé", "CH"));
        assert!(result.matched);
    }

    #[test]
    fn test_keys_match_after_canonicalization() {
        let result = keys_match("p&g|us", "procter and gamble|us");
        assert_eq!(
            result,
            KeyMatch { matched: true, reason: Some(KeyMatchReason::MatchAfterCanonicalization) }
        );
    }

    #[test]
    fn test_keys_match_failures() {
        assert_eq!(
            keys_match("unilever|gb", "unilever|nl").reason,
            Some(KeyMatchReason::DifferentCountries)
        );
        assert_eq!(
            keys_match("unilever|gb", "oatly|gb").reason,
            Some(KeyMatchReason::DifferentEntities)
        );
        assert_eq!(keys_match("unilever", "unilever|gb").reason, Some(KeyMatchReason::MalformedKey));
    }

    #[test]
    fn test_fixture_tables() {
        let canonicalizer = EntityCanonicalizer::new(
            [("ACME inc", "Acme, Inc.")],
            [("Roadrunner", "Acme, Inc.")],
        );
        assert_eq!(canonicalizer.canonicalize("acme INC"), "Acme, Inc.");
        assert_eq!(canonicalizer.canonicalize("Unilever PLC"), "Unilever PLC");
        assert_eq!(canonicalizer.resolve_sub_brand_to_parent("roadrunner"), Some("Acme, Inc."));
        assert_eq!(canonicalizer.synonym_count(), 1);
    }
}
