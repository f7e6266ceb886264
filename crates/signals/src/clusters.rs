use std::collections::HashMap;

const LANGUAGE_CLUSTERS: &[(&str, &str)] = &[
    ("sv", "SE"),
    ("fi", "FI"),
    ("da", "Nordics"),
    ("no", "Nordics"),
    ("de", "DE"),
    ("fr", "FR"),
    ("en", "EN"),
    ("es", "ES"),
    ("it", "IT"),
    ("ja", "JP"),
    ("ko", "KR"),
    ("zh", "CN"),
];

// English names and ISO 3166 alpha-2 codes.
const COUNTRY_CLUSTERS: &[(&str, &str)] = &[
    ("sweden", "SE"),
    ("se", "SE"),
    ("finland", "FI"),
    ("fi", "FI"),
    ("denmark", "Nordics"),
    ("dk", "Nordics"),
    ("norway", "Nordics"),
    ("no", "Nordics"),
    ("germany", "DE"),
    ("de", "DE"),
    ("france", "FR"),
    ("fr", "FR"),
    ("united states", "EN"),
    ("usa", "EN"),
    ("us", "EN"),
    ("united kingdom", "EN"),
    ("uk", "EN"),
    ("gb", "EN"),
    ("spain", "ES"),
    ("es", "ES"),
    ("italy", "IT"),
    ("it", "IT"),
    ("japan", "JP"),
    ("jp", "JP"),
    ("south korea", "KR"),
    ("kr", "KR"),
    ("china", "CN"),
    ("cn", "CN"),
];

/// Language -> cluster and country -> cluster lookups.
///
/// Keys are matched case-insensitively after trimming.
#[derive(Debug, Clone)]
pub struct ClusterTable {
    languages: HashMap<String, String>,
    countries: HashMap<String, String>,
}

impl Default for ClusterTable {
    fn default() -> Self {
        Self::new(LANGUAGE_CLUSTERS.iter().copied(), COUNTRY_CLUSTERS.iter().copied())
    }
}

impl ClusterTable {
    pub fn new<L, C, K, V>(languages: L, countries: C) -> Self
    where
        L: IntoIterator<Item = (K, V)>,
        C: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(|(k, v)| (key(k.as_ref()), v.into())).collect(),
            countries: countries.into_iter().map(|(k, v)| (key(k.as_ref()), v.into())).collect(),
        }
    }

    /// Cluster for a language code.
    pub fn language_cluster(&self, lang: &str) -> Option<&str> {
        self.languages.get(&key(lang)).map(String::as_str)
    }

    /// Expected cluster for a candidate's country, `None` if unknown or blank.
    pub fn country_cluster(&self, country: &str) -> Option<&str> {
        self.countries.get(&key(country)).map(String::as_str)
    }
}

fn key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
