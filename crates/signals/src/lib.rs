//! Packaging-language signal detection.
//!
//! Estimates which languages appear in OCR/packaging text from diagnostic
//! characters (diacritics, CJK script ranges) and a handful of English
//! stopwords. It is a fast heuristic signal, not a classifier:
//! - per-language confidence is the diagnostic character density, capped at 0.9
//! - English confidence is distinct stopword hits / 5, capped at 0.8
//! - the dominant language maps to a coarse regional cluster

mod clusters;

pub use clusters::ClusterTable;

use ownerlens_model::{DetectedLanguage, LanguageDetection, SignalStrength};
use regex::Regex;
use std::sync::LazyLock;

/// Cap for script/diacritic based confidence.
pub const SCRIPT_CONFIDENCE_CAP: f64 = 0.9;

/// Cap for stopword based English confidence.
pub const ENGLISH_CONFIDENCE_CAP: f64 = 0.8;

/// Cluster tag for languages without a mapping.
pub const UNKNOWN: &str = "unknown";

const ENGLISH_STOPWORDS: &[&str] = &["the", "and", "of", "to", "in", "for", "with", "on", "at", "by"];

static SCRIPT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("sv", r"[åäö]"),
        ("fi", r"[äö]"),
        ("da", r"[æøå]"),
        ("no", r"[æøå]"),
        ("de", r"[äöüß]"),
        ("fr", r"[àâäéèêëïîôöùûüÿç]"),
        ("es", r"[áéíóúñü]"),
        ("it", r"[àèéìíîòóù]"),
        ("ja", r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}]"),
        ("ko", r"[\x{AC00}-\x{D7AF}]"),
        ("zh", r"[\x{4E00}-\x{9FFF}]"),
    ]
    .into_iter()
    .map(|(lang, pattern)| (lang, Regex::new(pattern).unwrap()))
    .collect()
});

static BUILTIN: LazyLock<LanguageDetector> = LazyLock::new(LanguageDetector::default);

/// Language detector bound to a cluster table.
#[derive(Debug, Clone, Default)]
pub struct LanguageDetector {
    clusters: ClusterTable,
}

impl LanguageDetector {
    pub fn new(clusters: ClusterTable) -> Self {
        Self { clusters }
    }

    pub fn clusters(&self) -> &ClusterTable {
        &self.clusters
    }

    /// Detect packaging languages in `text`.
    pub fn detect(&self, text: &str) -> LanguageDetection {
        if text.trim().is_empty() {
            return LanguageDetection::english_fallback();
        }

        let normalized = text.to_lowercase();
        let mut languages = script_languages(&normalized);

        let english_hits = english_stopword_hits(&normalized);
        if english_hits > 0 {
            languages.push(DetectedLanguage {
                lang: "en".to_string(),
                conf: (english_hits as f64 / 5.0).min(ENGLISH_CONFIDENCE_CAP),
            });
        }

        // Stable sort keeps pattern order among ties
        languages.sort_by(|a, b| b.conf.partial_cmp(&a.conf).unwrap_or(std::cmp::Ordering::Equal));

        let detection = match languages.first() {
            Some(top) => LanguageDetection {
                dominant: top.lang.clone(),
                cluster: self
                    .clusters
                    .language_cluster(&top.lang)
                    .unwrap_or(UNKNOWN)
                    .to_string(),
                strength: classify_strength(top.conf, languages.len()),
                languages,
            },
            None => LanguageDetection {
                languages,
                dominant: UNKNOWN.to_string(),
                cluster: UNKNOWN.to_string(),
                strength: SignalStrength::Weak,
            },
        };

        if !detection.is_weak() {
            tracing::info!(
                dominant = %detection.dominant,
                cluster = %detection.cluster,
                strength = %detection.strength,
                "language signal"
            );
        }

        detection
    }
}

/// Diagnostic-character density per language.
fn script_languages(normalized: &str) -> Vec<DetectedLanguage> {
    let length = normalized.chars().count() as f64;
    let denominator = (length * 0.1).max(1.0);

    SCRIPT_PATTERNS
        .iter()
        .filter_map(|(lang, pattern)| {
            let matches = pattern.find_iter(normalized).count();
            (matches > 0).then(|| DetectedLanguage {
                lang: lang.to_string(),
                conf: (matches as f64 / denominator).min(SCRIPT_CONFIDENCE_CAP),
            })
        })
        .collect()
}

/// Number of distinct English stopwords found anywhere in the text.
///
/// Plain containment, so "in" also counts inside "ingredients".
fn english_stopword_hits(normalized: &str) -> usize {
    ENGLISH_STOPWORDS
        .iter()
        .filter(|word| normalized.contains(*word))
        .count()
}

fn classify_strength(top_confidence: f64, detected: usize) -> SignalStrength {
    if detected == 1 && top_confidence > 0.7 {
        SignalStrength::Strong
    } else if top_confidence > 0.5 || detected > 1 {
        SignalStrength::Mixed
    } else {
        SignalStrength::Weak
    }
}

/// Detect with the built-in cluster table.
pub fn detect(text: &str) -> LanguageDetection {
    BUILTIN.detect(text)
}

/// Shared built-in detector.
pub fn builtin() -> &'static LanguageDetector {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_text_defaults_to_english() {
        assert_eq!(detect(""), LanguageDetection::english_fallback());
        assert_eq!(detect("   \n\t").cluster, "EN");
        assert_eq!(detect("  ").strength, SignalStrength::Weak);
    }

    #[test]
    fn test_strong_english() {
        let detection = detect("The best of the crisps and snacks for you, with sea salt");
        assert_eq!(detection.dominant, "en");
        assert_eq!(detection.cluster, "EN");
        assert_eq!(detection.strength, SignalStrength::Strong);
        assert_eq!(detection.languages.len(), 1);
        assert_eq!(detection.languages[0].conf, 0.8);
    }

    #[test]
    fn test_stopwords_match_inside_words() {
        // "in", "to" and "at" each count once
        let detection = detect("ingredients: potatoes, sunflower oil");
        assert_eq!(detection.dominant, "en");
        assert_eq!(detection.cluster, "EN");
        assert_eq!(detection.languages.len(), 1);
        assert!((detection.languages[0].conf - 0.6).abs() < 1e-9);
        // A lone language above 0.5 but not above 0.7 is mixed
        assert_eq!(detection.strength, SignalStrength::Mixed);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let detection = detect("12345 !!");
        assert!(detection.languages.is_empty());
        assert_eq!(detection.dominant, UNKNOWN);
        assert_eq!(detection.cluster, UNKNOWN);
        assert_eq!(detection.strength, SignalStrength::Weak);
    }

    #[test]
    fn test_weak_english() {
        let detection = detect("salt and pepper");
        assert_eq!(detection.languages[0].conf, 0.2);
        assert_eq!(detection.strength, SignalStrength::Weak);
    }

    #[test]
    fn test_japanese_script() {
        let detection = detect("ポテトチップス うすしお味");
        assert_eq!(detection.dominant, "ja");
        assert_eq!(detection.cluster, "JP");
        assert_eq!(detection.strength, SignalStrength::Mixed);
        // Kanji in the same text is picked up as Chinese too
        assert!(detection.languages.iter().any(|l| l.lang == "zh"));
    }

    #[test]
    fn test_korean_is_strong() {
        let detection = detect("감자칩");
        assert_eq!(detection.dominant, "ko");
        assert_eq!(detection.cluster, "KR");
        assert_eq!(detection.languages[0].conf, SCRIPT_CONFIDENCE_CAP);
        assert_eq!(detection.strength, SignalStrength::Strong);
    }

    #[test]
    fn test_nordic_text_is_mixed() {
        let detection = detect("Smørrebrød på æblebrød");
        assert!(detection.languages.len() > 1);
        assert_eq!(detection.strength, SignalStrength::Mixed);
        let confidences: Vec<f64> = detection.languages.iter().map(|l| l.conf).collect();
        let mut sorted = confidences.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(confidences, sorted);
    }

    #[test]
    fn test_custom_cluster_table() {
        let detector = LanguageDetector::new(ClusterTable::new([("en", "ANGLO")], [("Ireland", "ANGLO")]));
        let detection = detector.detect("the cat and the hat on a mat by the door");
        assert_eq!(detection.cluster, "ANGLO");
        assert_eq!(detector.clusters().country_cluster("ireland"), Some("ANGLO"));
    }
}
