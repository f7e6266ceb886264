//! Core domain model for ownerlens ownership disambiguation.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `DisambiguationCandidate`: A possible owner of a brand, from research
//! - `LanguageDetection`: Packaging-language signal derived from OCR text
//! - `ScoredCandidate` / `ScoringResult`: Ranked candidates with audit rules
//! - `Decision`: The final auto-accept / disambiguate outcome

use serde::{Deserialize, Serialize};

/// Where a candidate's confidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Corporate registry lookup
    Registry,
    /// Web research
    Web,
    /// Model inference without a cited source
    Ai,
}

impl Default for CandidateSource {
    fn default() -> Self {
        Self::Ai
    }
}

impl From<&str> for CandidateSource {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "registry" => Self::Registry,
            "web" => Self::Web,
            _ => Self::Ai,
        }
    }
}

/// One possible ownership entity for a brand.
///
/// Built from upstream research results. Missing numeric fields are not
/// errors: they deserialize to zero / `None` and are scored as weak evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisambiguationCandidate {
    /// Stable identifier for the entity
    #[serde(default)]
    pub id: String,

    /// Display name of the owning entity
    #[serde(default)]
    pub name: String,

    /// Country of the entity (English name or ISO alpha-2 code)
    #[serde(default)]
    pub country: String,

    /// Source-reported confidence, on a 0-1 or 0-100 scale
    #[serde(default)]
    pub confidence: f64,

    /// Which kind of source produced this candidate
    #[serde(default)]
    pub source: CandidateSource,

    /// Logo recognition confidence (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_confidence: Option<f64>,

    /// OCR confidence (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
}

impl DisambiguationCandidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: country.into(),
            confidence,
            source: CandidateSource::default(),
            logo_confidence: None,
            ocr_confidence: None,
        }
    }

    pub fn with_source(mut self, source: CandidateSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_logo_confidence(mut self, confidence: f64) -> Self {
        self.logo_confidence = Some(confidence);
        self
    }

    pub fn with_ocr_confidence(mut self, confidence: f64) -> Self {
        self.ocr_confidence = Some(confidence);
        self
    }

    /// Confidence on the 0-1 scale.
    ///
    /// Percent-scale values (above 1.0) are divided by 100; negative and
    /// non-finite values count as zero.
    pub fn unit_confidence(&self) -> f64 {
        let c = self.confidence;
        if !c.is_finite() || c <= 0.0 {
            0.0
        } else if c > 1.0 {
            (c / 100.0).min(1.0)
        } else {
            c
        }
    }

    /// Logo confidence, with a missing value counted as zero.
    pub fn logo_or_zero(&self) -> f64 {
        finite_or_zero(self.logo_confidence)
    }

    /// OCR confidence, with a missing value counted as zero.
    pub fn ocr_or_zero(&self) -> f64 {
        finite_or_zero(self.ocr_confidence)
    }

    /// True if either logo or OCR evidence falls below `threshold`.
    pub fn has_weak_evidence(&self, threshold: f64) -> bool {
        self.logo_or_zero() < threshold || self.ocr_or_zero() < threshold
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Coarse confidence tier for a language signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Strong,
    Mixed,
    Weak,
}

impl SignalStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Mixed => "mixed",
            Self::Weak => "weak",
        }
    }
}

impl std::fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected language and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// ISO 639-1 code (e.g. "sv", "en")
    pub lang: String,
    /// Confidence in 0-1
    pub conf: f64,
}

/// Packaging-language signal for one piece of OCR/user text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    /// Detected languages, confidence descending
    #[serde(default)]
    pub languages: Vec<DetectedLanguage>,

    /// Top language code, "en" for empty input, "unknown" with no signal
    pub dominant: String,

    /// Region / language-family tag of the dominant language
    pub cluster: String,

    /// How trustworthy the signal is
    pub strength: SignalStrength,
}

impl LanguageDetection {
    /// The fixed answer for empty text: assume English, weakly.
    pub fn english_fallback() -> Self {
        Self {
            languages: Vec::new(),
            dominant: "en".to_string(),
            cluster: "EN".to_string(),
            strength: SignalStrength::Weak,
        }
    }

    pub fn is_weak(&self) -> bool {
        self.strength == SignalStrength::Weak
    }
}

/// Why a language modifier was applied to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageRationale {
    NoEffect,
    StrongContradiction,
    MixedContradiction,
    SupportiveMatch,
}

impl Default for LanguageRationale {
    fn default() -> Self {
        Self::NoEffect
    }
}

impl LanguageRationale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEffect => "no_effect",
            Self::StrongContradiction => "strong_contradiction",
            Self::MixedContradiction => "mixed_contradiction",
            Self::SupportiveMatch => "supportive_match",
        }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::StrongContradiction | Self::MixedContradiction)
    }
}

/// A candidate after language adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: DisambiguationCandidate,

    /// `unit_confidence * language_modifier`
    pub final_score: f64,

    /// One of 0.5, 0.7, 1.0, 1.05
    pub language_modifier: f64,

    pub language_rationale: LanguageRationale,
}

/// Heuristics that can force a disambiguation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Top two scores are closer than the minimum gap
    CloseScores,
    /// Strong packaging language contradicts the top candidate's country
    LanguageContradiction,
    /// As above, and the top candidate's logo/OCR evidence is weak
    WeakSignalsWithLanguageContradiction,
}

impl DecisionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CloseScores => "close_scores",
            Self::LanguageContradiction => "language_contradiction",
            Self::WeakSignalsWithLanguageContradiction => {
                "weak_signals_with_language_contradiction"
            }
        }
    }

    /// Get a human-readable label for this rule.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CloseScores => "Close Scores",
            Self::LanguageContradiction => "Language Contradiction",
            Self::WeakSignalsWithLanguageContradiction => "Weak Evidence + Language Contradiction",
        }
    }
}

impl std::fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the disambiguation scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    /// Candidates sorted by final score, descending
    pub candidates: Vec<ScoredCandidate>,
    pub top_score: f64,
    pub second_score: f64,
    /// `top_score - second_score`, never negative
    pub score_gap: f64,
    /// Rules that fired, in evaluation order, without duplicates
    pub decision_rules: Vec<DecisionRule>,
    /// True iff at least one rule fired
    pub should_disambiguate: bool,
}

impl ScoringResult {
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    pub fn fired(&self, rule: DecisionRule) -> bool {
        self.decision_rules.contains(&rule)
    }
}

/// Final outcome for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AutoAccept,
    Disambiguate,
}

/// Authoritative decision, with the scoring that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub outcome: Outcome,

    /// Absent when the fast path accepted without scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringResult>,

    /// True if the fast-path accept check decided
    #[serde(default)]
    pub short_circuited: bool,
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        self.outcome == Outcome::AutoAccept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_str() {
        assert_eq!(CandidateSource::from("registry"), CandidateSource::Registry);
        assert_eq!(CandidateSource::from("WEB"), CandidateSource::Web);
        assert_eq!(CandidateSource::from("llm"), CandidateSource::Ai);
    }

    #[test]
    fn test_unit_confidence() {
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", 0.92).unit_confidence(), 0.92);
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", 85.0).unit_confidence(), 0.85);
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", -3.0).unit_confidence(), 0.0);
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", f64::NAN).unit_confidence(), 0.0);
    }

    #[test]
    fn test_unit_confidence_scale_boundary() {
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", 1.0).unit_confidence(), 1.0);
        let just_over = DisambiguationCandidate::new("a", "A", "US", 1.5).unit_confidence();
        assert!((just_over - 0.015).abs() < 1e-12);
        assert_eq!(DisambiguationCandidate::new("a", "A", "US", 250.0).unit_confidence(), 1.0);
    }

    #[test]
    fn test_missing_evidence_is_weak() {
        let candidate = DisambiguationCandidate::new("a", "A", "US", 0.9).with_logo_confidence(0.95);
        assert_eq!(candidate.ocr_or_zero(), 0.0);
        assert!(candidate.has_weak_evidence(0.6));

        let strong = candidate.with_ocr_confidence(0.9);
        assert!(!strong.has_weak_evidence(0.6));
    }

    #[test]
    fn test_candidate_deserializes_camel_case() {
        let json = r#"{"id":"ok","name":"OK Snacks A/S","country":"Denmark",
            "confidence":0.92,"source":"web","logoConfidence":0.9,"ocrConfidence":0.9}"#;
        let candidate: DisambiguationCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.source, CandidateSource::Web);
        assert_eq!(candidate.logo_confidence, Some(0.9));
    }

    #[test]
    fn test_malformed_candidate_defaults() {
        let candidate: DisambiguationCandidate = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(candidate.confidence, 0.0);
        assert_eq!(candidate.country, "");
        assert_eq!(candidate.source, CandidateSource::Ai);
    }

    #[test]
    fn test_rule_tags() {
        let json = serde_json::to_string(&DecisionRule::WeakSignalsWithLanguageContradiction).unwrap();
        assert_eq!(json, "\"weak_signals_with_language_contradiction\"");
        assert_eq!(DecisionRule::CloseScores.to_string(), "close_scores");
    }

    #[test]
    fn test_rationale_contradiction() {
        assert!(LanguageRationale::StrongContradiction.is_contradiction());
        assert!(LanguageRationale::MixedContradiction.is_contradiction());
        assert!(!LanguageRationale::SupportiveMatch.is_contradiction());
        assert!(!LanguageRationale::NoEffect.is_contradiction());
    }
}
