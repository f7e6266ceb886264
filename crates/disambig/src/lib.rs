//! Disambiguation scoring for ownership candidates.
//!
//! Adjusts each candidate's confidence by a packaging-language modifier,
//! ranks the candidates, and evaluates the rules that decide whether the
//! user must pick the owner instead of the top candidate being accepted.

mod config;

pub use config::{DisambigConfig, MIN_GAP_ENV, STRONG_THRESHOLD_ENV, WEAK_THRESHOLD_ENV};

use ownerlens_model::{
    Decision, DecisionRule, DisambiguationCandidate, LanguageDetection, LanguageRationale, Outcome,
    ScoredCandidate, ScoringResult, SignalStrength,
};
use ownerlens_signals::{ClusterTable, UNKNOWN};

/// Facts about one candidate that the modifier rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierInputs {
    /// Signal cluster disagrees with the candidate's country cluster
    pub contradiction: bool,
    /// Logo or OCR confidence below the weak threshold
    pub weak_evidence: bool,
    pub strength: SignalStrength,
}

/// One row of the language-modifier decision table.
#[derive(Debug, Clone, Copy)]
pub struct ModifierRule {
    pub rationale: LanguageRationale,
    pub modifier: f64,
    pub applies: fn(&ModifierInputs) -> bool,
}

/// Evaluated top to bottom, first match wins.
pub const MODIFIER_RULES: &[ModifierRule] = &[
    ModifierRule {
        rationale: LanguageRationale::StrongContradiction,
        modifier: 0.5,
        applies: strong_contradiction,
    },
    ModifierRule {
        rationale: LanguageRationale::MixedContradiction,
        modifier: 0.7,
        applies: mixed_contradiction,
    },
    ModifierRule {
        rationale: LanguageRationale::SupportiveMatch,
        modifier: 1.05,
        applies: supportive_match,
    },
];

/// Modifier when no rule matches or there is no signal.
pub const NEUTRAL_MODIFIER: f64 = 1.0;

fn strong_contradiction(inputs: &ModifierInputs) -> bool {
    inputs.contradiction && inputs.weak_evidence && inputs.strength == SignalStrength::Strong
}

fn mixed_contradiction(inputs: &ModifierInputs) -> bool {
    inputs.contradiction && inputs.strength == SignalStrength::Mixed
}

fn supportive_match(inputs: &ModifierInputs) -> bool {
    !inputs.contradiction && inputs.strength == SignalStrength::Strong
}

/// Pick the modifier for the given facts from [`MODIFIER_RULES`].
pub fn select_modifier(inputs: &ModifierInputs) -> (f64, LanguageRationale) {
    MODIFIER_RULES
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .map(|rule| (rule.modifier, rule.rationale))
        .unwrap_or((NEUTRAL_MODIFIER, LanguageRationale::NoEffect))
}

/// Scorer bound to its thresholds and a country cluster table.
#[derive(Debug, Clone)]
pub struct DisambiguationScorer<'a> {
    config: DisambigConfig,
    clusters: &'a ClusterTable,
}

impl DisambiguationScorer<'static> {
    /// Scorer using the built-in cluster table.
    pub fn with_builtin_clusters(config: DisambigConfig) -> Self {
        Self::new(config, ownerlens_signals::builtin().clusters())
    }
}

impl<'a> DisambiguationScorer<'a> {
    pub fn new(config: DisambigConfig, clusters: &'a ClusterTable) -> Self {
        Self { config, clusters }
    }

    pub fn config(&self) -> &DisambigConfig {
        &self.config
    }

    /// True if a non-weak signal points at a different cluster than the
    /// candidate's country. Unknown countries never contradict.
    pub fn has_contradiction(&self, signal: &LanguageDetection, country: &str) -> bool {
        if signal.is_weak() || signal.cluster.is_empty() || signal.cluster == UNKNOWN {
            return false;
        }

        match self.clusters.country_cluster(country) {
            Some(expected) => expected != signal.cluster,
            None => false,
        }
    }

    /// Language modifier and rationale for one candidate.
    pub fn language_modifier(
        &self,
        candidate: &DisambiguationCandidate,
        signal: &LanguageDetection,
    ) -> (f64, LanguageRationale) {
        let inputs = ModifierInputs {
            contradiction: self.has_contradiction(signal, &candidate.country),
            weak_evidence: candidate.has_weak_evidence(self.config.weak_threshold),
            strength: signal.strength,
        };

        let (modifier, rationale) = select_modifier(&inputs);
        if rationale != LanguageRationale::NoEffect {
            tracing::debug!(
                candidate = %candidate.name,
                dominant = %signal.dominant,
                cluster = %signal.cluster,
                modifier,
                reason = rationale.as_str(),
                "language modifier applied"
            );
        }

        (modifier, rationale)
    }

    /// Apply the language modifier without mutating the candidate.
    pub fn score_candidate(
        &self,
        candidate: &DisambiguationCandidate,
        signal: Option<&LanguageDetection>,
    ) -> ScoredCandidate {
        let (modifier, rationale) = match signal {
            Some(signal) => self.language_modifier(candidate, signal),
            None => (NEUTRAL_MODIFIER, LanguageRationale::NoEffect),
        };

        ScoredCandidate {
            candidate: candidate.clone(),
            final_score: candidate.unit_confidence() * modifier,
            language_modifier: modifier,
            language_rationale: rationale,
        }
    }

    /// Rank candidates and evaluate the disambiguation rules.
    pub fn score(
        &self,
        candidates: &[DisambiguationCandidate],
        signal: Option<&LanguageDetection>,
    ) -> ScoringResult {
        if candidates.is_empty() {
            return ScoringResult::default();
        }

        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| self.score_candidate(candidate, signal))
            .collect();

        // Sort by final score descending
        scored.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top_score = scored.first().map(|c| c.final_score).unwrap_or(0.0);
        let second_score = scored.get(1).map(|c| c.final_score).unwrap_or(0.0);
        let score_gap = (top_score - second_score).max(0.0);

        let strong_signal = signal.is_some_and(|s| s.strength == SignalStrength::Strong);
        let top_contradicted = scored[0].language_rationale.is_contradiction();
        let top_weak = scored[0].candidate.has_weak_evidence(self.config.weak_threshold);

        let mut decision_rules = Vec::new();
        let mut fire = |rule: DecisionRule| {
            if !decision_rules.contains(&rule) {
                tracing::info!(reason = rule.as_str(), "disambiguation rule fired");
                decision_rules.push(rule);
            }
        };

        if score_gap < self.config.min_gap {
            fire(DecisionRule::CloseScores);
        }
        if strong_signal && top_contradicted {
            fire(DecisionRule::LanguageContradiction);
        }
        if strong_signal && top_contradicted && top_weak {
            fire(DecisionRule::WeakSignalsWithLanguageContradiction);
        }

        let should_disambiguate = !decision_rules.is_empty();

        ScoringResult {
            candidates: scored,
            top_score,
            second_score,
            score_gap,
            decision_rules,
            should_disambiguate,
        }
    }

    /// Early accept check based on raw logo/OCR evidence.
    ///
    /// The top candidate (by raw confidence) is accepted when its logo or
    /// OCR confidence is above the strong threshold and the brand is known
    /// to be unambiguous, or the language signal does not count against it.
    pub fn should_accept_without_disambiguation(
        &self,
        candidates: &[DisambiguationCandidate],
        signal: Option<&LanguageDetection>,
        brand_ambiguous: Option<bool>,
    ) -> bool {
        let Some(top) = top_by_confidence(candidates) else {
            return true;
        };

        let strong = self.config.strong_threshold;
        if top.logo_or_zero() <= strong && top.ocr_or_zero() <= strong {
            return false;
        }

        if brand_ambiguous == Some(false) {
            return true;
        }

        match signal {
            None => true,
            Some(signal) if signal.is_weak() => true,
            Some(signal) => self.language_modifier(top, signal).0 >= NEUTRAL_MODIFIER,
        }
    }

    /// Authoritative decision for a lookup.
    ///
    /// The full scorer decides. The fast path only short-circuits a lone
    /// candidate under a non-strong signal whose adjusted score clears the
    /// minimum gap, where no scoring rule can fire.
    pub fn decide(
        &self,
        candidates: &[DisambiguationCandidate],
        signal: Option<&LanguageDetection>,
        brand_ambiguous: Option<bool>,
    ) -> Decision {
        if self.fast_path_is_safe(candidates, signal)
            && self.should_accept_without_disambiguation(candidates, signal, brand_ambiguous)
        {
            tracing::debug!(candidate = %candidates[0].name, "accepted on fast path");
            return Decision {
                outcome: Outcome::AutoAccept,
                scoring: None,
                short_circuited: true,
            };
        }

        let scoring = self.score(candidates, signal);
        let outcome = if scoring.should_disambiguate {
            Outcome::Disambiguate
        } else {
            Outcome::AutoAccept
        };

        Decision {
            outcome,
            scoring: Some(scoring),
            short_circuited: false,
        }
    }

    fn fast_path_is_safe(
        &self,
        candidates: &[DisambiguationCandidate],
        signal: Option<&LanguageDetection>,
    ) -> bool {
        let [only] = candidates else {
            return false;
        };
        if signal.is_some_and(|s| s.strength == SignalStrength::Strong) {
            return false;
        }
        self.score_candidate(only, signal).final_score >= self.config.min_gap
    }
}

fn top_by_confidence(candidates: &[DisambiguationCandidate]) -> Option<&DisambiguationCandidate> {
    // First of equals wins, matching a stable descending sort
    candidates.iter().fold(None, |best, candidate| match best {
        Some(b) if b.unit_confidence() >= candidate.unit_confidence() => Some(b),
        _ => Some(candidate),
    })
}

/// Score with the built-in cluster table.
pub fn score(
    candidates: &[DisambiguationCandidate],
    signal: Option<&LanguageDetection>,
    config: &DisambigConfig,
) -> ScoringResult {
    DisambiguationScorer::with_builtin_clusters(*config).score(candidates, signal)
}

/// Fast-path accept check with the built-in cluster table.
pub fn should_accept_without_disambiguation(
    candidates: &[DisambiguationCandidate],
    signal: Option<&LanguageDetection>,
    brand_ambiguous: Option<bool>,
    config: &DisambigConfig,
) -> bool {
    DisambiguationScorer::with_builtin_clusters(*config).should_accept_without_disambiguation(
        candidates,
        signal,
        brand_ambiguous,
    )
}

/// Authoritative decision with the built-in cluster table.
pub fn decide(
    candidates: &[DisambiguationCandidate],
    signal: Option<&LanguageDetection>,
    brand_ambiguous: Option<bool>,
    config: &DisambigConfig,
) -> Decision {
    DisambiguationScorer::with_builtin_clusters(*config).decide(candidates, signal, brand_ambiguous)
}
