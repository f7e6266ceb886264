//! Explanation generation for disambiguation decisions.
//!
//! Converts decision rules and language rationales into human-readable
//! explanations for audit trails and the result screen.

use ownerlens_model::{
    Decision, DecisionRule, LanguageRationale, Outcome, ScoredCandidate, ScoringResult,
};
use serde::{Deserialize, Serialize};

/// A structured explanation for one fired rule or modifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Short summary (1 line)
    pub summary: String,

    /// Detailed explanation (1-2 sentences)
    pub detail: String,

    /// Machine-readable tag of the rule or rationale
    pub tag: String,

    /// Evidence items supporting this explanation
    pub evidence: Vec<EvidenceItem>,
}

/// A piece of evidence supporting an explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    /// The specific value
    pub value: String,

    /// Optional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EvidenceItem {
    fn new(kind: &str, value: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.into(),
            context: None,
        }
    }
}

/// Generate explanations for every rule that fired.
pub fn explain_result(result: &ScoringResult) -> Vec<Explanation> {
    result
        .decision_rules
        .iter()
        .map(|rule| explain_rule(*rule, result))
        .collect()
}

/// Generate explanation for a single decision rule.
pub fn explain_rule(rule: DecisionRule, result: &ScoringResult) -> Explanation {
    let top = result.top();
    let top_name = top.map(|c| c.candidate.name.as_str()).unwrap_or("the top candidate");

    match rule {
        DecisionRule::CloseScores => Explanation {
            summary: "Candidates are too close to call".to_string(),
            detail: format!(
                "The top two owners scored {:.2} and {:.2}, a gap of only {:.2}. \
                 Either could be the right owner.",
                result.top_score, result.second_score, result.score_gap
            ),
            tag: rule.as_str().to_string(),
            evidence: vec![
                EvidenceItem::new("top_score", format!("{:.2}", result.top_score)),
                EvidenceItem::new("second_score", format!("{:.2}", result.second_score)),
                EvidenceItem::new("score_gap", format!("{:.2}", result.score_gap)),
            ],
        },

        DecisionRule::LanguageContradiction => Explanation {
            summary: "Packaging language contradicts the top owner".to_string(),
            detail: format!(
                "The packaging text strongly suggests a different region than {}'s country.",
                top_name
            ),
            tag: rule.as_str().to_string(),
            evidence: top.map(country_evidence).into_iter().collect(),
        },

        DecisionRule::WeakSignalsWithLanguageContradiction => Explanation {
            summary: "Weak logo/OCR evidence and contradicting language".to_string(),
            detail: format!(
                "Logo and text recognition did not clearly identify {}, \
                 and the packaging language points elsewhere.",
                top_name
            ),
            tag: rule.as_str().to_string(),
            evidence: top
                .map(|c| {
                    vec![
                        EvidenceItem::new("logo_confidence", format!("{:.2}", c.candidate.logo_or_zero())),
                        EvidenceItem::new("ocr_confidence", format!("{:.2}", c.candidate.ocr_or_zero())),
                    ]
                })
                .unwrap_or_default(),
        },
    }
}

fn country_evidence(candidate: &ScoredCandidate) -> EvidenceItem {
    EvidenceItem {
        kind: "candidate_country".to_string(),
        value: candidate.candidate.country.clone(),
        context: Some(format!(
            "modifier {:.2} ({})",
            candidate.language_modifier,
            candidate.language_rationale.as_str()
        )),
    }
}

/// One-line description of a language modifier.
pub fn explain_rationale(rationale: LanguageRationale) -> &'static str {
    match rationale {
        LanguageRationale::NoEffect => "Packaging language did not affect this score",
        LanguageRationale::StrongContradiction => {
            "Score halved: strong packaging language contradicts the country and evidence is weak"
        }
        LanguageRationale::MixedContradiction => {
            "Score reduced: mixed packaging language contradicts the country"
        }
        LanguageRationale::SupportiveMatch => {
            "Score raised slightly: packaging language matches the country"
        }
    }
}

/// Generate a combined summary for a scoring result.
pub fn summarize_result(result: &ScoringResult) -> String {
    if result.should_disambiguate {
        let tags: Vec<_> = result.decision_rules.iter().map(|r| r.as_str()).collect();
        return format!("DISAMBIGUATE: {}", tags.join(", "));
    }

    match result.top() {
        Some(top) => format!("AUTO-ACCEPT: {} ({:.2})", top.candidate.name, top.final_score),
        None => "NO CANDIDATES".to_string(),
    }
}

/// Generate a summary for a decision, noting fast-path accepts.
pub fn summarize_decision(decision: &Decision) -> String {
    match (&decision.scoring, decision.outcome) {
        (Some(scoring), _) => summarize_result(scoring),
        (None, Outcome::AutoAccept) => "AUTO-ACCEPT: strong logo/OCR evidence".to_string(),
        (None, Outcome::Disambiguate) => "DISAMBIGUATE".to_string(),
    }
}
