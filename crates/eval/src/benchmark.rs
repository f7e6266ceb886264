//! Disambiguation benchmark over labelled cases.

use ownerlens_disambig::DisambiguationScorer;
use ownerlens_model::{Decision, DisambiguationCandidate};
use serde::{Deserialize, Serialize};

/// Highest tolerated share of accepts that picked the wrong owner.
pub const MAX_WRONG_ACCEPT_RATE: f64 = 0.10;

/// Lowest tolerated share of ambiguous brands that prompt the user.
pub const MIN_AMBIGUOUS_TRIGGER_RATE: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseKind {
    Ambiguous,
    NonAmbiguous,
}

/// One labelled benchmark case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkCase {
    pub brand: String,
    #[serde(rename = "type")]
    pub kind: CaseKind,
    /// Id of the correct owner, if known
    #[serde(default)]
    pub truth: Option<String>,
    /// Packaging/OCR text for the language signal
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub brand_ambiguous: Option<bool>,
    pub candidates: Vec<DisambiguationCandidate>,
}

/// Outcome of running one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub brand: String,
    pub kind: CaseKind,
    pub accepted: bool,
    pub options: usize,
    pub chosen_id: Option<String>,
    pub truth_id: Option<String>,
    pub correct_accept: Option<bool>,
    pub wrong_accept: Option<bool>,
    pub triggered: Option<bool>,
    pub languages: Vec<String>,
    pub gap: f64,
    pub rules: Vec<String>,
}

/// Aggregate benchmark metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub ambiguous: usize,
    pub non_ambiguous: usize,
    pub ambiguous_trigger_rate: f64,
    pub wrong_accept_rate: f64,
    pub correct_accept_rate: f64,
    pub abstain_rate: f64,
    pub failures: Vec<String>,
}

impl Summary {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run a single case through language detection and the decision.
pub fn run_case(scorer: &DisambiguationScorer<'_>, case: &BenchmarkCase) -> CaseReport {
    let signal = case.text.as_deref().map(ownerlens_signals::detect);
    let decision = scorer.decide(&case.candidates, signal.as_ref(), case.brand_ambiguous);

    let accepted = decision.is_accept();
    let options = case.candidates.len();
    let chosen_id = if accepted {
        accepted_id(&decision, &case.candidates)
    } else {
        None
    };

    let (correct_accept, wrong_accept, triggered) = match &case.truth {
        Some(truth) => (
            Some(accepted && chosen_id.as_deref() == Some(truth.as_str())),
            Some(accepted && chosen_id.as_deref() != Some(truth.as_str())),
            Some(!accepted && options >= 2),
        ),
        None => (None, None, None),
    };

    let scoring = decision.scoring.as_ref();
    CaseReport {
        brand: case.brand.clone(),
        kind: case.kind,
        accepted,
        options,
        chosen_id,
        truth_id: case.truth.clone(),
        correct_accept,
        wrong_accept,
        triggered,
        languages: signal
            .map(|s| s.languages.into_iter().map(|l| l.lang).collect())
            .unwrap_or_default(),
        gap: scoring.map(|s| s.score_gap).unwrap_or(0.0),
        rules: scoring
            .map(|s| s.decision_rules.iter().map(|r| r.as_str().to_string()).collect())
            .unwrap_or_default(),
    }
}

fn accepted_id(decision: &Decision, candidates: &[DisambiguationCandidate]) -> Option<String> {
    match &decision.scoring {
        Some(scoring) => scoring.top().map(|c| c.candidate.id.clone()),
        // Fast path only fires for a lone candidate
        None => candidates.first().map(|c| c.id.clone()),
    }
}

/// Compute aggregate rates and threshold failures.
pub fn summarize(reports: &[CaseReport]) -> Summary {
    let with_truth = |kind: CaseKind| {
        reports
            .iter()
            .filter(move |r| r.kind == kind && r.truth_id.is_some())
    };

    let ambiguous = with_truth(CaseKind::Ambiguous).count();
    let non_ambiguous = with_truth(CaseKind::NonAmbiguous).count();

    let ambiguous_trigger_rate = rate(
        with_truth(CaseKind::Ambiguous)
            .filter(|r| r.triggered == Some(true))
            .count(),
        ambiguous,
    );
    let wrong_accept_rate = flag_rate(reports, |r| r.wrong_accept);
    let correct_accept_rate = flag_rate(reports, |r| r.correct_accept);
    let abstain_rate = rate(
        reports.iter().filter(|r| !r.accepted && r.options < 2).count(),
        reports.len(),
    );

    let mut failures = Vec::new();
    if wrong_accept_rate > MAX_WRONG_ACCEPT_RATE {
        failures.push(format!(
            "Wrong accept rate {:.1}% exceeds {:.0}% threshold",
            wrong_accept_rate * 100.0,
            MAX_WRONG_ACCEPT_RATE * 100.0
        ));
    }
    if ambiguous >= 3 && ambiguous_trigger_rate < MIN_AMBIGUOUS_TRIGGER_RATE {
        failures.push(format!(
            "Ambiguous trigger rate {:.1}% below {:.0}% threshold",
            ambiguous_trigger_rate * 100.0,
            MIN_AMBIGUOUS_TRIGGER_RATE * 100.0
        ));
    }

    Summary {
        total: reports.len(),
        ambiguous,
        non_ambiguous,
        ambiguous_trigger_rate,
        wrong_accept_rate,
        correct_accept_rate,
        abstain_rate,
        failures,
    }
}

fn flag_rate(reports: &[CaseReport], flag: impl Fn(&CaseReport) -> Option<bool>) -> f64 {
    let known: Vec<bool> = reports.iter().filter_map(|r| flag(r)).collect();
    rate(known.iter().filter(|b| **b).count(), known.len())
}

fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ownerlens_disambig::DisambigConfig;
    use pretty_assertions::assert_eq;

    fn case(brand: &str, kind: CaseKind, truth: &str, candidates: Vec<DisambiguationCandidate>) -> BenchmarkCase {
        BenchmarkCase {
            brand: brand.to_string(),
            kind,
            truth: Some(truth.to_string()),
            text: None,
            brand_ambiguous: None,
            candidates,
        }
    }

    fn candidate(id: &str, confidence: f64) -> DisambiguationCandidate {
        DisambiguationCandidate::new(id, id, "United States", confidence)
    }

    #[test]
    fn test_ambiguous_case_triggers() {
        let scorer = DisambiguationScorer::with_builtin_clusters(DisambigConfig::default());
        let delta = case(
            "Delta",
            CaseKind::Ambiguous,
            "delta-faucet",
            vec![candidate("delta-air", 0.81), candidate("delta-faucet", 0.80)],
        );

        let report = run_case(&scorer, &delta);
        assert!(!report.accepted);
        assert_eq!(report.triggered, Some(true));
        assert_eq!(report.wrong_accept, Some(false));
        assert_eq!(report.rules, vec!["close_scores".to_string()]);
    }

    #[test]
    fn test_clear_case_accepts_truth() {
        let scorer = DisambiguationScorer::with_builtin_clusters(DisambigConfig::default());
        let nike = case(
            "Nike",
            CaseKind::NonAmbiguous,
            "nike-inc",
            vec![candidate("nike-inc", 0.95).with_logo_confidence(0.9).with_ocr_confidence(0.9)],
        );

        let report = run_case(&scorer, &nike);
        assert!(report.accepted);
        assert_eq!(report.chosen_id.as_deref(), Some("nike-inc"));
        assert_eq!(report.correct_accept, Some(true));
    }

    #[test]
    fn test_summary_rates_and_failures() {
        let scorer = DisambiguationScorer::with_builtin_clusters(DisambigConfig::default());
        let cases = vec![
            case("Delta", CaseKind::Ambiguous, "delta-faucet", vec![candidate("delta-air", 0.9), candidate("delta-faucet", 0.5)]),
            case("Dove", CaseKind::Ambiguous, "dove-soap", vec![candidate("dove-choc", 0.9), candidate("dove-soap", 0.4)]),
            case("Polo", CaseKind::Ambiguous, "polo-ralph", vec![candidate("polo-ralph", 0.7), candidate("vw-polo", 0.69)]),
        ];
        let reports: Vec<_> = cases.iter().map(|c| run_case(&scorer, c)).collect();
        let summary = summarize(&reports);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.ambiguous, 3);
        assert!((summary.ambiguous_trigger_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!((summary.wrong_accept_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.failures.len(), 1);
        assert!(!summary.passed());
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.wrong_accept_rate, 0.0);
        assert!(summary.passed());
    }
}
