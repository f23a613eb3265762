//! Rule-based verdict decision.
//!
//! Rules are evaluated in strict order and the first match wins:
//! 1. ≥2 strong supporting, 0 strong contradicting → TRUE
//! 2. ≥2 strong contradicting, 0 strong supporting → FALSE
//! 3. ≥1 strong on each side → MIXED
//! 4. ≥2 supporting → LIKELY TRUE
//! 5. ≥2 contradicting → LIKELY FALSE
//! 6. ≥1 supporting → UNCLEAR
//! 7. ≥1 contradicting → UNCLEAR
//! 8. fabrication heuristic → FALSE
//! 9. otherwise → UNCLEAR

use serde::{Deserialize, Serialize};

use crate::evidence::CategorizedEvidence;
use crate::types::{EvidenceItem, VerdictDecision, VerdictLabel};
use crate::verdict::fabrication;

pub const REASON_TRUE: &str = "Multiple reliable sources strongly support this claim.";
pub const REASON_FALSE: &str = "Multiple reliable sources strongly contradict this claim.";
pub const REASON_MIXED: &str = "There is conflicting evidence from reliable sources.";
pub const REASON_LIKELY_TRUE: &str = "Multiple sources support this claim, but not strongly.";
pub const REASON_LIKELY_FALSE: &str = "Multiple sources contradict this claim, but not strongly.";
pub const REASON_WEAK_SUPPORT: &str =
    "Some supporting evidence found, but not sufficient for confirmation.";
pub const REASON_WEAK_CONTRADICTION: &str =
    "Some contradicting evidence found, but not sufficient for refutation.";
pub const REASON_FABRICATED: &str = "No credible sources found supporting this claim, and the claim contains suspicious indicators suggesting it may be fabricated.";
pub const REASON_INSUFFICIENT: &str = "Insufficient high-quality evidence to determine veracity.";
pub const REASON_NO_SOURCES: &str = "No relevant sources found for this claim.";

/// Verdict engine settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VerdictConfig {
    /// Score at or above which an item counts as strong evidence
    pub strong_threshold: f64,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.8,
        }
    }
}

/// Maps categorized evidence to a verdict label and a fixed reason.
#[derive(Debug, Clone, Default)]
pub struct VerdictEngine {
    config: VerdictConfig,
}

impl VerdictEngine {
    pub fn new(config: VerdictConfig) -> Self {
        Self { config }
    }

    /// Decide a verdict from categorized evidence.
    ///
    /// The claim is only used by the fabrication heuristic; pass `None` to
    /// disable it.
    pub fn decide(
        &self,
        claim: Option<&str>,
        supporting: &[EvidenceItem],
        contradicting: &[EvidenceItem],
        neutral: &[EvidenceItem],
    ) -> VerdictDecision {
        let strong = self.config.strong_threshold;
        let strong_support = supporting.iter().filter(|e| e.entailment >= strong).count();
        let strong_contradict = contradicting
            .iter()
            .filter(|e| e.contradiction >= strong)
            .count();

        tracing::info!(
            supporting = supporting.len(),
            contradicting = contradicting.len(),
            neutral = neutral.len(),
            strong_support,
            strong_contradict,
            "Determining verdict"
        );

        if strong_support >= 2 && strong_contradict == 0 {
            VerdictDecision::new(VerdictLabel::True, REASON_TRUE)
        } else if strong_contradict >= 2 && strong_support == 0 {
            VerdictDecision::new(VerdictLabel::False, REASON_FALSE)
        } else if strong_support >= 1 && strong_contradict >= 1 {
            VerdictDecision::new(VerdictLabel::Mixed, REASON_MIXED)
        } else if supporting.len() >= 2 {
            VerdictDecision::new(VerdictLabel::LikelyTrue, REASON_LIKELY_TRUE)
        } else if contradicting.len() >= 2 {
            VerdictDecision::new(VerdictLabel::LikelyFalse, REASON_LIKELY_FALSE)
        } else if !supporting.is_empty() {
            VerdictDecision::new(VerdictLabel::Unclear, REASON_WEAK_SUPPORT)
        } else if !contradicting.is_empty() {
            VerdictDecision::new(VerdictLabel::Unclear, REASON_WEAK_CONTRADICTION)
        } else if claim.is_some_and(|c| fabrication::looks_fabricated(c, supporting.len())) {
            VerdictDecision::new(VerdictLabel::False, REASON_FABRICATED)
        } else {
            VerdictDecision::new(VerdictLabel::Unclear, REASON_INSUFFICIENT)
        }
    }

    pub fn decide_categorized(
        &self,
        claim: Option<&str>,
        evidence: &CategorizedEvidence,
    ) -> VerdictDecision {
        self.decide(
            claim,
            &evidence.supporting,
            &evidence.contradicting,
            &evidence.neutral,
        )
    }

    /// Terminal decision when no source was found at all.
    pub fn no_sources() -> VerdictDecision {
        VerdictDecision::new(VerdictLabel::Unclear, REASON_NO_SOURCES)
    }
}

/// Build the human-readable rationale for a decision.
///
/// Generated reasoning, when present, is appended as an "AI Analysis"
/// paragraph.
pub fn build_rationale(
    decision: &VerdictDecision,
    supporting: usize,
    contradicting: usize,
    reasoning: Option<&str>,
) -> String {
    let mut rationale = format!("Verdict: {}. {} ", decision.label, decision.reason);

    if supporting > 0 {
        rationale.push_str(&format!("Found {} supporting evidence sentences. ", supporting));
    }
    if contradicting > 0 {
        rationale.push_str(&format!(
            "Found {} contradicting evidence sentences.",
            contradicting
        ));
    }
    if supporting == 0 && contradicting == 0 {
        rationale.push_str("No strong evidence was found for or against the claim.");
    }

    if let Some(reasoning) = reasoning {
        rationale.push_str("\n\nAI Analysis: ");
        rationale.push_str(reasoning);
    }

    rationale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NliScores, SourceMeta};

    fn item(entailment: f64, contradiction: f64) -> EvidenceItem {
        EvidenceItem::new(
            "sentence",
            NliScores::new(entailment, contradiction, 0.1),
            SourceMeta {
                url: "https://example.com".to_string(),
                title: "Example".to_string(),
                publish_date: None,
                credibility: 0.5,
                domain: "example.com".to_string(),
            },
        )
    }

    fn engine() -> VerdictEngine {
        VerdictEngine::default()
    }

    #[test]
    fn test_two_strong_supporting_is_true() {
        let supporting = vec![item(0.85, 0.05), item(0.85, 0.05)];
        let decision = engine().decide(None, &supporting, &[], &[]);
        assert_eq!(decision.label, VerdictLabel::True);
        assert_eq!(decision.reason, REASON_TRUE);
    }

    #[test]
    fn test_two_strong_contradicting_is_false() {
        let contradicting = vec![item(0.1, 0.9), item(0.2, 0.8)];
        let decision = engine().decide(None, &[], &contradicting, &[]);
        assert_eq!(decision.label, VerdictLabel::False);
    }

    #[test]
    fn test_strong_on_both_sides_is_mixed() {
        let decision = engine().decide(None, &[item(0.9, 0.0)], &[item(0.0, 0.9)], &[]);
        assert_eq!(decision.label, VerdictLabel::Mixed);
        assert_eq!(decision.reason, REASON_MIXED);
    }

    #[test]
    fn test_mixed_beats_many_weak() {
        let supporting = vec![item(0.9, 0.0), item(0.9, 0.0)];
        let decision = engine().decide(None, &supporting, &[item(0.0, 0.85)], &[]);
        assert_eq!(decision.label, VerdictLabel::Mixed);
    }

    #[test]
    fn test_weak_majorities() {
        let weak = vec![item(0.7, 0.0), item(0.7, 0.0)];
        assert_eq!(
            engine().decide(None, &weak, &[], &[]).label,
            VerdictLabel::LikelyTrue
        );

        let weak = vec![item(0.0, 0.7), item(0.0, 0.7)];
        assert_eq!(
            engine().decide(None, &[], &weak, &[]).label,
            VerdictLabel::LikelyFalse
        );
    }

    #[test]
    fn test_single_weak_item_is_unclear() {
        let decision = engine().decide(None, &[item(0.7, 0.0)], &[], &[]);
        assert_eq!(decision.label, VerdictLabel::Unclear);
        assert_eq!(decision.reason, REASON_WEAK_SUPPORT);

        let decision = engine().decide(None, &[], &[item(0.0, 0.7)], &[]);
        assert_eq!(decision.reason, REASON_WEAK_CONTRADICTION);
    }

    #[test]
    fn test_empty_evidence_is_insufficient() {
        let decision = engine().decide(Some("The Eiffel Tower is in Paris"), &[], &[], &[]);
        assert_eq!(decision.label, VerdictLabel::Unclear);
        assert_eq!(decision.reason, REASON_INSUFFICIENT);
    }

    #[test]
    fn test_fabricated_entertainment_claim_is_false() {
        let decision = engine().decide(
            Some("actress Xxxyyyzzz announced her retirement"),
            &[],
            &[],
            &[item(0.3, 0.3)],
        );
        assert_eq!(decision.label, VerdictLabel::False);
        assert_eq!(decision.reason, REASON_FABRICATED);
    }

    #[test]
    fn test_fabrication_needs_claim() {
        let decision = engine().decide(None, &[], &[], &[]);
        assert_eq!(decision.reason, REASON_INSUFFICIENT);
    }

    #[test]
    fn test_custom_strong_threshold() {
        let engine = VerdictEngine::new(VerdictConfig {
            strong_threshold: 0.7,
        });
        let supporting = vec![item(0.75, 0.0), item(0.75, 0.0)];
        assert_eq!(
            engine.decide(None, &supporting, &[], &[]).label,
            VerdictLabel::True
        );
    }

    #[test]
    fn test_rationale() {
        let decision = VerdictDecision::new(VerdictLabel::True, REASON_TRUE);
        assert_eq!(
            build_rationale(&decision, 2, 1, None),
            "Verdict: TRUE. Multiple reliable sources strongly support this claim. \
             Found 2 supporting evidence sentences. Found 1 contradicting evidence sentences."
        );

        let decision = VerdictDecision::new(VerdictLabel::Unclear, REASON_INSUFFICIENT);
        let rationale = build_rationale(&decision, 0, 0, Some("Looks doubtful."));
        assert!(rationale.starts_with("Verdict: UNCLEAR."));
        assert!(rationale.contains("No strong evidence was found for or against the claim."));
        assert!(rationale.ends_with("\n\nAI Analysis: Looks doubtful."));
    }
}
