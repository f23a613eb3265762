//! Data model shared by every pipeline stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fetched and parsed article.
///
/// Created by the article fetcher and never mutated afterwards; cached by `url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleRecord {
    pub url: String,

    pub title: String,

    /// Extracted body text (may be empty if the parser found nothing)
    pub body_text: String,

    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub top_image: Option<String>,

    /// Heuristic trust weight in [0, 1]
    pub credibility: f64,

    pub source_domain: String,
}

impl ArticleRecord {
    /// Source metadata attached to evidence drawn from this article.
    pub fn source_meta(&self) -> SourceMeta {
        SourceMeta {
            url: self.url.clone(),
            title: if self.title.trim().is_empty() {
                "No title available".to_string()
            } else {
                self.title.clone()
            },
            publish_date: self.publish_date,
            credibility: self.credibility,
            domain: self.source_domain.clone(),
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body_text.trim().is_empty()
    }
}

/// Where an evidence sentence came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceMeta {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    pub credibility: f64,
    pub domain: String,
}

impl SourceMeta {
    /// Synthetic source for built-in reference facts.
    pub fn reference() -> Self {
        Self {
            url: String::new(),
            title: "Established reference fact".to_string(),
            publish_date: None,
            credibility: 1.0,
            domain: "reference".to_string(),
        }
    }
}

/// Entailment / contradiction / neutral probabilities from an NLI scorer.
///
/// Each component lies in [0, 1]; they need not sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct NliScores {
    pub entailment: f64,
    pub contradiction: f64,
    pub neutral: f64,
}

impl NliScores {
    pub fn new(entailment: f64, contradiction: f64, neutral: f64) -> Self {
        Self {
            entailment: entailment.clamp(0.0, 1.0),
            contradiction: contradiction.clamp(0.0, 1.0),
            neutral: neutral.clamp(0.0, 1.0),
        }
    }

    /// Build scores from `(label, score)` pairs as returned by classifier APIs.
    ///
    /// Accepts `ENTAILMENT`/`ENTAIL`, `CONTRADICTION`/`CONTRADICT` and `NEUTRAL`
    /// in any case. Unknown labels are ignored; missing labels score 0.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut scores = Self::default();
        for (label, score) in labels {
            match label.to_ascii_uppercase().as_str() {
                "ENTAILMENT" | "ENTAIL" => scores.entailment = score,
                "CONTRADICTION" | "CONTRADICT" => scores.contradiction = score,
                "NEUTRAL" => scores.neutral = score,
                _ => {}
            }
        }
        Self::new(scores.entailment, scores.contradiction, scores.neutral)
    }

    /// Strength of the strongest directional signal.
    pub fn strength(&self) -> f64 {
        self.entailment.max(self.contradiction)
    }
}

/// A single scored sentence with its source.
///
/// Produced by the ranker and never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenceItem {
    pub sentence: String,
    pub entailment: f64,
    pub contradiction: f64,
    pub neutral: f64,
    pub source: SourceMeta,
}

impl EvidenceItem {
    pub fn new(sentence: impl Into<String>, scores: NliScores, source: SourceMeta) -> Self {
        Self {
            sentence: sentence.into(),
            entailment: scores.entailment,
            contradiction: scores.contradiction,
            neutral: scores.neutral,
            source,
        }
    }

    /// `max(entailment, contradiction)`, the primary ranking key.
    pub fn strength(&self) -> f64 {
        self.entailment.max(self.contradiction)
    }
}

/// The discrete verdict labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    True,
    False,
    Mixed,
    LikelyTrue,
    LikelyFalse,
    Unclear,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::True => "TRUE",
            VerdictLabel::False => "FALSE",
            VerdictLabel::Mixed => "MIXED",
            VerdictLabel::LikelyTrue => "LIKELY TRUE",
            VerdictLabel::LikelyFalse => "LIKELY FALSE",
            VerdictLabel::Unclear => "UNCLEAR",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal output of the verdict engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictDecision {
    pub label: VerdictLabel,
    pub reason: String,
}

impl VerdictDecision {
    pub fn new(label: VerdictLabel, reason: impl Into<String>) -> Self {
        Self {
            label,
            reason: reason.into(),
        }
    }
}

/// Verdict derived from free-text reasoning. Never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisoryVerdict {
    pub label: VerdictLabel,
    pub reason: String,
}

/// Result of one `check` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub claim: String,

    pub verdict: VerdictLabel,

    /// Fixed reason string from the verdict engine
    pub reason: String,

    /// Reason plus evidence counts and any generated analysis
    pub rationale: String,

    /// Top evidence items in rank order (at most 10)
    pub evidence: Vec<EvidenceItem>,

    pub processing_time_seconds: f64,

    pub articles_processed: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryVerdict>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Failures that were degraded rather than raised
    #[serde(default)]
    pub absorbed_failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_from_labels() {
        let scores = NliScores::from_labels([
            ("entailment", 0.7),
            ("CONTRADICT", 0.2),
            ("Neutral", 0.1),
            ("other", 0.9),
        ]);
        assert_eq!(scores.entailment, 0.7);
        assert_eq!(scores.contradiction, 0.2);
        assert_eq!(scores.neutral, 0.1);
    }

    #[test]
    fn test_scores_are_clamped() {
        let scores = NliScores::new(1.4, -0.2, 0.5);
        assert_eq!(scores.entailment, 1.0);
        assert_eq!(scores.contradiction, 0.0);
    }

    #[test]
    fn test_label_serialization() {
        let json = serde_json::to_string(&VerdictLabel::LikelyFalse).unwrap();
        assert_eq!(json, "\"LIKELY_FALSE\"");
        assert_eq!(VerdictLabel::LikelyFalse.to_string(), "LIKELY FALSE");
    }

    #[test]
    fn test_untitled_article_source() {
        let article = ArticleRecord {
            url: "https://example.com/a".to_string(),
            title: "  ".to_string(),
            body_text: String::new(),
            publish_date: None,
            authors: vec![],
            top_image: None,
            credibility: 0.5,
            source_domain: "example.com".to_string(),
        };
        assert_eq!(article.source_meta().title, "No title available");
        assert!(!article.has_body());
    }
}
