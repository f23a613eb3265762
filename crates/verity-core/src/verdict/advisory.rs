//! Best-effort classification of free-text reasoning into a verdict.
//!
//! The result is advisory only and never replaces the rule-based verdict.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{AdvisoryVerdict, VerdictLabel};

pub const NO_ARTICLES_REASON: &str = "No articles available for AI analysis.";

const MAX_DETAIL_LINES: usize = 2;
const SUMMARY_CHARS: usize = 200;

const CUE_PHRASES: &[&str] = &[
    "because",
    "due to",
    "evidence shows",
    "analysis indicates",
    "based on",
    "according to",
    "suggests that",
    "indicates that",
    "likely",
    "probably",
    "appears to",
    "seems to",
];

lazy_static! {
    static ref TRUE_PATTERN: Regex = Regex::new(r"(?i)\btrue\b").unwrap();
    static ref FALSE_PATTERN: Regex = Regex::new(r"(?i)\bfalse\b").unwrap();
    static ref MIXED_PATTERN: Regex = Regex::new(r"(?i)\b(mixed|conflicting)\b").unwrap();
    static ref UNCLEAR_PATTERN: Regex = Regex::new(r"(?i)\b(unclear|insufficient)\b").unwrap();
}

/// Classify generated prose by keyword.
///
/// "true" without "false" → TRUE, "false" without "true" → FALSE,
/// "mixed"/"conflicting" → MIXED, anything else → UNCLEAR.
pub fn classify_reasoning(text: &str) -> AdvisoryVerdict {
    let has_true = TRUE_PATTERN.is_match(text);
    let has_false = FALSE_PATTERN.is_match(text);

    let (label, prefix) = if has_true && !has_false {
        (
            VerdictLabel::True,
            "AI analysis confirms this claim is likely true.",
        )
    } else if has_false && !has_true {
        (
            VerdictLabel::False,
            "AI analysis indicates this claim is likely false.",
        )
    } else if MIXED_PATTERN.is_match(text) {
        (
            VerdictLabel::Mixed,
            "AI analysis shows mixed or conflicting evidence.",
        )
    } else if UNCLEAR_PATTERN.is_match(text) {
        (
            VerdictLabel::Unclear,
            "AI analysis finds insufficient evidence for a clear verdict.",
        )
    } else {
        (
            VerdictLabel::Unclear,
            "AI analysis could not determine a clear verdict.",
        )
    };

    AdvisoryVerdict {
        label,
        reason: format!("{} {}", prefix, reasoning_details(text)),
    }
}

/// The advisory verdict when there is nothing to analyze.
pub fn no_articles() -> AdvisoryVerdict {
    AdvisoryVerdict {
        label: VerdictLabel::Unclear,
        reason: NO_ARTICLES_REASON.to_string(),
    }
}

/// Up to two lines containing reasoning cues, or a short summary.
pub fn reasoning_details(text: &str) -> String {
    if text.trim().is_empty() {
        return "No detailed reasoning available.".to_string();
    }

    let cued: Vec<&str> = text
        .lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            CUE_PHRASES.iter().any(|cue| lower.contains(cue))
        })
        .map(str::trim)
        .take(MAX_DETAIL_LINES)
        .collect();

    if !cued.is_empty() {
        return cued.join(" ");
    }

    if text.chars().count() > SUMMARY_CHARS {
        let summary: String = text.chars().take(SUMMARY_CHARS).collect();
        format!("{}...", summary)
    } else {
        text.to_string()
    }
}
