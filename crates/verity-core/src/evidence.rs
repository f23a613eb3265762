//! Evidence ordering, filtering and categorization.
//!
//! Every item lands in exactly one bucket:
//! 1. `entailment >= min_entailment` → supporting
//! 2. else `contradiction >= min_contradiction` → contradicting
//! 3. else → neutral

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{ArticleRecord, EvidenceItem, NliScores};

/// Scores of the placeholder emitted for articles without usable evidence.
pub const PLACEHOLDER_SCORES: NliScores = NliScores {
    entailment: 0.33,
    contradiction: 0.33,
    neutral: 0.34,
};

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd", "co", "gen",
    "gov", "sen", "rep", "no", "u.s", "u.k", "e.g", "i.e",
];

/// Categorization thresholds. Tunable through configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvidenceThresholds {
    pub min_entailment: f64,
    pub min_contradiction: f64,
}

impl Default for EvidenceThresholds {
    fn default() -> Self {
        Self {
            min_entailment: 0.65,
            min_contradiction: 0.65,
        }
    }
}

/// The logical bucket an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBucket {
    Supporting,
    Contradicting,
    Neutral,
}

impl EvidenceThresholds {
    pub fn classify(&self, item: &EvidenceItem) -> EvidenceBucket {
        if item.entailment >= self.min_entailment {
            EvidenceBucket::Supporting
        } else if item.contradiction >= self.min_contradiction {
            EvidenceBucket::Contradicting
        } else {
            EvidenceBucket::Neutral
        }
    }

    /// Partition items into the three buckets, preserving relative order.
    pub fn categorize(&self, items: &[EvidenceItem]) -> CategorizedEvidence {
        let mut categorized = CategorizedEvidence::default();
        for item in items {
            let bucket = match self.classify(item) {
                EvidenceBucket::Supporting => &mut categorized.supporting,
                EvidenceBucket::Contradicting => &mut categorized.contradicting,
                EvidenceBucket::Neutral => &mut categorized.neutral,
            };
            bucket.push(item.clone());
        }
        categorized
    }
}

/// Evidence split into supporting, contradicting and neutral buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorizedEvidence {
    pub supporting: Vec<EvidenceItem>,
    pub contradicting: Vec<EvidenceItem>,
    pub neutral: Vec<EvidenceItem>,
}

impl CategorizedEvidence {
    pub fn len(&self) -> usize {
        self.supporting.len() + self.contradicting.len() + self.neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descending by `(max(entailment, contradiction), credibility)`.
pub fn compare_rank(a: &EvidenceItem, b: &EvidenceItem) -> Ordering {
    b.strength()
        .total_cmp(&a.strength())
        .then_with(|| b.source.credibility.total_cmp(&a.source.credibility))
}

/// Sort evidence into final rank order. Stable for equal keys.
pub fn sort_by_rank(items: &mut [EvidenceItem]) {
    items.sort_by(compare_rank);
}

/// Keep items whose entailment or contradiction exceeds `keep_threshold`,
/// strongest first, at most `cap` of them.
pub fn select_article_evidence(
    mut items: Vec<EvidenceItem>,
    keep_threshold: f64,
    cap: usize,
) -> Vec<EvidenceItem> {
    items.retain(|item| item.entailment > keep_threshold || item.contradiction > keep_threshold);
    items.sort_by(|a, b| b.strength().total_cmp(&a.strength()));
    items.truncate(cap);
    items
}

/// One weak, neutral-leaning item per article, carrying that article's source.
pub fn placeholder_evidence(claim: &str, articles: &[ArticleRecord]) -> Vec<EvidenceItem> {
    articles
        .iter()
        .map(|article| {
            EvidenceItem::new(
                format!(
                    "No strong evidence found in this article for the claim: '{}'.",
                    claim
                ),
                PLACEHOLDER_SCORES,
                article.source_meta(),
            )
        })
        .collect()
}

/// Split text into sentences on terminal punctuation and line breaks.
///
/// A period after a common abbreviation or a single capital letter does not
/// end a sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            push_sentence(&mut sentences, &mut current);
            continue;
        }

        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            // Absorb closing quotes/brackets and repeated punctuation.
            while let Some(&next) = chars.peek() {
                if matches!(next, '"' | '\'' | ')' | ']' | '”' | '’' | '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }

            let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
            if at_boundary && !(c == '.' && ends_with_abbreviation(&current)) {
                push_sentence(&mut sentences, &mut current);
            }
        }
    }

    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

fn ends_with_abbreviation(current: &str) -> bool {
    let last_word = current
        .trim_end_matches(['.', '"', '\'', ')', ']', '”', '’'])
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();

    if last_word.chars().count() == 1 && last_word.chars().all(char::is_uppercase) {
        return true;
    }

    let lowered = last_word.to_lowercase();
    ABBREVIATIONS.contains(&lowered.trim_start_matches(['(', '"', '\'']))
}

/// Lowercase whitespace-separated tokens of `text`.
pub fn word_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Coarse relevance filter: keep sentences that share a token with the
/// claim or are longer than `min_tokens` words.
pub fn relevant_sentences(claim: &str, sentences: Vec<String>, min_tokens: usize) -> Vec<String> {
    let claim_tokens = word_tokens(claim);
    sentences
        .into_iter()
        .filter(|sentence| {
            let word_count = sentence.split_whitespace().count();
            word_count > min_tokens
                || sentence
                    .split_whitespace()
                    .any(|w| claim_tokens.contains(&w.to_lowercase()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceMeta;
    use proptest::prelude::*;

    fn item(entailment: f64, contradiction: f64, credibility: f64) -> EvidenceItem {
        EvidenceItem::new(
            format!("e={} c={}", entailment, contradiction),
            NliScores::new(entailment, contradiction, 0.0),
            SourceMeta {
                url: "https://example.com".to_string(),
                title: "Example".to_string(),
                publish_date: None,
                credibility,
                domain: "example.com".to_string(),
            },
        )
    }

    fn article(url: &str) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            body_text: "Body".to_string(),
            publish_date: None,
            authors: vec![],
            top_image: None,
            credibility: 0.7,
            source_domain: "example.com".to_string(),
        }
    }

    #[test]
    fn test_supporting_takes_priority() {
        let thresholds = EvidenceThresholds::default();
        // Both scores above threshold: entailment wins.
        assert_eq!(thresholds.classify(&item(0.7, 0.9, 0.5)), EvidenceBucket::Supporting);
        assert_eq!(thresholds.classify(&item(0.6, 0.65, 0.5)), EvidenceBucket::Contradicting);
        assert_eq!(thresholds.classify(&item(0.64, 0.64, 0.5)), EvidenceBucket::Neutral);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = EvidenceThresholds {
            min_entailment: 0.5,
            min_contradiction: 0.9,
        };
        let categorized = thresholds.categorize(&[item(0.55, 0.1, 0.5), item(0.1, 0.8, 0.5)]);
        assert_eq!(categorized.supporting.len(), 1);
        assert_eq!(categorized.contradicting.len(), 0);
        assert_eq!(categorized.neutral.len(), 1);
    }

    #[test]
    fn test_rank_order() {
        let mut items = vec![item(0.5, 0.1, 0.9), item(0.2, 0.8, 0.5), item(0.8, 0.1, 0.9)];
        sort_by_rank(&mut items);
        assert_eq!(items[0].entailment, 0.8);
        assert_eq!(items[1].contradiction, 0.8);
        assert_eq!(items[2].entailment, 0.5);
    }

    #[test]
    fn test_rank_ties_broken_by_credibility() {
        let mut items = vec![item(0.7, 0.1, 0.5), item(0.1, 0.7, 0.9)];
        sort_by_rank(&mut items);
        assert_eq!(items[0].source.credibility, 0.9);
    }

    #[test]
    fn test_select_article_evidence() {
        let items = vec![
            item(0.3, 0.2, 0.5),
            item(0.41, 0.1, 0.5),
            item(0.1, 0.9, 0.5),
            item(0.6, 0.1, 0.5),
            item(0.4, 0.4, 0.5),
        ];
        let kept = select_article_evidence(items, 0.4, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].contradiction, 0.9);
        assert_eq!(kept[1].entailment, 0.6);
    }

    #[test]
    fn test_placeholder_per_article() {
        let articles = vec![article("https://a.com"), article("https://b.com")];
        let placeholders = placeholder_evidence("claim", &articles);
        assert_eq!(placeholders.len(), 2);
        assert_eq!(placeholders[1].source.url, "https://b.com");
        assert_eq!(placeholders[0].neutral, 0.34);
        assert_eq!(placeholders[0].entailment, 0.33);
    }

    #[test]
    fn test_split_sentences() {
        let text = "Dr. Smith arrived today. He said \"hello!\" Then left?\nNew line here";
        let sentences = split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "Dr. Smith arrived today.",
                "He said \"hello!\"",
                "Then left?",
                "New line here",
            ]
        );
    }

    #[test]
    fn test_split_keeps_decimals_and_initials() {
        let sentences = split_sentences("Growth hit 3.5 percent. J. Doe agreed.");
        assert_eq!(sentences, vec!["Growth hit 3.5 percent.", "J. Doe agreed."]);
    }

    #[test]
    fn test_relevance_filter() {
        let sentences = vec![
            "Paris is lovely.".to_string(),
            "Short one.".to_string(),
            "This sentence has more than five words in it.".to_string(),
        ];
        let kept = relevant_sentences("The tower is in paris", sentences, 5);
        assert_eq!(kept.len(), 1 + 1);
        assert!(kept.iter().all(|s| s != "Short one."));
    }

    proptest! {
        #[test]
        fn prop_every_item_in_exactly_one_bucket(
            scores in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 0..40),
            min_e in 0.0f64..=1.0,
            min_c in 0.0f64..=1.0,
        ) {
            let thresholds = EvidenceThresholds { min_entailment: min_e, min_contradiction: min_c };
            let items: Vec<EvidenceItem> = scores.iter().map(|(e, c)| item(*e, *c, 0.5)).collect();
            let categorized = thresholds.categorize(&items);

            prop_assert_eq!(categorized.len(), items.len());
            prop_assert!(categorized.supporting.iter().all(|i| i.entailment >= min_e));
            prop_assert!(categorized
                .contradicting
                .iter()
                .all(|i| i.contradiction >= min_c && i.entailment < min_e));
            prop_assert!(categorized
                .neutral
                .iter()
                .all(|i| i.entailment < min_e && i.contradiction < min_c));
        }

        #[test]
        fn prop_rank_order_is_descending(
            scores in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0), 0..40),
        ) {
            let mut items: Vec<EvidenceItem> =
                scores.iter().map(|(e, c, cred)| item(*e, *c, *cred)).collect();
            sort_by_rank(&mut items);
            for pair in items.windows(2) {
                prop_assert!(compare_rank(&pair[0], &pair[1]) != Ordering::Greater);
            }
        }
    }
}
