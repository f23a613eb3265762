//! Evidence extraction and ranking.
//!
//! Turns fetched articles into a ranked list of scored sentences:
//! 1. Claims matching the built-in fact table are answered directly
//! 2. Each article's sentences are filtered for relevance and scored in
//!    batches by the NLI scorer
//! 3. Weak scores are dropped and each article keeps its strongest items
//! 4. Articles that yield nothing still produce neutral placeholders
//! 5. Everything is sorted by strength, then source credibility

use futures::future::join_all;
use std::sync::Arc;
use verity_core::evidence::{
    placeholder_evidence, relevant_sentences, select_article_evidence, sort_by_rank,
    split_sentences,
};
use verity_core::{known_fact_evidence, ArticleRecord, CategorizedEvidence, EvidenceItem};

use crate::config::EvidenceConfig;
use crate::nli::NliScorer;
use crate::providers::ProviderError;

/// A scorer failure for one batch of one article's sentences.
#[derive(Debug, Clone)]
pub struct AnalysisFailure {
    pub url: String,
    pub error: ProviderError,
}

/// How the ranked list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceOrigin {
    /// Built-in fact table, articles not analyzed
    KnownFact,
    /// Scored article sentences
    Articles,
    /// Neutral stand-ins, one per article
    Placeholder,
    /// Nothing to analyze
    Empty,
}

/// Ranked evidence plus the failures absorbed while producing it.
#[derive(Debug, Clone)]
pub struct RankedEvidence {
    /// Strongest first
    pub items: Vec<EvidenceItem>,
    pub origin: EvidenceOrigin,
    pub failures: Vec<AnalysisFailure>,
}

pub struct EvidenceRanker {
    scorer: Arc<dyn NliScorer>,
    config: EvidenceConfig,
}

impl EvidenceRanker {
    pub fn new(scorer: Arc<dyn NliScorer>, config: EvidenceConfig) -> Self {
        Self { scorer, config }
    }

    /// Score and rank evidence for `claim` from `articles`.
    ///
    /// Never fails: a scorer error costs the affected batch, not the call.
    pub async fn rank(&self, claim: &str, articles: &[ArticleRecord]) -> RankedEvidence {
        if let Some(items) = known_fact_evidence(claim) {
            tracing::info!("Claim matches a built-in fact, skipping article analysis");
            return RankedEvidence {
                items,
                origin: EvidenceOrigin::KnownFact,
                failures: Vec::new(),
            };
        }

        let analyses = join_all(
            articles
                .iter()
                .filter(|article| article.has_body())
                .map(|article| self.analyze_article(claim, article)),
        )
        .await;

        let mut items = Vec::new();
        let mut failures = Vec::new();
        for (article_items, article_failures) in analyses {
            items.extend(article_items);
            failures.extend(article_failures);
        }

        let origin = if !items.is_empty() {
            EvidenceOrigin::Articles
        } else if !articles.is_empty() {
            tracing::info!(
                articles = articles.len(),
                "No scored evidence, using placeholders"
            );
            items = placeholder_evidence(claim, articles);
            EvidenceOrigin::Placeholder
        } else {
            EvidenceOrigin::Empty
        };

        sort_by_rank(&mut items);
        tracing::info!(count = items.len(), "Ranked evidence");

        RankedEvidence {
            items,
            origin,
            failures,
        }
    }

    /// Convenience wrapper splitting evidence by the configured thresholds.
    pub fn categorize(&self, items: &[EvidenceItem]) -> CategorizedEvidence {
        self.config.thresholds().categorize(items)
    }

    async fn analyze_article(
        &self,
        claim: &str,
        article: &ArticleRecord,
    ) -> (Vec<EvidenceItem>, Vec<AnalysisFailure>) {
        let sentences = relevant_sentences(
            claim,
            split_sentences(&article.body_text),
            self.config.min_relevant_tokens,
        );
        if sentences.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let source = article.source_meta();
        let mut scored = Vec::new();
        let mut failures = Vec::new();

        let timeout = self.config.scorer_timeout;
        for batch in sentences.chunks(self.config.batch_size.max(1)) {
            let result = tokio::time::timeout(timeout, self.scorer.score_batch(claim, batch))
                .await
                .unwrap_or_else(|_| Err(ProviderError::Timeout(timeout)));
            match result {
                Ok(scores) => {
                    for (sentence, scores) in batch.iter().zip(scores) {
                        tracing::debug!(
                            url = %article.url,
                            entailment = scores.entailment,
                            contradiction = scores.contradiction,
                            "Scored sentence"
                        );
                        scored.push(EvidenceItem::new(sentence.as_str(), scores, source.clone()));
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        url = %article.url,
                        scorer = self.scorer.name(),
                        error = %error,
                        "Evidence analysis failed for batch"
                    );
                    failures.push(AnalysisFailure {
                        url: article.url.clone(),
                        error,
                    });
                }
            }
        }

        let kept = select_article_evidence(
            scored,
            self.config.keep_threshold,
            self.config.max_sentences_per_article,
        );
        (kept, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use verity_core::NliScores;

    /// Scores by keyword: "confirmed" entails, "denied" contradicts.
    struct KeywordScorer {
        fail_for: Option<&'static str>,
        batches: Mutex<Vec<usize>>,
    }

    impl KeywordScorer {
        fn new() -> Self {
            Self {
                fail_for: None,
                batches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NliScorer for KeywordScorer {
        async fn score_batch(
            &self,
            _claim: &str,
            sentences: &[String],
        ) -> Result<Vec<NliScores>, ProviderError> {
            self.batches.lock().push(sentences.len());
            if let Some(marker) = self.fail_for {
                if sentences.iter().any(|s| s.contains(marker)) {
                    return Err(ProviderError::Timeout(std::time::Duration::from_secs(60)));
                }
            }
            Ok(sentences
                .iter()
                .map(|s| {
                    if s.contains("confirmed") {
                        NliScores::new(0.9, 0.05, 0.05)
                    } else if s.contains("denied") {
                        NliScores::new(0.05, 0.85, 0.1)
                    } else if s.contains("perhaps") {
                        NliScores::new(0.45, 0.1, 0.45)
                    } else {
                        NliScores::new(0.1, 0.1, 0.8)
                    }
                })
                .collect())
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    fn article(url: &str, credibility: f64, body: &str) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: format!("Title for {}", url),
            body_text: body.to_string(),
            publish_date: None,
            authors: Vec::new(),
            top_image: None,
            credibility,
            source_domain: verity_core::source_domain(url),
        }
    }

    fn ranker(scorer: Arc<KeywordScorer>) -> EvidenceRanker {
        EvidenceRanker::new(scorer, EvidenceConfig::default())
    }

    const CLAIM: &str = "The minister visited Beijing";

    #[tokio::test]
    async fn test_known_fact_bypasses_articles() {
        let scorer = Arc::new(KeywordScorer::new());
        let ranked = ranker(scorer.clone())
            .rank(
                "The earth is flat",
                &[article("https://a.com/1", 0.5, "The earth was confirmed round.")],
            )
            .await;

        assert_eq!(ranked.origin, EvidenceOrigin::KnownFact);
        assert_eq!(ranked.items.len(), 1);
        assert!(scorer.batches.lock().is_empty());
    }

    #[tokio::test]
    async fn test_ranked_by_strength_then_credibility() {
        let scorer = Arc::new(KeywordScorer::new());
        let articles = vec![
            article(
                "https://low.com/1",
                0.5,
                "The visit was confirmed by officials. The minister was perhaps tired.",
            ),
            article("https://high.com/2", 0.9, "The visit was confirmed by officials."),
            article("https://deny.com/3", 0.7, "The ministry denied the visit."),
        ];
        let ranked = ranker(scorer).rank(CLAIM, &articles).await;

        assert_eq!(ranked.origin, EvidenceOrigin::Articles);
        let order: Vec<(&str, f64)> = ranked
            .items
            .iter()
            .map(|item| (item.source.domain.as_str(), item.strength()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("high.com", 0.9),
                ("low.com", 0.9),
                ("deny.com", 0.85),
                ("low.com", 0.45),
            ]
        );
        assert_eq!(ranked.items[0].source.title, "Title for https://high.com/2");
    }

    #[tokio::test]
    async fn test_batches_and_per_article_cap() {
        let scorer = Arc::new(KeywordScorer::new());
        let body = (0..8)
            .map(|i| format!("Beijing visit number {} was confirmed.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let ranked = ranker(scorer.clone())
            .rank(CLAIM, &[article("https://a.com/1", 0.5, &body)])
            .await;

        assert_eq!(*scorer.batches.lock(), vec![6, 2]);
        assert_eq!(ranked.items.len(), 4);
    }

    #[tokio::test]
    async fn test_placeholders_when_nothing_scores() {
        let scorer = Arc::new(KeywordScorer::new());
        let articles = vec![
            article("https://a.com/1", 0.9, "Beijing weather was mild on the day."),
            article("https://b.com/2", 0.5, ""),
        ];
        let ranked = ranker(scorer).rank(CLAIM, &articles).await;

        assert_eq!(ranked.origin, EvidenceOrigin::Placeholder);
        assert_eq!(ranked.items.len(), 2);
        assert!(ranked
            .items
            .iter()
            .all(|item| item.entailment == 0.33 && item.neutral == 0.34));
        assert_eq!(ranked.items[0].source.url, "https://a.com/1");
        assert_eq!(ranked.items[1].source.url, "https://b.com/2");
    }

    #[tokio::test]
    async fn test_no_articles_is_empty() {
        let ranked = ranker(Arc::new(KeywordScorer::new())).rank(CLAIM, &[]).await;
        assert_eq!(ranked.origin, EvidenceOrigin::Empty);
        assert!(ranked.items.is_empty());
    }

    #[tokio::test]
    async fn test_scorer_failure_absorbed_per_article() {
        let scorer = Arc::new(KeywordScorer {
            fail_for: Some("broken"),
            batches: Mutex::new(Vec::new()),
        });
        let articles = vec![
            article("https://bad.com/1", 0.9, "The broken page confirmed the visit."),
            article("https://good.com/2", 0.5, "The visit was confirmed by officials."),
        ];
        let ranked = ranker(scorer).rank(CLAIM, &articles).await;

        assert_eq!(ranked.items.len(), 1);
        assert_eq!(ranked.items[0].source.domain, "good.com");
        assert_eq!(ranked.failures.len(), 1);
        assert_eq!(ranked.failures[0].url, "https://bad.com/1");
    }

    #[tokio::test]
    async fn test_categorize_uses_config_thresholds() {
        let config = EvidenceConfig {
            min_entailment: 0.4,
            ..EvidenceConfig::default()
        };
        let ranker = EvidenceRanker::new(Arc::new(KeywordScorer::new()), config);
        let ranked = ranker
            .rank(CLAIM, &[article("https://a.com/1", 0.5, "It was perhaps a visit to Beijing.")])
            .await;
        let categorized = ranker.categorize(&ranked.items);
        assert_eq!(categorized.supporting.len(), 1);
    }

    struct HangingScorer;

    #[async_trait]
    impl NliScorer for HangingScorer {
        async fn score_batch(
            &self,
            _claim: &str,
            _sentences: &[String],
        ) -> Result<Vec<NliScores>, ProviderError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_scorer_times_out_per_batch() {
        let config = EvidenceConfig {
            scorer_timeout: std::time::Duration::from_secs(10),
            ..EvidenceConfig::default()
        };
        let ranker = EvidenceRanker::new(Arc::new(HangingScorer), config);
        let articles = vec![
            article("https://a.com/1", 0.5, "Officials confirmed the visit."),
            article("https://b.com/2", 0.5, "The visit was confirmed by officials."),
        ];

        let ranked = tokio::time::timeout(
            std::time::Duration::from_secs(3600),
            ranker.rank(CLAIM, &articles),
        )
        .await
        .expect("ranking must not hang");

        assert_eq!(ranked.failures.len(), 2);
        assert!(ranked
            .failures
            .iter()
            .all(|f| matches!(f.error, ProviderError::Timeout(_))));
        assert_eq!(ranked.origin, EvidenceOrigin::Placeholder);
        assert_eq!(ranked.items.len(), 2);
    }
}
