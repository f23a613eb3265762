//! The claim-checking pipeline.
//!
//! claim → search → fetch → rank → categorize → decide, with the advisory
//! verdict and generated reasoning requested side by side at the end.

use std::sync::Arc;
use std::time::Instant;

use verity_core::verdict::advisory::no_articles;
use verity_core::{
    build_rationale, ArticleRecord, CheckReport, CredibilityTable, FallbackCatalog, VerdictEngine,
    VerdictLabel,
};

use crate::cache::{log_key, CacheStats, TtlCache};
use crate::config::RuntimeConfig;
use crate::fetch::{
    ArticleFetcher, ArticleParser, ContentSource, HtmlArticleParser, HttpContentSource,
};
use crate::nli::{HuggingFaceNliScorer, NliScorer};
use crate::ranker::EvidenceRanker;
use crate::reasoning::{ReasoningGenerator, ReasoningService};
use crate::search::{
    GoogleSearchProvider, NewsApiProvider, SearchError, SearchOrchestrator, SearchProvider,
};
use crate::RuntimeError;

/// Evidence items returned in a report.
pub const MAX_REPORT_EVIDENCE: usize = 10;

/// Assembles a [`FactChecker`] from configuration and collaborators.
pub struct FactCheckerBuilder {
    config: RuntimeConfig,
    search_providers: Vec<Arc<dyn SearchProvider>>,
    content_source: Option<Arc<dyn ContentSource>>,
    parser: Arc<dyn ArticleParser>,
    scorer: Option<Arc<dyn NliScorer>>,
    generator: Option<Arc<dyn ReasoningGenerator>>,
    fallback: Option<FallbackCatalog>,
}

impl FactCheckerBuilder {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            search_providers: Vec::new(),
            content_source: None,
            parser: Arc::new(HtmlArticleParser::new()),
            scorer: None,
            generator: None,
            fallback: None,
        }
    }

    /// Add a search provider. Providers are consulted in the order added.
    pub fn search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_providers.push(provider);
        self
    }

    /// Defaults to plain HTTP.
    pub fn content_source(mut self, source: Arc<dyn ContentSource>) -> Self {
        self.content_source = Some(source);
        self
    }

    pub fn parser(mut self, parser: Arc<dyn ArticleParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn NliScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Without a generator, reasoning is always templated.
    pub fn reasoning_generator(mut self, generator: Arc<dyn ReasoningGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn fallback_catalog(mut self, fallback: FallbackCatalog) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn build(self) -> Result<FactChecker, RuntimeError> {
        let config = self.config;
        config.validate()?;

        let scorer = self
            .scorer
            .ok_or_else(|| RuntimeError::NotConfigured("NLI scorer".to_string()))?;

        let content_source: Arc<dyn ContentSource> = match self.content_source {
            Some(source) => source,
            None => Arc::new(
                HttpContentSource::new(&config.fetch)
                    .map_err(|e| RuntimeError::NotConfigured(format!("HTTP client: {}", e)))?,
            ),
        };

        let search_cache = Arc::new(TtlCache::from_config("search", &config.search_cache));
        let article_cache = Arc::new(TtlCache::from_config("articles", &config.article_cache));

        let mut search = SearchOrchestrator::new(
            self.search_providers,
            search_cache.clone(),
            config.search.clone(),
            config.circuit_breaker.clone(),
        );
        if let Some(fallback) = self.fallback {
            search = search.with_fallback(fallback);
        }

        let fetcher = ArticleFetcher::new(
            content_source,
            self.parser,
            article_cache.clone(),
            CredibilityTable::new(config.credible_domains()),
            &config.fetch,
        );

        Ok(FactChecker {
            search,
            fetcher,
            ranker: EvidenceRanker::new(scorer, config.evidence.clone()),
            engine: VerdictEngine::new(config.verdict),
            reasoning: ReasoningService::new(self.generator, config.reasoning.clone()),
            search_cache,
            article_cache,
        })
    }
}

/// Checks claims end to end.
pub struct FactChecker {
    search: SearchOrchestrator,
    fetcher: ArticleFetcher,
    ranker: EvidenceRanker,
    engine: VerdictEngine,
    reasoning: ReasoningService,
    search_cache: Arc<TtlCache<Vec<String>>>,
    article_cache: Arc<TtlCache<ArticleRecord>>,
}

impl FactChecker {
    pub fn builder(config: RuntimeConfig) -> FactCheckerBuilder {
        FactCheckerBuilder::new(config)
    }

    /// Wire the default HTTP collaborators, reading credentials from the
    /// environment. Missing credentials leave that collaborator unconfigured.
    pub fn from_env(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let google = GoogleSearchProvider::from_env(&config.search);
        let newsapi = NewsApiProvider::from_env();
        let scorer =
            HuggingFaceNliScorer::from_env().with_timeout(config.evidence.scorer_timeout);

        let mut builder = FactCheckerBuilder::new(config)
            .search_provider(Arc::new(google))
            .search_provider(Arc::new(newsapi))
            .scorer(Arc::new(scorer));

        if let Some(generator) = default_generator(&builder.config) {
            builder = builder.reasoning_generator(generator);
        }

        builder.build()
    }

    /// Check a claim. Never fails; degraded stages are listed in
    /// `absorbed_failures`.
    pub async fn check(&self, claim: &str) -> CheckReport {
        let started = Instant::now();
        let claim = claim.trim();
        tracing::info!(claim = %log_key(claim), "Checking claim");

        let search = match self.search.search(claim).await {
            Ok(results) => results,
            Err(err) => return self.no_sources(claim, err, started).await,
        };

        let mut absorbed: Vec<RuntimeError> = search
            .failures()
            .map(|(provider, err)| {
                RuntimeError::Search(SearchError::ProviderFailed {
                    provider: provider.to_string(),
                    source: err.clone(),
                })
            })
            .collect();

        let fetched = self.fetcher.fetch_all(&search.urls).await;
        absorbed.extend(fetched.failures.into_iter().map(RuntimeError::Fetch));
        let articles = fetched.articles;

        let ranked = self.ranker.rank(claim, &articles).await;
        absorbed.extend(ranked.failures.into_iter().map(|failure| RuntimeError::Analysis {
            url: failure.url,
            source: failure.error,
        }));

        let categorized = self.ranker.categorize(&ranked.items);
        tracing::info!(
            supporting = categorized.supporting.len(),
            contradicting = categorized.contradicting.len(),
            neutral = categorized.neutral.len(),
            "Evidence categorized"
        );

        let decision = self.engine.decide_categorized(Some(claim), &categorized);
        let supporting = categorized.supporting.len();
        let contradicting = categorized.contradicting.len();

        let wants_reasoning = self.reasoning.should_use_reasoning(
            decision.label,
            supporting,
            contradicting,
            articles.len(),
        );
        let (advisory, reasoning) = tokio::join!(
            self.reasoning.advisory(claim, &articles),
            async {
                if wants_reasoning {
                    Some(
                        self.reasoning
                            .reason(claim, &articles, decision.label, &decision.reason)
                            .await,
                    )
                } else {
                    None
                }
            }
        );

        absorbed.extend(advisory.failure.map(RuntimeError::Reasoning));
        let reasoning = reasoning.map(|outcome| {
            absorbed.extend(outcome.failure.map(RuntimeError::Reasoning));
            outcome.text
        });

        let rationale = build_rationale(&decision, supporting, contradicting, reasoning.as_deref());

        let mut evidence = ranked.items;
        evidence.truncate(MAX_REPORT_EVIDENCE);

        let report = CheckReport {
            claim: claim.to_string(),
            verdict: decision.label,
            reason: decision.reason,
            rationale,
            evidence,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            articles_processed: articles.len(),
            advisory: Some(advisory.verdict),
            reasoning,
            absorbed_failures: absorbed.iter().map(ToString::to_string).collect(),
        };

        tracing::info!(
            verdict = %report.verdict,
            articles = report.articles_processed,
            absorbed = report.absorbed_failures.len(),
            seconds = report.processing_time_seconds,
            "Claim checked"
        );
        report
    }

    /// The terminal "no evidence" report.
    async fn no_sources(&self, claim: &str, err: SearchError, started: Instant) -> CheckReport {
        tracing::warn!(error = %err, "No sources for claim");
        let decision = VerdictEngine::no_sources();

        let mut absorbed = vec![RuntimeError::Search(err)];
        let outcome = self
            .reasoning
            .reason(claim, &[], VerdictLabel::Unclear, &decision.reason)
            .await;
        absorbed.extend(outcome.failure.map(RuntimeError::Reasoning));

        CheckReport {
            claim: claim.to_string(),
            verdict: decision.label,
            rationale: format!("{}\n\nAI Analysis: {}", decision.reason, outcome.text),
            reason: decision.reason,
            evidence: Vec::new(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
            articles_processed: 0,
            advisory: Some(no_articles()),
            reasoning: Some(outcome.text),
            absorbed_failures: absorbed.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn search_cache_stats(&self) -> CacheStats {
        self.search_cache.stats()
    }

    pub fn article_cache_stats(&self) -> CacheStats {
        self.article_cache.stats()
    }

    pub fn clear_caches(&self) {
        self.search_cache.clear();
        self.article_cache.clear();
    }
}

#[cfg(feature = "gemini")]
fn default_generator(config: &RuntimeConfig) -> Option<Arc<dyn ReasoningGenerator>> {
    use crate::providers::GeminiProvider;
    use crate::reasoning::LlmReasoningGenerator;

    if !config.reasoning.enabled {
        return None;
    }
    match GeminiProvider::from_env() {
        Ok(provider) => Some(Arc::new(LlmReasoningGenerator::new(
            Arc::new(provider),
            &config.reasoning,
        ))),
        Err(err) => {
            tracing::warn!(error = %err, "Reasoning generator unavailable, using templates");
            None
        }
    }
}

#[cfg(not(feature = "gemini"))]
fn default_generator(_config: &RuntimeConfig) -> Option<Arc<dyn ReasoningGenerator>> {
    None
}
