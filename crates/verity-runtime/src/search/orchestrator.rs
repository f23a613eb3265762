//! Multi-provider search with retry, fallback and caching.
//!
//! For each claim the orchestrator:
//! 1. Builds the normalized query (also the cache key)
//! 2. Returns cached URLs for a repeated query
//! 3. Queries providers in priority order, each with retries
//! 4. Deduplicates, then fills up to the result count from the fallback
//!    catalog, skipping domains already present
//! 5. Deduplicates again, truncates and caches the final list
//!
//! Provider failures never escape: a failing provider contributes nothing.

use std::collections::HashSet;
use std::sync::Arc;

use verity_core::{source_domain, FallbackCatalog, SearchQuery};

use super::{
    ProviderOutcome, ProviderReport, SearchError, SearchProvider, SearchRequest, SearchResults,
};
use crate::cache::{log_key, TtlCache};
use crate::config::SearchConfig;
use crate::providers::ProviderError;
use crate::resilience::{retry_provider_call, CircuitBreaker, CircuitBreakerConfig, RetryPolicy};

/// Combines search providers into a single, bounded URL list.
pub struct SearchOrchestrator {
    /// Providers in priority order
    providers: Vec<Arc<dyn SearchProvider>>,

    cache: Arc<TtlCache<Vec<String>>>,

    fallback: FallbackCatalog,

    circuit_breaker: CircuitBreaker,

    retry: RetryPolicy,

    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        cache: Arc<TtlCache<Vec<String>>>,
        config: SearchConfig,
        circuit_breaker: CircuitBreakerConfig,
    ) -> Self {
        Self {
            providers,
            cache,
            fallback: FallbackCatalog::default(),
            circuit_breaker: CircuitBreaker::new(circuit_breaker),
            retry: RetryPolicy::from_config(&config),
            config,
        }
    }

    /// Replace the built-in fallback catalog.
    pub fn with_fallback(mut self, fallback: FallbackCatalog) -> Self {
        self.fallback = fallback;
        self
    }

    /// Search for sources on a claim.
    pub async fn search(&self, claim: &str) -> Result<SearchResults, SearchError> {
        self.search_query(&SearchQuery::build(claim)).await
    }

    /// Search with an already-built query.
    pub async fn search_query(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        let key = query.as_str();

        if self.config.reuse_cached {
            if let Some(urls) = self.cache.get(key) {
                tracing::info!(
                    query = %log_key(key),
                    count = urls.len(),
                    "Using cached search results"
                );
                return Ok(SearchResults {
                    urls,
                    providers: Vec::new(),
                    used_fallback: false,
                    from_cache: true,
                });
            }
        }

        let request = SearchRequest {
            query: key.to_string(),
            excluded_sites: self.config.excluded_sites.clone(),
            result_count: self.config.result_count,
            timeout: self.config.timeout,
        };

        // Priority order across providers, rank order within each
        let mut collected = Vec::new();
        let mut providers = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            let (outcome, urls) = self.query_provider(provider.as_ref(), &request).await;
            collected.extend(urls);
            providers.push(ProviderReport {
                provider: provider.name().to_string(),
                outcome,
            });
        }

        let mut urls = dedupe(collected);
        let target = self.config.result_count;

        let mut used_fallback = false;
        if urls.len() < target {
            let before = urls.len();
            let mut domains: HashSet<String> = urls.iter().map(|u| source_domain(u)).collect();
            for url in self.fallback.select(query) {
                if urls.len() >= target {
                    break;
                }
                if domains.insert(source_domain(url)) {
                    urls.push(url.clone());
                }
            }
            used_fallback = urls.len() > before;
            if used_fallback {
                tracing::info!(added = urls.len() - before, "Added fallback sources");
            }
        }

        let mut urls = dedupe(urls);
        urls.truncate(target);

        if urls.is_empty() {
            tracing::error!(query = %log_key(key), "No sources from any provider or fallback");
            return Err(SearchError::NoSources {
                query: key.to_string(),
            });
        }

        tracing::info!(
            query = %log_key(key),
            count = urls.len(),
            used_fallback,
            "Search complete"
        );
        self.cache.set(key, urls.clone());

        Ok(SearchResults {
            urls,
            providers,
            used_fallback,
            from_cache: false,
        })
    }

    /// Call one provider with retries. Never fails; failures become outcomes.
    async fn query_provider(
        &self,
        provider: &dyn SearchProvider,
        request: &SearchRequest,
    ) -> (ProviderOutcome, Vec<String>) {
        let name = provider.name();

        if !provider.is_configured() {
            tracing::warn!(provider = name, "Provider credentials not configured, skipping");
            return (ProviderOutcome::Skipped("not configured".to_string()), Vec::new());
        }

        if !self.circuit_breaker.allows(name) {
            tracing::warn!(provider = name, "Provider circuit open, skipping");
            return (ProviderOutcome::Skipped("circuit open".to_string()), Vec::new());
        }

        let timeout = request.timeout;
        let result = retry_provider_call(name, &self.retry, move || async move {
            tokio::time::timeout(timeout, provider.search(request))
                .await
                .unwrap_or_else(|_| Err(ProviderError::Timeout(timeout)))
        })
        .await;

        match result {
            Ok(urls) if urls.is_empty() => {
                self.circuit_breaker.on_success(name);
                tracing::info!(provider = name, "Provider returned no results");
                (ProviderOutcome::NoResults, urls)
            }
            Ok(urls) => {
                self.circuit_breaker.on_success(name);
                tracing::info!(provider = name, count = urls.len(), "Provider returned results");
                (ProviderOutcome::Hits(urls.len()), urls)
            }
            Err(ProviderError::NotConfigured(reason)) => {
                tracing::warn!(provider = name, %reason, "Provider not configured, skipping");
                (ProviderOutcome::Skipped(reason), Vec::new())
            }
            Err(err) => {
                self.circuit_breaker.on_failure(name);
                (ProviderOutcome::Failed(err), Vec::new())
            }
        }
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }
}

/// Remove exact duplicates, keeping first occurrences in order.
fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use verity_core::FallbackTopic;
    use crate::resilience::CircuitState;

    struct MockProvider {
        name: &'static str,
        result: Result<Vec<String>, ProviderError>,
        configured: bool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn ok(name: &'static str, urls: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(urls.iter().map(|u| u.to_string()).collect()),
                configured: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, err: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Err(err),
                configured: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn unconfigured(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: Ok(vec!["https://never.example/".to_string()]),
                configured: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn search(&self, _request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct HangingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn search(&self, _request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    fn catalog() -> FallbackCatalog {
        FallbackCatalog {
            topics: vec![FallbackTopic {
                name: "science".to_string(),
                keywords: vec!["moon".to_string()],
                urls: vec![
                    "https://nasa.gov/moon".to_string(),
                    "https://space.com/moon".to_string(),
                ],
            }],
            generic: vec![
                "https://a.com/".to_string(),
                "https://b.com/".to_string(),
                "https://c.com/".to_string(),
                "https://d.com/".to_string(),
            ],
        }
    }

    fn orchestrator(providers: Vec<Arc<dyn SearchProvider>>, config: SearchConfig) -> SearchOrchestrator {
        let cache = Arc::new(TtlCache::new("search", Duration::from_secs(3600), 100));
        SearchOrchestrator::new(providers, cache, config, CircuitBreakerConfig::default())
            .with_fallback(catalog())
    }

    fn config(result_count: usize) -> SearchConfig {
        SearchConfig {
            result_count,
            ..Default::default()
        }
    }

    fn query(claim: &str) -> SearchQuery {
        SearchQuery::build_for_year(claim, 2025)
    }

    #[tokio::test]
    async fn test_provider_order_and_dedup() {
        let primary = MockProvider::ok("primary", &["https://x.com/1", "https://y.com/2"]);
        let secondary = MockProvider::ok("secondary", &["https://y.com/2", "https://z.com/3"]);
        let search = orchestrator(vec![primary, secondary], config(3));

        let results = search.search_query(&query("claim")).await.unwrap();
        assert_eq!(
            results.urls,
            vec!["https://x.com/1", "https://y.com/2", "https://z.com/3"]
        );
        assert!(!results.used_fallback);
        assert!(matches!(results.providers[0].outcome, ProviderOutcome::Hits(2)));
    }

    #[tokio::test]
    async fn test_fallback_skips_existing_domains() {
        let primary = MockProvider::ok("primary", &["https://a.com/story"]);
        let search = orchestrator(vec![primary], config(3));

        let results = search.search_query(&query("claim")).await.unwrap();
        // a.com already present, so the generic list contributes b.com and c.com
        assert_eq!(
            results.urls,
            vec!["https://a.com/story", "https://b.com/", "https://c.com/"]
        );
        assert!(results.used_fallback);
    }

    #[tokio::test]
    async fn test_fallback_topic_by_keyword() {
        let search = orchestrator(vec![], config(5));
        let results = search.search_query(&query("The moon is hollow")).await.unwrap();
        assert_eq!(
            results.urls,
            vec!["https://nasa.gov/moon", "https://space.com/moon"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_providers_degrade_to_fallback() {
        let primary = MockProvider::failing("primary", ProviderError::Timeout(Duration::from_secs(35)));
        let secondary = MockProvider::failing("secondary", ProviderError::AuthError);
        let search = orchestrator(vec![primary.clone(), secondary.clone()], config(7));

        let results = search.search_query(&query("claim")).await.unwrap();
        assert_eq!(results.urls.len(), 4);
        assert!(results.used_fallback);
        assert_eq!(results.failures().count(), 2);

        // timeouts retried, auth errors not
        assert_eq!(primary.calls(), 3);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_is_deterministic() {
        let cfg = SearchConfig {
            reuse_cached: false,
            ..config(7)
        };
        let search = orchestrator(
            vec![MockProvider::failing("primary", ProviderError::AuthError)],
            cfg,
        );

        let first = search.search_query(&query("claim")).await.unwrap();
        let second = search.search_query(&query("claim")).await.unwrap();
        assert_eq!(first.urls, second.urls);
        assert!(!second.from_cache);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_providers() {
        let primary = MockProvider::ok("primary", &["https://x.com/1"]);
        let search = orchestrator(vec![primary.clone()], config(1));

        let first = search.search_query(&query("claim")).await.unwrap();
        let second = search.search_query(&query("claim")).await.unwrap();

        assert_eq!(first.urls, second.urls);
        assert!(second.from_cache);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_skipped() {
        let unconfigured = MockProvider::unconfigured("primary");
        let secondary = MockProvider::ok("secondary", &["https://x.com/1"]);
        let search = orchestrator(vec![unconfigured.clone(), secondary], config(1));

        let results = search.search_query(&query("claim")).await.unwrap();
        assert_eq!(results.urls, vec!["https://x.com/1"]);
        assert_eq!(unconfigured.calls(), 0);
        assert!(matches!(results.providers[0].outcome, ProviderOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn test_no_sources_when_everything_is_empty() {
        let search = orchestrator(
            vec![MockProvider::failing("primary", ProviderError::AuthError)],
            config(7),
        )
        .with_fallback(FallbackCatalog::empty());

        let result = search.search_query(&query("claim")).await;
        assert!(matches!(result, Err(SearchError::NoSources { .. })));
    }

    #[tokio::test]
    async fn test_circuit_opens_for_repeatedly_failing_provider() {
        let cfg = SearchConfig {
            reuse_cached: false,
            ..config(7)
        };
        let primary = MockProvider::failing("primary", ProviderError::AuthError);
        let search = orchestrator(vec![primary.clone()], cfg);

        for _ in 0..4 {
            search.search_query(&query("claim")).await.unwrap();
        }

        // 3 failures open the circuit; the 4th search skips the provider
        assert_eq!(primary.calls(), 3);
        assert_eq!(search.circuit_breaker().state("primary"), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_results_bounded_and_unique() {
        let primary = MockProvider::ok(
            "primary",
            &["https://x.com/1", "https://x.com/1", "https://x.com/2", "https://x.com/3"],
        );
        let search = orchestrator(vec![primary], config(2));

        let results = search.search_query(&query("claim")).await.unwrap();
        assert_eq!(results.urls, vec!["https://x.com/1", "https://x.com/2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_provider_times_out_and_falls_back() {
        let hanging = Arc::new(HangingProvider {
            calls: AtomicUsize::new(0),
        });
        let cfg = SearchConfig {
            timeout: Duration::from_secs(35),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            ..config(3)
        };
        let search = orchestrator(vec![hanging.clone()], cfg);

        let started = tokio::time::Instant::now();
        let results = tokio::time::timeout(
            Duration::from_secs(3600),
            search.search_query(&query("claim")),
        )
        .await
        .expect("search must not hang")
        .unwrap();

        // three attempts of 35s plus 1s and 2s of backoff
        assert_eq!(hanging.calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() < Duration::from_secs(120));
        assert!(matches!(
            results.providers[0].outcome,
            ProviderOutcome::Failed(ProviderError::Timeout(_))
        ));
        assert!(results.used_fallback);
        assert_eq!(results.urls.len(), 3);
    }
}
