//! Web search: providers and the orchestrator that combines them.
//!
//! Providers are consulted in a fixed priority order. A provider that
//! fails, times out or lacks credentials contributes nothing; the
//! orchestrator fills gaps from a static fallback catalog.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::providers::ProviderError;

mod google;
mod newsapi;
mod orchestrator;

pub use google::{GoogleSearchProvider, GOOGLE_API_KEY_ENV, GOOGLE_CSE_ID_ENV};
pub use newsapi::{NewsApiProvider, NEWSAPI_KEY_ENV};
pub use orchestrator::SearchOrchestrator;

/// Errors from the search stage.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Every provider and the fallback catalog came up empty
    #[error("No sources found for query: {query}")]
    NoSources { query: String },

    /// One provider failed after retries; the search carried on without it
    #[error("Search provider '{provider}' failed: {source}")]
    ProviderFailed {
        provider: String,
        #[source]
        source: ProviderError,
    },
}

/// One provider query.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,

    /// Domains to exclude from results
    pub excluded_sites: Vec<String>,

    pub result_count: usize,

    pub timeout: Duration,
}

impl SearchRequest {
    /// The query with `-site:` filters appended.
    pub fn query_with_exclusions(&self) -> String {
        let mut query = self.query.clone();
        for site in &self.excluded_sites {
            query.push_str(" -site:");
            query.push_str(site);
        }
        query
    }
}

/// A web search backend returning result URLs in rank order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs and circuit breaking.
    fn name(&self) -> &str;

    /// Whether the provider has the credentials it needs.
    fn is_configured(&self) -> bool {
        true
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError>;
}

/// What a single provider contributed to a search.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    /// Returned this many URLs
    Hits(usize),

    /// Answered, but with no URLs
    NoResults,

    /// Not called
    Skipped(String),

    /// Failed after retries
    Failed(ProviderError),
}

impl ProviderOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ProviderOutcome::Failed(_))
    }
}

/// Per-provider record of a search.
#[derive(Debug, Clone)]
pub struct ProviderReport {
    pub provider: String,
    pub outcome: ProviderOutcome,
}

/// Final URL list with how it was assembled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Unique URLs, at most the configured result count
    pub urls: Vec<String>,

    #[serde(skip)]
    pub providers: Vec<ProviderReport>,

    /// Whether fallback URLs were appended
    pub used_fallback: bool,

    /// Whether the list came from the search cache
    pub from_cache: bool,
}

impl SearchResults {
    /// Failed providers as `(name, error)` pairs.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProviderError)> {
        self.providers.iter().filter_map(|report| match &report.outcome {
            ProviderOutcome::Failed(err) => Some((report.provider.as_str(), err)),
            _ => None,
        })
    }
}
