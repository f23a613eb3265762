//! Concurrent article fetching.
//!
//! URLs already in the article cache are served without a network call.
//! The rest are fetched with bounded parallelism; every fetch shares one
//! deadline measured from the start of the batch, so a batch never runs
//! longer than the configured timeout no matter how many fetches queue for
//! a slot. A failing URL is recorded in the report and never aborts its
//! siblings.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use verity_core::{source_domain, ArticleRecord, CredibilityTable};

use crate::cache::TtlCache;
use crate::config::FetchConfig;
use crate::providers::http::{build_client, check_status, send_error};
use crate::providers::ProviderError;

mod parser;

pub use parser::{ArticleParser, HtmlArticleParser, ParsedArticle};

/// Why a single URL produced no article.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ProviderError,
    },

    #[error("Timed out fetching {url} after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Response from {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },

    #[error("Failed to parse {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::TooLarge { url, .. }
            | FetchError::Parse { url, .. } => url,
        }
    }
}

/// Retrieves raw page content for a URL.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET with a browser-like user agent.
pub struct HttpContentSource {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpContentSource {
    pub fn new(config: &FetchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.timeout, &config.user_agent)?,
            timeout: config.timeout,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |source: ProviderError| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        };

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| request_error(send_error(e, self.timeout)))?;

        let response = check_status(response).await.map_err(request_error)?;

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_error(send_error(e, self.timeout)))?;
        if bytes.len() > self.max_body_bytes {
            return Err(too_large());
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Outcome of fetching a batch of URLs.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Successful records, in completion order
    pub articles: Vec<ArticleRecord>,

    pub failures: Vec<FetchError>,

    /// Unique URLs asked for
    pub requested: usize,

    /// Records served from the article cache
    pub cache_hits: usize,
}

/// Fetches, parses and scores articles.
pub struct ArticleFetcher {
    source: Arc<dyn ContentSource>,
    parser: Arc<dyn ArticleParser>,
    cache: Arc<TtlCache<ArticleRecord>>,
    credibility: CredibilityTable,
    concurrency: usize,
    timeout: Duration,
}

impl ArticleFetcher {
    pub fn new(
        source: Arc<dyn ContentSource>,
        parser: Arc<dyn ArticleParser>,
        cache: Arc<TtlCache<ArticleRecord>>,
        credibility: CredibilityTable,
        config: &FetchConfig,
    ) -> Self {
        Self {
            source,
            parser,
            cache,
            credibility,
            concurrency: config.concurrency.max(1),
            timeout: config.timeout,
        }
    }

    /// Fetch every URL, keeping the ones that succeed.
    pub async fn fetch_all(&self, urls: &[String]) -> FetchReport {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = urls
            .iter()
            .map(String::as_str)
            .filter(|url| seen.insert(*url))
            .collect();

        let mut report = FetchReport {
            requested: unique.len(),
            ..FetchReport::default()
        };

        let mut misses = Vec::new();
        for url in unique {
            match self.cache.get(url) {
                Some(article) => {
                    report.cache_hits += 1;
                    report.articles.push(article);
                }
                None => misses.push(url),
            }
        }

        let deadline = Instant::now() + self.timeout;
        let results: Vec<Result<ArticleRecord, FetchError>> = stream::iter(misses)
            .map(|url| self.fetch_one(url, deadline))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(article) => {
                    self.cache.set(&article.url, article.clone());
                    report.articles.push(article);
                }
                Err(err) => {
                    tracing::warn!(url = %err.url(), error = %err, "Article fetch failed");
                    report.failures.push(err);
                }
            }
        }

        tracing::info!(
            fetched = report.articles.len(),
            requested = report.requested,
            cache_hits = report.cache_hits,
            "Fetched articles"
        );
        report
    }

    async fn fetch_one(&self, url: &str, deadline: Instant) -> Result<ArticleRecord, FetchError> {
        let raw = tokio::time::timeout_at(deadline, self.source.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            })??;

        let parsed = self.parser.parse(&raw, url)?;
        let domain = source_domain(url);
        let credibility = self.credibility.score_domain(&domain);

        tracing::debug!(url = %url, credibility, "Parsed article");

        Ok(ArticleRecord {
            url: url.to_string(),
            title: parsed.title,
            body_text: parsed.body_text,
            publish_date: parsed.publish_date,
            authors: parsed.authors,
            top_image: parsed.top_image,
            credibility,
            source_domain: domain,
        })
    }
}
