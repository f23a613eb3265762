//! Google Custom Search provider.

use async_trait::async_trait;
use serde::Deserialize;

use super::{SearchProvider, SearchRequest};
use crate::config::SearchConfig;
use crate::providers::{http, ApiCredential, ProviderError};

pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const GOOGLE_CSE_ID_ENV: &str = "GOOGLE_CSE_ID";

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API returns at most this many results per page.
const MAX_PAGE_SIZE: usize = 10;

/// Primary search provider backed by a Google programmable search engine.
///
/// Results are restricted to English pages from the past three months.
#[derive(Debug)]
pub struct GoogleSearchProvider {
    api_key: Option<ApiCredential>,
    engine_id: Option<ApiCredential>,
    excluded_extensions: Vec<String>,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

impl GoogleSearchProvider {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        config: &SearchConfig,
    ) -> Self {
        Self::with_credentials(
            Some(ApiCredential::explicit(api_key)),
            Some(ApiCredential::explicit(engine_id)),
            config,
        )
    }

    /// Read `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`. Missing values leave the
    /// provider unconfigured rather than failing.
    pub fn from_env(config: &SearchConfig) -> Self {
        Self::with_credentials(
            ApiCredential::from_env_optional(GOOGLE_API_KEY_ENV),
            ApiCredential::from_env_optional(GOOGLE_CSE_ID_ENV),
            config,
        )
    }

    fn with_credentials(
        api_key: Option<ApiCredential>,
        engine_id: Option<ApiCredential>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            api_key,
            engine_id,
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            endpoint: ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Links from a response, minus document downloads, capped at `limit`.
    fn extract_links(&self, response: SearchResponse, limit: usize) -> Vec<String> {
        response
            .items
            .into_iter()
            .map(|item| item.link)
            .filter(|link| {
                let lower = link.to_lowercase();
                !self
                    .excluded_extensions
                    .iter()
                    .any(|ext| lower.ends_with(ext.as_str()))
            })
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
        let (Some(api_key), Some(engine_id)) = (&self.api_key, &self.engine_id) else {
            return Err(ProviderError::NotConfigured(format!(
                "set {} and {}",
                GOOGLE_API_KEY_ENV, GOOGLE_CSE_ID_ENV
            )));
        };

        let num = request.result_count.clamp(1, MAX_PAGE_SIZE).to_string();
        let query = request.query_with_exclusions();

        tracing::info!(
            provider = "google",
            query = %crate::cache::log_key(&request.query),
            "Searching"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", api_key.expose()),
                ("cx", engine_id.expose()),
                ("q", query.as_str()),
                ("num", num.as_str()),
                ("dateRestrict", "m3"),
                ("gl", "us"),
                ("lr", "lang_en"),
            ])
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| http::send_error(e, request.timeout))?;

        let body: SearchResponse = http::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| http::body_error(e, request.timeout))?;

        let links = self.extract_links(body, request.result_count);
        tracing::info!(provider = "google", count = links.len(), "Search succeeded");
        Ok(links)
    }
}
