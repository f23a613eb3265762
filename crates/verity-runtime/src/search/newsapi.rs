//! NewsAPI `everything` endpoint provider.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::{SearchProvider, SearchRequest};
use crate::providers::{http, ApiCredential, ProviderError};

pub const NEWSAPI_KEY_ENV: &str = "NEWSAPI_KEY";

const ENDPOINT: &str = "https://newsapi.org/v2/everything";

/// Secondary search provider over a news article index.
///
/// Returns English articles published since January 1st of the current
/// year, newest first.
#[derive(Debug)]
pub struct NewsApiProvider {
    api_key: Option<ApiCredential>,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<NewsArticle>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    url: Option<String>,
}

impl NewsApiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(Some(ApiCredential::explicit(api_key)))
    }

    /// Read `NEWSAPI_KEY`. A missing key leaves the provider unconfigured.
    pub fn from_env() -> Self {
        Self::with_credential(ApiCredential::from_env_optional(NEWSAPI_KEY_ENV))
    }

    fn with_credential(api_key: Option<ApiCredential>) -> Self {
        Self {
            api_key,
            endpoint: ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

fn extract_urls(response: NewsResponse, limit: usize) -> Result<Vec<String>, ProviderError> {
    if response.status != "ok" {
        return Err(ProviderError::ApiError {
            status: 200,
            message: response
                .message
                .unwrap_or_else(|| format!("status '{}'", response.status)),
        });
    }

    if response.total_results == 0 {
        return Ok(Vec::new());
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|article| article.url)
        .filter(|url| !url.is_empty())
        .take(limit)
        .collect())
}

#[async_trait]
impl SearchProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::NotConfigured(format!(
                "set {}",
                NEWSAPI_KEY_ENV
            )));
        };

        let page_size = request.result_count.to_string();
        let from = format!("{}-01-01", Utc::now().year());

        tracing::info!(
            provider = "newsapi",
            query = %crate::cache::log_key(&request.query),
            "Searching"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", request.query.as_str()),
                ("apiKey", api_key.expose()),
                ("pageSize", page_size.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("from", from.as_str()),
            ])
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| http::send_error(e, request.timeout))?;

        let body: NewsResponse = http::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| http::body_error(e, request.timeout))?;

        let urls = extract_urls(body, request.result_count)?;
        tracing::info!(provider = "newsapi", count = urls.len(), "Search succeeded");
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> NewsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_urls() {
        let response = parse(
            r#"{"status": "ok", "totalResults": 3, "articles": [
                {"url": "https://a.com/1"},
                {"url": null},
                {"url": "https://b.com/2"}
            ]}"#,
        );
        assert_eq!(
            extract_urls(response, 7).unwrap(),
            vec!["https://a.com/1", "https://b.com/2"]
        );
    }

    #[test]
    fn test_zero_results() {
        let response = parse(r#"{"status": "ok", "totalResults": 0, "articles": []}"#);
        assert!(extract_urls(response, 7).unwrap().is_empty());
    }

    #[test]
    fn test_error_status() {
        let response = parse(
            r#"{"status": "error", "code": "parameterInvalid", "message": "bad query"}"#,
        );
        let err = extract_urls(response, 7).unwrap_err();
        assert!(err.to_string().contains("bad query"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unconfigured_without_key() {
        assert!(!NewsApiProvider::with_credential(None).is_configured());
        assert!(NewsApiProvider::new("key").is_configured());
    }
}
