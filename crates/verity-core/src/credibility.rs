//! Source credibility scoring by domain.

use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

pub const HIGH_CREDIBILITY: f64 = 0.9;
pub const INSTITUTIONAL_CREDIBILITY: f64 = 0.85;
pub const NEWS_CREDIBILITY: f64 = 0.7;
pub const NEUTRAL_CREDIBILITY: f64 = 0.5;

const INSTITUTIONAL_LABELS: &[&str] = &["gov", "edu", "ac"];
const NEWS_TOKENS: &[&str] = &["news", "reporter", "journal", "times", "post", "tribune"];

/// Curated list of highly credible domains.
pub fn default_credible_domains() -> Vec<String> {
    [
        "reuters.com",
        "ap.org",
        "bbc.com",
        "bbc.co.uk",
        "nytimes.com",
        "theguardian.com",
        "wsj.com",
        "bloomberg.com",
        "politico.com",
        "factcheck.org",
        "snopes.com",
        "mea.gov.in",
        "pib.gov.in",
        "whitehouse.gov",
        "gov.uk",
        "who.int",
        "un.org",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

/// Host of a URL, lowercased. Empty when the URL has no parseable host.
///
/// Tolerates missing schemes: `"bbc.com/news"` yields `"bbc.com"`.
pub fn source_domain(url: &str) -> String {
    let parsed = match Url::parse(url.trim()) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", url.trim())),
        other => other,
    };
    parsed
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Scores domains against a curated list and coarse naming heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredibilityTable {
    credible_domains: Vec<String>,
}

impl CredibilityTable {
    pub fn new(credible_domains: Vec<String>) -> Self {
        Self {
            credible_domains: credible_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    /// Credibility of the domain serving `url`.
    ///
    /// - curated domain or one of its subdomains: 0.9
    /// - a `gov`/`edu`/`ac` label below the registrable name: 0.85
    /// - a news-like token in the domain: 0.7
    /// - anything else: 0.5
    pub fn score_url(&self, url: &str) -> f64 {
        self.score_domain(&source_domain(url))
    }

    pub fn score_domain(&self, domain: &str) -> f64 {
        let domain = domain.trim_start_matches("www.");
        if domain.is_empty() {
            return NEUTRAL_CREDIBILITY;
        }

        if self.is_curated(domain) {
            return HIGH_CREDIBILITY;
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels
            .iter()
            .skip(1)
            .any(|label| INSTITUTIONAL_LABELS.contains(label))
        {
            return INSTITUTIONAL_CREDIBILITY;
        }

        if NEWS_TOKENS.iter().any(|token| domain.contains(token)) {
            return NEWS_CREDIBILITY;
        }

        NEUTRAL_CREDIBILITY
    }

    fn is_curated(&self, domain: &str) -> bool {
        self.credible_domains.iter().any(|credible| {
            domain == credible
                || domain
                    .strip_suffix(credible.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for CredibilityTable {
    fn default() -> Self {
        Self::new(default_credible_domains())
    }
}
