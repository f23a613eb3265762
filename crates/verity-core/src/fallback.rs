//! Static, topic-keyed fallback URLs used when live search comes up short.

use serde::{Deserialize, Serialize};

use crate::query::SearchQuery;

/// A list of trusted URLs for queries mentioning any of `keywords`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackTopic {
    pub name: String,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
}

/// Topic lists checked in order, with a generic list as the last resort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackCatalog {
    pub topics: Vec<FallbackTopic>,
    pub generic: Vec<String>,
}

impl FallbackCatalog {
    /// A catalog that never yields any URL.
    pub fn empty() -> Self {
        Self {
            topics: Vec::new(),
            generic: Vec::new(),
        }
    }

    /// URLs for the first topic with a keyword among the query's tokens,
    /// or the generic list when none matches.
    pub fn select(&self, query: &SearchQuery) -> &[String] {
        let tokens: Vec<&str> = query.tokens().collect();
        self.topics
            .iter()
            .find(|topic| {
                topic
                    .keywords
                    .iter()
                    .any(|keyword| tokens.contains(&keyword.as_str()))
            })
            .map(|topic| topic.urls.as_slice())
            .unwrap_or(self.generic.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.generic.is_empty() && self.topics.iter().all(|t| t.urls.is_empty())
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self {
            topics: vec![
                FallbackTopic {
                    name: "india-china".to_string(),
                    keywords: strings(&["india", "china", "modi", "xi"]),
                    urls: strings(&[
                        "https://www.bbc.com/news/world/asia/india",
                        "https://www.aljazeera.com/where/india/",
                        "https://www.scmp.com/topics/india-china-relations",
                        "https://www.thehindu.com/news/national/",
                        "https://indianexpress.com/section/india/",
                        "https://www.ndtv.com/india",
                        "https://timesofindia.indiatimes.com/india",
                        "https://www.dailymail.co.uk/indiahome/index.html",
                    ]),
                },
                FallbackTopic {
                    name: "ai-technology".to_string(),
                    keywords: strings(&["ai", "artificial", "robot", "automation"]),
                    urls: strings(&[
                        "https://www.technologyreview.com/category/ai/",
                        "https://www.wired.com/category/ai/",
                        "https://www.theverge.com/ai-artificial-intelligence",
                        "https://www.nytimes.com/section/technology/ai",
                        "https://www.bbc.com/news/technology",
                        "https://www.cnet.com/tags/artificial-intelligence/",
                        "https://www.zdnet.com/topic/artificial-intelligence/",
                        "https://venturebeat.com/ai/",
                    ]),
                },
            ],
            generic: strings(&[
                "https://www.bbc.com/news",
                "https://www.aljazeera.com/",
                "https://www.theguardian.com/world",
                "https://www.nytimes.com/",
                "https://www.washingtonpost.com/",
                "https://www.cnn.com/",
                "https://www.npr.org/",
                "https://www.reuters.com/",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
