//! Search query normalization.
//!
//! A claim is lowercased, corrected against a fixed misspelling table,
//! scanned for candidate name phrases, and extended with fact-check
//! keywords and the current year. The result is both the query sent to
//! search providers and the search cache key.

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::fmt;

/// Applied in order with plain substring replacement.
pub const CORRECTIONS: &[(&str, &str)] = &[
    ("visite", "visit"),
    ("mister", "minister"),
    ("prme", "prime"),
    ("chek", "check"),
    ("factchek", "factcheck"),
    ("goverment", "government"),
    ("hollywod", "hollywood"),
    ("actress", "actor actress celebrity"),
];

pub const FACT_CHECK_TERMS: &str = "official confirmed real fake hoax verified";

/// Words at or below this length never start or end a name candidate.
const MIN_NAME_WORD_LEN: usize = 3;

/// An immutable, normalized search query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SearchQuery {
    corrected: String,
    name_candidates: Vec<String>,
    text: String,
}

impl SearchQuery {
    /// Build a query using the current calendar year.
    pub fn build(claim: &str) -> Self {
        Self::build_for_year(claim, Utc::now().year())
    }

    /// Build a query for an explicit year.
    pub fn build_for_year(claim: &str, year: i32) -> Self {
        let corrected = correct(claim);
        let name_candidates = name_candidates(&corrected);

        let base = format!("\"{}\"", corrected);
        let text = if name_candidates.is_empty() {
            format!("{} {} {}", base, FACT_CHECK_TERMS, year)
        } else {
            format!(
                "({}) OR ({}) {} {}",
                base,
                name_candidates.join(" OR "),
                FACT_CHECK_TERMS,
                year
            )
        };

        Self {
            corrected,
            name_candidates,
            text,
        }
    }

    /// The full query string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lowercased, corrected claim.
    pub fn corrected_claim(&self) -> &str {
        &self.corrected
    }

    /// Quoted adjacent-word pairs, e.g. `"\"prime minister\""`.
    pub fn name_candidates(&self) -> &[String] {
        &self.name_candidates
    }

    /// Lowercase word tokens of the query, stripped of punctuation.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn correct(claim: &str) -> String {
    let mut query = claim.trim().to_lowercase();
    for (wrong, right) in CORRECTIONS {
        query = query.replace(wrong, right);
    }
    query
}

fn name_candidates(query: &str) -> Vec<String> {
    let words: Vec<&str> = query.split_whitespace().collect();
    words
        .windows(2)
        .filter(|pair| {
            pair[0].chars().count() >= MIN_NAME_WORD_LEN
                && pair[1].chars().count() >= MIN_NAME_WORD_LEN
        })
        .map(|pair| format!("\"{} {}\"", pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_words_have_no_candidates() {
        let query = SearchQuery::build_for_year("Is it so", 2025);
        assert!(query.name_candidates().is_empty());
        assert_eq!(
            query.as_str(),
            "\"is it so\" official confirmed real fake hoax verified 2025"
        );
    }

    #[test]
    fn test_name_candidates_are_or_joined() {
        let query = SearchQuery::build_for_year("Tom Hanks retires", 2024);
        assert_eq!(
            query.name_candidates(),
            &["\"tom hanks\"".to_string(), "\"hanks retires\"".to_string()]
        );
        assert_eq!(
            query.as_str(),
            "(\"tom hanks retires\") OR (\"tom hanks\" OR \"hanks retires\") \
             official confirmed real fake hoax verified 2024"
        );
    }

    #[test]
    fn test_misspellings_corrected() {
        let query = SearchQuery::build_for_year("  Prme Mister goverment VISITE ", 2025);
        assert_eq!(query.corrected_claim(), "prime minister government visit");
    }

    #[test]
    fn test_actress_expands() {
        let query = SearchQuery::build_for_year("actress wins", 2025);
        assert_eq!(query.corrected_claim(), "actor actress celebrity wins");
    }

    #[test]
    fn test_deterministic_for_year() {
        let a = SearchQuery::build_for_year("The Eiffel Tower is in Paris", 2025);
        let b = SearchQuery::build_for_year("the eiffel tower is in paris", 2025);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tokens_strip_punctuation() {
        let query = SearchQuery::build_for_year("India, China", 2025);
        let tokens: Vec<&str> = query.tokens().collect();
        assert!(tokens.contains(&"india"));
        assert!(tokens.contains(&"china"));
        assert!(tokens.contains(&"2025"));
    }
}
