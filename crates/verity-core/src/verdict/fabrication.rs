//! Lexical heuristic for fabricated entertainment claims.
//!
//! Fires only when the claim mentions the entertainment industry, no
//! supporting evidence exists, and some long alphabetic word looks
//! invented: a rare letter (q, x, y, z, j), a letter used three or more
//! times, or a known fabricated name fragment.

use lazy_static::lazy_static;
use regex::Regex;

/// Words must be longer than this to be inspected.
const MIN_SUSPICIOUS_WORD_LEN: usize = 5;

const RARE_LETTERS: &str = "qxyzj";

const FABRICATED_FRAGMENTS: &[&str] = &["bhatiya", "tammana"];

lazy_static! {
    /// Plain substring match, so "hollywod" and "actors" count too
    static ref ENTERTAINMENT_PATTERN: Regex =
        Regex::new(r"(?i)hollywoo?d|actress|actor").unwrap();
}

/// Whether the claim mentions the entertainment industry.
pub fn has_entertainment_keywords(claim: &str) -> bool {
    ENTERTAINMENT_PATTERN.is_match(claim)
}

/// The first word of `claim` with a suspicious character pattern.
pub fn suspicious_word(claim: &str) -> Option<&str> {
    claim.split_whitespace().find(|word| is_suspicious(word))
}

/// Whether the claim looks fabricated given `supporting_count` supporting items.
pub fn looks_fabricated(claim: &str, supporting_count: usize) -> bool {
    if supporting_count > 0 || !has_entertainment_keywords(claim) {
        return false;
    }

    match suspicious_word(claim) {
        Some(word) => {
            tracing::debug!(word = %word, "Suspicious name pattern in claim");
            true
        }
        None => false,
    }
}

fn is_suspicious(word: &str) -> bool {
    if word.chars().count() <= MIN_SUSPICIOUS_WORD_LEN || !word.chars().all(char::is_alphabetic) {
        return false;
    }

    let lower = word.to_lowercase();
    let rare_letters = lower.chars().filter(|c| RARE_LETTERS.contains(*c)).count();
    let repeated_letter = ('a'..='z').any(|letter| lower.matches(letter).count() >= 3);
    let fragment = FABRICATED_FRAGMENTS.iter().any(|f| lower.contains(f));

    rare_letters >= 1 || repeated_letter || fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entertainment_keywords() {
        assert!(has_entertainment_keywords("Hollywood star retires"));
        assert!(has_entertainment_keywords("hollywod gossip"));
        assert!(has_entertainment_keywords("The ACTRESS won"));
        assert!(!has_entertainment_keywords("The Eiffel Tower is in Paris"));
    }

    #[test]
    fn test_suspicious_words() {
        assert_eq!(suspicious_word("actress Xxxyyyzzz announced"), Some("Xxxyyyzzz"));
        // "bananas" repeats 'a' three times
        assert_eq!(suspicious_word("the actor bananas"), Some("bananas"));
        assert_eq!(suspicious_word("Tammanah spoke"), Some("Tammanah"));
        // too short, or not purely alphabetic
        assert_eq!(suspicious_word("actor jazzy qx1234 said"), None);
    }

    #[test]
    fn test_requires_no_supporting_evidence() {
        let claim = "actress Xxxyyyzzz announced retirement";
        assert!(looks_fabricated(claim, 0));
        assert!(!looks_fabricated(claim, 1));
    }

    #[test]
    fn test_requires_entertainment_context() {
        assert!(!looks_fabricated("Xxxyyyzzz announced retirement", 0));
    }
}
