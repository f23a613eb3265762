//! Prompts for the reasoning generator.
//!
//! The system prompt is fixed; the user prompt carries the claim, the
//! rule-based verdict, suspicious indicators and up to three articles.

use verity_core::verdict::fabrication::has_entertainment_keywords;
use verity_core::ArticleRecord;

/// Articles listed in a reasoning prompt.
pub const MAX_PROMPT_ARTICLES: usize = 3;

/// Article titles longer than this are truncated in prompts.
const MAX_TITLE_CHARS: usize = 80;

/// Establishes the generator as an explainer, not a judge. The rule engine
/// owns the verdict.
pub const REASONING_SYSTEM_PROMPT: &str = r#"
You are a fact-checking analyst explaining the evidence behind a claim.

A rule-based system has already assigned an initial verdict from scored
evidence. Your explanation is advisory: it helps a reader understand the
claim, the sources and what would settle the question.

## Constraints
1. Reason only from the claim, the listed articles and general knowledge
2. Say plainly when evidence is missing or weak
3. Do not invent sources, quotes or statistics
4. Name suspicious features of the claim when you see them

## Final line
End with a recommendation of TRUE, FALSE, MIXED or UNCLEAR and one
sentence explaining why.
"#;

/// Build the user prompt for one claim.
pub fn build_reasoning_prompt(
    claim: &str,
    articles: &[ArticleRecord],
    verdict: &str,
    rationale: &str,
) -> String {
    let indicators = suspicious_indicators(claim);
    let indicators_text = if indicators.is_empty() {
        "None detected".to_string()
    } else {
        indicators
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = format!(
        r#"## Claim
"{claim}"

## Initial Assessment
- Verdict: {verdict}
- Rationale: {rationale}

## Suspicious Indicators
{indicators_text}
"#
    );

    if !articles.is_empty() {
        prompt.push_str("\n## Articles Found\n");
        for (i, article) in articles.iter().take(MAX_PROMPT_ARTICLES).enumerate() {
            prompt.push_str(&format!(
                "{}. **{}** from {} (Credibility: {:.1}/1.0)\n",
                i + 1,
                prompt_title(&article.title),
                if article.source_domain.is_empty() {
                    "Unknown"
                } else {
                    article.source_domain.as_str()
                },
                article.credibility
            ));
        }
    }

    prompt.push_str(
        r#"
## Your Analysis
Walk through, step by step:
1. **Claim Breakdown**: what exactly is claimed and why it matters
2. **Evidence Analysis**: what the articles support or contradict
3. **Credibility Assessment**: how reliable the sources are, and any red flags
4. **Context**: what is known about the topic or similar claims
5. **Verification Challenges**: what makes this claim hard or easy to check
6. **Probability**: how likely the claim is to be true
7. **Recommendation**: TRUE, FALSE, MIXED or UNCLEAR, and why

If the claim looks fabricated, say specifically why and what evidence would
prove it true.
"#,
    );

    prompt
}

/// Claim features worth flagging to the generator.
pub fn suspicious_indicators(claim: &str) -> Vec<String> {
    let mut indicators = Vec::new();

    if has_entertainment_keywords(claim) {
        indicators.push(
            "Entertainment claim - requires verification from entertainment industry sources"
                .to_string(),
        );
    }

    for word in claim.split_whitespace() {
        let rare = word
            .to_lowercase()
            .chars()
            .filter(|c| "qxyzj".contains(*c))
            .count();
        if word.chars().count() > 6 && word.chars().all(char::is_alphabetic) && rare > 2 {
            indicators.push(format!(
                "Potentially misspelled or fabricated name: '{}'",
                word
            ));
        }
    }

    indicators
}

fn prompt_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return "No title".to_string();
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        let prefix: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", prefix)
    } else {
        title.to_string()
    }
}
