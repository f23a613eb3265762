//! Built-in table of trivially verifiable statements.
//!
//! A claim containing one of these phrases skips article analysis and is
//! answered from the table directly.

use crate::types::{EvidenceItem, NliScores, SourceMeta};

struct KnownFact {
    pattern: &'static str,
    sentence: &'static str,
    entailment: f64,
    contradiction: f64,
}

const FALSE_FACTS: &[KnownFact] = &[
    KnownFact {
        pattern: "goat has two legs",
        sentence: "Goats are quadrupedal animals with four legs, not two.",
        entailment: 0.1,
        contradiction: 0.9,
    },
    KnownFact {
        pattern: "earth is flat",
        sentence: "Scientific consensus confirms the Earth is an oblate spheroid, not flat.",
        entailment: 0.05,
        contradiction: 0.95,
    },
    KnownFact {
        pattern: "moon is made of cheese",
        sentence: "The moon is composed of rock and mineral materials, not cheese.",
        entailment: 0.1,
        contradiction: 0.9,
    },
    KnownFact {
        pattern: "water is dry",
        sentence: "Water is a liquid substance that is wet, not dry.",
        entailment: 0.15,
        contradiction: 0.85,
    },
];

const TRUE_FACTS: &[KnownFact] = &[
    KnownFact {
        pattern: "water is wet",
        sentence: "Water is a liquid that exhibits wetness properties.",
        entailment: 0.9,
        contradiction: 0.1,
    },
    KnownFact {
        pattern: "sky is blue",
        sentence: "The sky appears blue due to Rayleigh scattering of sunlight.",
        entailment: 0.85,
        contradiction: 0.15,
    },
    KnownFact {
        pattern: "humans breathe air",
        sentence: "Humans require oxygen from air for respiration.",
        entailment: 0.95,
        contradiction: 0.05,
    },
];

/// Evidence for a claim matching the built-in table, if any.
///
/// False statements are checked before true ones.
pub fn known_fact_evidence(claim: &str) -> Option<Vec<EvidenceItem>> {
    let claim = claim.to_lowercase();
    FALSE_FACTS
        .iter()
        .chain(TRUE_FACTS)
        .find(|fact| claim.contains(fact.pattern))
        .map(|fact| {
            vec![EvidenceItem::new(
                fact.sentence,
                NliScores::new(fact.entailment, fact.contradiction, 0.0),
                SourceMeta::reference(),
            )]
        })
}
