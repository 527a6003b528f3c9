use serde::{Deserialize, Serialize};
use std::fmt;

/// Rhetorical type of a question; selects the generation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Factual,
    Comparative,
    Procedural,
    Complex,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Comparative => "comparative",
            Self::Procedural => "procedural",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

const COMPARATIVE_PHRASES: &[&str] = &[
    "compare", "difference between", "versus", "pros and cons",
    "advantages and disadvantages", "similarities", "differences",
];

/// Matched as whole words only; as substrings they hit far too much ("vs" in "cvs").
const COMPARATIVE_WORDS: &[&str] = &["vs"];

const PROCEDURAL_PHRASES: &[&str] = &[
    "how to", "steps", "process", "procedure", "implement", "develop",
    "create", "build", "set up", "configure", "method", "approach",
];

const COMPLEX_PHRASES: &[&str] = &[
    "why", "explain", "analyze", "evaluate", "assess", "implications",
    "impact", "effect", "relationship", "critically",
];

const COMPLEX_MIN_CHARS: usize = 100;
const COMPLEX_MIN_WORDS: usize = 15;

/// Checks run in a fixed order: comparative, procedural, complex, then factual.
pub fn classify(question: &str) -> QuestionType {
    let lower = question.to_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();

    if COMPARATIVE_PHRASES.iter().any(|p| lower.contains(p)) || words.iter().any(|w| COMPARATIVE_WORDS.contains(w)) {
        return QuestionType::Comparative;
    }
    if PROCEDURAL_PHRASES.iter().any(|p| lower.contains(p)) {
        return QuestionType::Procedural;
    }
    if COMPLEX_PHRASES.iter().any(|p| lower.contains(p))
        || question.chars().count() > COMPLEX_MIN_CHARS
        || question.split_whitespace().count() > COMPLEX_MIN_WORDS
    {
        return QuestionType::Complex;
    }
    QuestionType::Factual
}
