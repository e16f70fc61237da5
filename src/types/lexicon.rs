//! Lexicon entry: one signal phrase with its base score

use serde::{Deserialize, Serialize};

/// A single phrase → (base score, reason) rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Substring to look for (matched against lowercased text)
    pub phrase: String,
    /// Score in [0, 1] reported when this phrase wins
    pub base_score: f64,
    /// Human-readable explanation
    pub reason: String,
}

impl LexiconEntry {
    pub fn new(phrase: impl Into<String>, base_score: f64, reason: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            base_score,
            reason: reason.into(),
        }
    }
}
