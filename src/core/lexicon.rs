//! Lexicon Matcher: ordered phrase table, first substring match wins
//!
//! Precedence is declaration order. When one phrase contains another
//! ("whatever" / "sure, whatever") the earlier entry wins even if it is
//! shorter or scores lower. Reordering the table changes scores.

use std::collections::HashSet;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::LexiconError;
use crate::types::LexiconEntry;
use crate::NO_DRIFT_REASON;

/// Version tag of the built-in table
pub const DEFAULT_LEXICON_VERSION: &str = "builtin-1";

/// Built-in signal phrases, in precedence order
const DEFAULT_SIGNALS: &[(&str, f64, &str)] = &[
    ("making progress", 0.3, "Ambiguous update, not very informative."),
    ("maybe", 0.4, "Hesitant language, indicates uncertainty."),
    ("i thought", 0.7, "Potential contradiction or blame-shifting."),
    ("actually", 0.5, "Corrective/Contradictory statement."),
    ("it's fine", 0.6, "Passive-aggressive tone."),
    ("whatever", 0.8, "Dismissive tone, can be rude to colleagues."),
    ("i guess", 0.4, "Reluctance or lack of buy-in to the conversation."),
    ("swamped", 0.5, "Avoiding responsibility in some cases."),
    ("must be nice", 0.9, "High passive-aggressive tone detected."),
    ("you know what", 0.8, "Defensive and confrontational."),
    ("sure, whatever", 0.9, "Dismissive and confrontational."),
];

/// Result of a lexicon lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexiconMatch<'a> {
    pub score: f64,
    pub reason: &'a str,
    /// Winning phrase, None when nothing matched
    pub phrase: Option<&'a str>,
}

/// On-disk layout of a lexicon file
#[derive(Debug, Serialize, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    version: Option<String>,
    entries: Vec<LexiconEntry>,
}

/// Validated, immutable phrase table
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    version: String,
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Validate and build. Phrases are lowercased; order is kept.
    pub fn new(
        version: impl Into<String>,
        entries: Vec<LexiconEntry>,
    ) -> Result<Self, LexiconError> {
        if entries.is_empty() {
            return Err(LexiconError::Empty);
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.phrase.trim().is_empty() {
                return Err(LexiconError::EmptyPhrase { index });
            }
            let phrase = entry.phrase.to_lowercase();
            if !entry.base_score.is_finite() || !(0.0..=1.0).contains(&entry.base_score) {
                return Err(LexiconError::ScoreOutOfRange {
                    phrase,
                    score: entry.base_score,
                });
            }
            if !seen.insert(phrase.clone()) {
                return Err(LexiconError::DuplicatePhrase { phrase });
            }
            normalized.push(LexiconEntry { phrase, ..entry });
        }

        Ok(Self {
            version: version.into(),
            entries: normalized,
        })
    }

    /// The built-in table
    pub fn builtin() -> Self {
        let entries = DEFAULT_SIGNALS
            .iter()
            .map(|(phrase, score, reason)| LexiconEntry::new(*phrase, *score, *reason))
            .collect();
        Self {
            version: DEFAULT_LEXICON_VERSION.to_string(),
            entries,
        }
    }

    /// Parse `{"version": "...", "entries": [{phrase, base_score, reason}, ...]}`
    pub fn from_json_str(raw: &str, source: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(raw).map_err(|e| LexiconError::Parse {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        let version = file.version.unwrap_or_else(|| source.to_string());
        Self::new(version, file.entries)
    }

    /// Load from a JSON file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| LexiconError::Io {
            path: shown.clone(),
            message: e.to_string(),
        })?;
        let lexicon = Self::from_json_str(&raw, &shown)?;
        debug!(path = %shown, entries = lexicon.len(), version = %lexicon.version, "lexicon loaded");
        Ok(lexicon)
    }

    /// Score of the first entry whose phrase occurs in the lowercased text
    pub fn match_text(&self, text: &str) -> LexiconMatch<'_> {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| lowered.contains(entry.phrase.as_str()))
            .map(|entry| LexiconMatch {
                score: entry.base_score,
                reason: &entry.reason,
                phrase: Some(&entry.phrase),
            })
            .unwrap_or(LexiconMatch {
                score: 0.0,
                reason: NO_DRIFT_REASON,
                phrase: None,
            })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// TESTS
// =============================================================================
