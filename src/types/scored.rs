//! Scorer output

use serde::{Deserialize, Serialize};

/// Context rules the scorer may apply, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// +0.1 when both this and the previous message are negative
    RepeatedNegativity,
    /// Forced to 1.0 after a calm previous message
    SuddenShift,
    /// +0.1 when a low biometric reading backs up the text
    BiometricCorroboration,
}

impl ScoringRule {
    /// Annotation appended to the reason text
    pub fn note(&self) -> &'static str {
        match self {
            Self::RepeatedNegativity => crate::REPEAT_NEGATIVITY_NOTE,
            Self::SuddenShift => crate::SUDDEN_SHIFT_NOTE,
            Self::BiometricCorroboration => crate::BIOMETRIC_NOTE,
        }
    }
}

/// A scored message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMessage {
    pub text: String,
    /// Lexicon score before context rules
    pub base_score: f64,
    /// Final score in [0, 1], two decimals
    pub score: f64,
    /// Base reason followed by one note per applied rule
    pub reason: String,
    /// Rules that fired, in order
    pub applied: Vec<ScoringRule>,
}

impl ScoredMessage {
    /// Assemble from the base reason and the rules that fired
    pub fn new(
        text: impl Into<String>,
        base_score: f64,
        score: f64,
        base_reason: &str,
        applied: Vec<ScoringRule>,
    ) -> Self {
        let mut reason = base_reason.to_string();
        for rule in &applied {
            reason.push_str(rule.note());
        }
        Self {
            text: text.into(),
            base_score,
            score,
            reason,
            applied,
        }
    }

    pub fn fired(&self, rule: ScoringRule) -> bool {
        self.applied.contains(&rule)
    }
}
