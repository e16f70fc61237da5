//! Contextual Scorer: lexicon score adjusted by the user's previous score
//! and an optional biometric reading
//!
//! Rules run in a fixed order; the reason text follows the same order.
//! 1. repeated negativity: base > 0.5 AND last > 0.5 → +0.1 (clamped)
//! 2. sudden shift: last < 0.2 AND score > 0.7 → 1.0 (override)
//! 3. biometric: score > 0.4 AND reading < 40 → +0.1 (clamped)

use std::sync::Arc;
use crate::core::lexicon::Lexicon;
use crate::types::{ScoredMessage, ScoringRule};
use crate::{
    round2, BIOMETRIC_BOOST, BIOMETRIC_CUTOFF, BIOMETRIC_SCORE_MIN,
    REPEAT_NEGATIVITY_BOOST, REPEAT_NEGATIVITY_MIN, SUDDEN_SHIFT_CURRENT_MIN,
    SUDDEN_SHIFT_LAST_MAX,
};

/// Stateless scorer over a shared lexicon
#[derive(Debug, Clone)]
pub struct ContextualScorer {
    lexicon: Arc<Lexicon>,
}

impl Default for ContextualScorer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::builtin()))
    }
}

impl ContextualScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Lexicon score alone, no context
    pub fn base_score(&self, text: &str) -> f64 {
        self.lexicon.match_text(text).score
    }

    /// Score `text` given the user's previous score and an optional reading.
    /// Non-finite readings count as no reading.
    pub fn score(&self, text: &str, last_score: f64, biometric: Option<f64>) -> ScoredMessage {
        let base = self.lexicon.match_text(text);
        let mut score = base.score;
        let mut applied = Vec::new();

        if base.score > REPEAT_NEGATIVITY_MIN && last_score > REPEAT_NEGATIVITY_MIN {
            score = (score + REPEAT_NEGATIVITY_BOOST).min(1.0);
            applied.push(ScoringRule::RepeatedNegativity);
        }

        if last_score < SUDDEN_SHIFT_LAST_MAX && score > SUDDEN_SHIFT_CURRENT_MIN {
            score = 1.0;
            applied.push(ScoringRule::SuddenShift);
        }

        if let Some(reading) = biometric.filter(|r| r.is_finite()) {
            if score > BIOMETRIC_SCORE_MIN && reading < BIOMETRIC_CUTOFF {
                score = (score + BIOMETRIC_BOOST).min(1.0);
                applied.push(ScoringRule::BiometricCorroboration);
            }
        }

        let score = round2(score.clamp(0.0, 1.0));
        ScoredMessage::new(text, base.score, score, base.reason, applied)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LexiconEntry;
    use crate::{BIOMETRIC_NOTE, NO_DRIFT_REASON, REPEAT_NEGATIVITY_NOTE, SUDDEN_SHIFT_NOTE};

    fn scorer() -> ContextualScorer {
        ContextualScorer::default()
    }

    #[test]
    fn test_neutral_message() {
        let s = scorer().score("Shipping the release today.", 0.0, None);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.reason, NO_DRIFT_REASON);
        assert!(s.applied.is_empty());
    }

    #[test]
    fn test_sudden_shift_overrides() {
        // "whatever" = 0.8, calm previous message
        let s = scorer().score("Whatever, do what you want.", 0.0, None);
        assert_eq!(s.score, 1.0);
        assert!(s.fired(ScoringRule::SuddenShift));
        assert!(!s.fired(ScoringRule::RepeatedNegativity));
        assert!(s.reason.ends_with(SUDDEN_SHIFT_NOTE));
    }

    #[test]
    fn test_repeated_negativity_adds() {
        // "it's fine" = 0.6
        let s = scorer().score("It's fine.", 0.6, None);
        assert_eq!(s.score, 0.7);
        assert_eq!(s.applied, vec![ScoringRule::RepeatedNegativity]);
        assert_eq!(s.reason, format!("Passive-aggressive tone.{}", REPEAT_NEGATIVITY_NOTE));
    }

    #[test]
    fn test_repeated_negativity_clamps() {
        // "must be nice" = 0.9 → 1.0, not 1.1
        let s = scorer().score("Must be nice.", 0.9, None);
        assert_eq!(s.score, 1.0);
    }

    #[test]
    fn test_boundary_not_strict_enough() {
        // base exactly 0.5 does not count as negative
        let s = scorer().score("Actually, no.", 0.9, None);
        assert_eq!(s.score, 0.5);
        assert!(s.applied.is_empty());
    }

    #[test]
    fn test_biometric_boost() {
        let s = scorer().score("I'm swamped.", 0.0, Some(30.0));
        assert_eq!(s.score, 0.6);
        assert_eq!(s.applied, vec![ScoringRule::BiometricCorroboration]);
        assert!(s.reason.ends_with(BIOMETRIC_NOTE));
    }

    #[test]
    fn test_biometric_above_cutoff_ignored() {
        let s = scorer().score("I'm swamped.", 0.0, Some(40.0));
        assert_eq!(s.score, 0.5);
    }

    #[test]
    fn test_biometric_nan_is_absent() {
        let s = scorer().score("I'm swamped.", 0.0, Some(f64::NAN));
        assert_eq!(s.score, 0.5);
        assert!(s.applied.is_empty());
    }

    #[test]
    fn test_all_rules_keep_order() {
        // sudden shift is impossible together with repetition, so use
        // repetition + biometric
        let s = scorer().score("You know what, no.", 0.8, Some(10.0));
        assert_eq!(s.score, 1.0);
        assert_eq!(
            s.applied,
            vec![ScoringRule::RepeatedNegativity, ScoringRule::BiometricCorroboration]
        );
        assert_eq!(
            s.reason,
            format!("Defensive and confrontational.{}{}", REPEAT_NEGATIVITY_NOTE, BIOMETRIC_NOTE)
        );
    }

    #[test]
    fn test_shift_then_biometric_stays_clamped() {
        let s = scorer().score("Whatever.", 0.1, Some(5.0));
        assert_eq!(s.score, 1.0);
        assert_eq!(
            s.applied,
            vec![ScoringRule::SuddenShift, ScoringRule::BiometricCorroboration]
        );
    }

    #[test]
    fn test_output_always_in_range() {
        let lexicon = Arc::new(
            Lexicon::new(
                "range",
                vec![
                    LexiconEntry::new("zero", 0.0, "z"),
                    LexiconEntry::new("mid", 0.55, "m"),
                    LexiconEntry::new("max", 1.0, "x"),
                ],
            )
            .unwrap(),
        );
        let scorer = ContextualScorer::new(lexicon);
        for text in ["zero", "mid", "max", "none"] {
            for last in [0.0, 0.1, 0.19, 0.2, 0.5, 0.51, 1.0] {
                for bio in [None, Some(0.0), Some(39.9), Some(100.0), Some(f64::INFINITY)] {
                    let s = scorer.score(text, last, bio);
                    assert!((0.0..=1.0).contains(&s.score), "{} {} {:?} → {}", text, last, bio, s.score);
                }
            }
        }
    }
}
