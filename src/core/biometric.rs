//! Biometric readings fed to the scorer's corroboration rule
//!
//! The synthetic source stands in for a wearable feed. Readings behave like
//! heart-rate variability: lower means more stressed, below 40 counts.

use sha2::{Digest, Sha256};
use crate::types::Message;

/// Baseline reading for a perfectly neutral message
pub const SYNTHETIC_BASELINE: f64 = 72.0;
/// Drop in reading per unit of base score
pub const SYNTHETIC_SLOPE: f64 = 45.0;
/// Max jitter either side of the curve
pub const SYNTHETIC_JITTER: f64 = 6.0;

/// Anything that can produce a reading for a message
pub trait BiometricSource: Send + Sync {
    /// Reading for `message`, given its lexicon base score. None = no signal.
    fn reading(&self, message: &Message, base_score: f64) -> Option<f64>;

    fn name(&self) -> &'static str;
}

/// No biometric feed; the corroboration rule never fires
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBiometrics;

impl BiometricSource for NoBiometrics {
    fn reading(&self, _message: &Message, _base_score: f64) -> Option<f64> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Deterministic synthetic feed derived from the base score
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticBiometrics;

impl SyntheticBiometrics {
    pub fn new() -> Self {
        Self
    }

    /// Jitter in [-SYNTHETIC_JITTER, +SYNTHETIC_JITTER], stable per message
    fn jitter(message: &Message) -> f64 {
        let mut hasher = Sha256::new();
        hasher.update(message.user.as_bytes());
        hasher.update(b"|");
        hasher.update(message.timestamp.as_bytes());
        hasher.update(b"|");
        hasher.update(message.text.as_bytes());
        let digest = hasher.finalize();
        let raw = u16::from_be_bytes([digest[0], digest[1]]) as f64 / u16::MAX as f64;
        (raw * 2.0 - 1.0) * SYNTHETIC_JITTER
    }
}

impl BiometricSource for SyntheticBiometrics {
    fn reading(&self, message: &Message, base_score: f64) -> Option<f64> {
        let curve = SYNTHETIC_BASELINE - SYNTHETIC_SLOPE * base_score.clamp(0.0, 1.0);
        let reading = curve + Self::jitter(message);
        Some((reading * 10.0).round() / 10.0)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> Message {
        Message::new("2024-05-01T09:00:00Z", "sara", text)
    }

    #[test]
    fn test_none_source() {
        assert_eq!(NoBiometrics.reading(&msg("whatever"), 0.8), None);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let source = SyntheticBiometrics::new();
        let m = msg("Must be nice.");
        assert_eq!(source.reading(&m, 0.9), source.reading(&m, 0.9));
    }

    #[test]
    fn test_synthetic_within_band() {
        let source = SyntheticBiometrics::new();
        for (i, base) in [0.0, 0.3, 0.5, 0.8, 1.0].iter().enumerate() {
            let m = msg(&format!("message {}", i));
            let reading = source.reading(&m, *base).unwrap();
            let curve = SYNTHETIC_BASELINE - SYNTHETIC_SLOPE * base;
            assert!((reading - curve).abs() <= SYNTHETIC_JITTER + 0.05, "{} vs {}", reading, curve);
        }
    }

    #[test]
    fn test_neutral_never_stressed() {
        let source = SyntheticBiometrics::new();
        let reading = source.reading(&msg("All good here."), 0.0).unwrap();
        assert!(reading >= crate::BIOMETRIC_CUTOFF);
    }
}
