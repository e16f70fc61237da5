//! Driftwatch: per-user drift scoring and trust decay detection
//!
//! message → ContextualScorer → WindowTracker → DecayEvaluator → AnalysisResult

pub mod config;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod types;

// =============================================================================
// WINDOW / ALERT
// =============================================================================

/// Number of scores kept per user; also the warm-up length
pub const WINDOW_SIZE: usize = 5;

/// Rolling average must be strictly above this to raise a decay alert
pub const TRUST_DECAY_THRESHOLD: f64 = 0.5;

// =============================================================================
// CONTEXTUAL SCORER RULES
// =============================================================================

/// Both current base score and last score must exceed this for the repeat boost
pub const REPEAT_NEGATIVITY_MIN: f64 = 0.5;
pub const REPEAT_NEGATIVITY_BOOST: f64 = 0.1;

/// Sudden shift: last score below this...
pub const SUDDEN_SHIFT_LAST_MAX: f64 = 0.2;
/// ...and current score above this forces 1.0
pub const SUDDEN_SHIFT_CURRENT_MIN: f64 = 0.7;

/// Biometric corroboration: score above this and reading below the cutoff
pub const BIOMETRIC_SCORE_MIN: f64 = 0.4;
pub const BIOMETRIC_CUTOFF: f64 = 40.0;
pub const BIOMETRIC_BOOST: f64 = 0.1;

// =============================================================================
// REASON TEXT
// =============================================================================

pub const NO_DRIFT_REASON: &str = "No drift detected";
pub const REPEAT_NEGATIVITY_NOTE: &str = " (Pattern of Negative Behavior from this user)";
pub const SUDDEN_SHIFT_NOTE: &str = " (Sudden Negative Shift)";
pub const BIOMETRIC_NOTE: &str = " (Biometric stress corroborates tone)";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";

/// Round to two decimals, the precision of every reported score
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
