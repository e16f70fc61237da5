//! Decay Alert Evaluator
//!
//! Only the rolling window average is compared with the threshold, never a
//! single drift score. Strict greater-than on the unrounded mean: an average
//! equal to the threshold stays STEADY. DECAYING is not sticky.

use crate::types::{AlertDecision, WindowState};
use crate::TRUST_DECAY_THRESHOLD;

/// Float summation noise below this never counts as exceeding the threshold
pub const AVERAGE_EPSILON: f64 = 1e-9;

/// Threshold check over window averages
#[derive(Debug, Clone, Copy)]
pub struct DecayEvaluator {
    threshold: f64,
}

impl Default for DecayEvaluator {
    fn default() -> Self {
        Self::new(TRUST_DECAY_THRESHOLD)
    }
}

impl DecayEvaluator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// State for an unrounded window mean (None = window not full)
    pub fn classify(&self, window_mean: Option<f64>) -> WindowState {
        match window_mean {
            None => WindowState::Warming,
            Some(mean) if mean > self.threshold + AVERAGE_EPSILON => WindowState::Decaying,
            Some(_) => WindowState::Steady,
        }
    }

    /// Alert decision for `user` given its unrounded window mean
    pub fn evaluate(&self, user: &str, window_mean: Option<f64>) -> (WindowState, AlertDecision) {
        let state = self.classify(window_mean);
        let decision = match state {
            WindowState::Decaying => AlertDecision {
                triggered: true,
                message: Some(warning_message(user)),
            },
            WindowState::Warming | WindowState::Steady => AlertDecision::quiet(),
        };
        (state, decision)
    }
}

/// Warning text attached to a triggered result
pub fn warning_message(user: &str) -> String {
    format!("Potential trust decay in user {} - intervention suggested!", user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warming_never_triggers() {
        let (state, decision) = DecayEvaluator::default().evaluate("ben", None);
        assert_eq!(state, WindowState::Warming);
        assert!(!decision.triggered);
        assert!(decision.message.is_none());
    }

    #[test]
    fn test_equal_does_not_trigger() {
        let (state, decision) = DecayEvaluator::default().evaluate("ben", Some(0.5));
        assert_eq!(state, WindowState::Steady);
        assert!(!decision.triggered);
    }

    #[test]
    fn test_above_triggers_with_message() {
        let (state, decision) = DecayEvaluator::default().evaluate("sara", Some(0.51));
        assert_eq!(state, WindowState::Decaying);
        assert!(decision.triggered);
        assert_eq!(
            decision.message.as_deref(),
            Some("Potential trust decay in user sara - intervention suggested!")
        );
    }

    #[test]
    fn test_summation_noise_does_not_trigger() {
        // sums to 2.5000000000000004
        let mean = [0.1, 0.6, 0.9, 0.8, 0.1].iter().sum::<f64>() / 5.0;
        assert!(mean > TRUST_DECAY_THRESHOLD);
        assert_eq!(DecayEvaluator::default().classify(Some(mean)), WindowState::Steady);
    }

    #[test]
    fn test_excess_hidden_by_rounding_triggers() {
        // 0.3333... reports as 0.33 but is above 0.33
        let evaluator = DecayEvaluator::new(0.33);
        assert_eq!(evaluator.classify(Some(1.0 / 3.0)), WindowState::Decaying);
    }

    #[test]
    fn test_custom_threshold() {
        let evaluator = DecayEvaluator::new(0.3);
        assert_eq!(evaluator.classify(Some(0.31)), WindowState::Decaying);
        assert_eq!(evaluator.classify(Some(0.3)), WindowState::Steady);
    }
}
