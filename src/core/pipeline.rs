//! Drift pipeline: one message at a time through scorer, window, evaluator
//!
//! Flow per message:
//! 1. look up the user's last score (creating state per policy)
//! 2. score text with last score + optional biometric reading
//! 3. record score in the user's window → mean once full
//! 4. evaluate the unrounded mean against the threshold; report it rounded
//! 5. store the score as the user's last score

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::config::DriftConfig;
use crate::core::alert::DecayEvaluator;
use crate::core::biometric::{BiometricSource, NoBiometrics, SyntheticBiometrics};
use crate::core::lexicon::Lexicon;
use crate::core::scorer::ContextualScorer;
use crate::core::window::WindowTracker;
use crate::error::{DriftError, PipelineError, StreamError};
use crate::types::{
    AnalysisResult, DriftAnalysis, Message, TrustDecayAnalysis, UserState, WindowState,
};

/// Counters for one run over a stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub alerts: usize,
    pub users: usize,
}

/// Owns all per-user state; not shared across workers
pub struct DriftPipeline {
    scorer: ContextualScorer,
    tracker: WindowTracker,
    evaluator: DecayEvaluator,
    biometrics: Box<dyn BiometricSource>,
    states: HashMap<String, WindowState>,
}

impl std::fmt::Debug for DriftPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriftPipeline")
            .field("lexicon", &self.scorer.lexicon().version())
            .field("window_size", &self.tracker.capacity())
            .field("threshold", &self.evaluator.threshold())
            .field("biometrics", &self.biometrics.name())
            .field("users", &self.tracker.len())
            .finish()
    }
}

impl Default for DriftPipeline {
    fn default() -> Self {
        Self::new(
            Arc::new(Lexicon::builtin()),
            WindowTracker::default(),
            DecayEvaluator::default(),
            Box::new(NoBiometrics),
        )
    }
}

impl DriftPipeline {
    pub fn new(
        lexicon: Arc<Lexicon>,
        tracker: WindowTracker,
        evaluator: DecayEvaluator,
        biometrics: Box<dyn BiometricSource>,
    ) -> Self {
        Self {
            scorer: ContextualScorer::new(lexicon),
            tracker,
            evaluator,
            biometrics,
            states: HashMap::new(),
        }
    }

    /// Build from config. Lexicon problems fail here, before any message.
    pub fn from_config(config: &DriftConfig) -> Result<Self, DriftError> {
        config.validate()?;
        let lexicon = config.load_lexicon()?;
        info!(
            lexicon = lexicon.version(),
            entries = lexicon.len(),
            window_size = config.window_size,
            threshold = config.threshold,
            biometrics = config.biometrics,
            users = config.users.len(),
            "pipeline configured"
        );
        let biometrics: Box<dyn BiometricSource> = if config.biometrics {
            Box::new(SyntheticBiometrics::new())
        } else {
            Box::new(NoBiometrics)
        };
        let mut pipeline = Self::new(
            Arc::new(lexicon),
            WindowTracker::new(config.window_size, config.unknown_users),
            DecayEvaluator::new(config.threshold),
            biometrics,
        );
        pipeline.seed_users(config.users.iter().cloned());
        Ok(pipeline)
    }

    /// Pre-register users
    pub fn seed_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracker.seed(users);
    }

    /// Process one message
    pub fn process(&mut self, message: &Message) -> Result<AnalysisResult, PipelineError> {
        let user = message.user.trim();
        if user.is_empty() {
            return Err(PipelineError::EmptyUser {
                timestamp: message.timestamp.clone(),
            });
        }

        let last_score = self.tracker.last_score(user)?;
        let base_score = self.scorer.base_score(&message.text);
        let reading = self.biometrics.reading(message, base_score);
        let scored = self.scorer.score(&message.text, last_score, reading);

        let window = self.tracker.record(user, scored.score)?;
        let (state, decision) = self.evaluator.evaluate(user, window.map(|w| w.mean));
        let average = window.map(|w| w.rounded);

        debug!(
            user,
            score = scored.score,
            last_score,
            ?average,
            ?reading,
            "message scored"
        );
        self.note_transition(user, state, average);
        if let Some(warning) = &decision.message {
            warn!(user, average = ?average, "{}", warning);
        }

        self.tracker.set_last_score(user, scored.score)?;

        Ok(AnalysisResult {
            timestamp: message.timestamp.clone(),
            user: user.to_string(),
            message_text: message.text.clone(),
            analysis: DriftAnalysis {
                drift_score: scored.score,
                reason: scored.reason,
            },
            biometric_reading: reading.filter(|r| r.is_finite()),
            trust_decay_analysis: TrustDecayAnalysis {
                triggered: decision.triggered,
                average_score_in_window: average,
                warning_message: decision.message,
            },
            state,
        })
    }

    /// Process a whole stream. Bad records are logged and skipped; every
    /// result is handed to `sink` in input order.
    pub fn process_stream<I, F>(&mut self, messages: I, mut sink: F) -> RunSummary
    where
        I: IntoIterator<Item = Result<Message, StreamError>>,
        F: FnMut(&AnalysisResult),
    {
        let mut summary = RunSummary::default();
        for item in messages {
            let outcome = item
                .map_err(|e| e.to_string())
                .and_then(|m| self.process(&m).map_err(|e| e.to_string()));
            match outcome {
                Ok(result) => {
                    summary.processed += 1;
                    if result.triggered() {
                        summary.alerts += 1;
                    }
                    sink(&result);
                }
                Err(reason) => {
                    summary.skipped += 1;
                    warn!(%reason, "skipping record");
                }
            }
        }
        summary.users = self.tracker.len();
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            alerts = summary.alerts,
            users = summary.users,
            "stream finished"
        );
        summary
    }

    fn note_transition(&mut self, user: &str, state: WindowState, average: Option<f64>) {
        let previous = self.states.insert(user.to_string(), state);
        if previous.is_some_and(|p| p != state) {
            info!(user, from = ?previous, to = %state, ?average, "window state changed");
        }
    }

    pub fn user(&self, user: &str) -> Option<&UserState> {
        self.tracker.get(user)
    }

    /// Latest state for `user`, None before their first message
    pub fn user_window_state(&self, user: &str) -> Option<WindowState> {
        self.states.get(user).copied()
    }

    pub fn users(&self) -> impl Iterator<Item = &UserState> {
        self.tracker.users()
    }

    pub fn user_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn window_size(&self) -> usize {
        self.tracker.capacity()
    }

    pub fn threshold(&self) -> f64 {
        self.evaluator.threshold()
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.scorer.lexicon()
    }
}

// =============================================================================
// TESTS
// =============================================================================
