//! Core modules for Driftwatch

pub mod lexicon;
pub mod scorer;
pub mod biometric;
pub mod window;
pub mod alert;
pub mod pipeline;
pub mod stream;
pub mod alert_log;
pub mod api;

pub use lexicon::{Lexicon, LexiconMatch};
pub use scorer::ContextualScorer;
pub use biometric::{BiometricSource, NoBiometrics, SyntheticBiometrics};
pub use window::{UnknownUserPolicy, WindowTracker};
pub use alert::{warning_message, DecayEvaluator};
pub use pipeline::{DriftPipeline, RunSummary};
pub use stream::{read_messages, scripted_conversation, scripted_users, InputFormat};
pub use alert_log::{load_alerts, new_run_id, AlertLog};
pub use api::{create_router, run_server};
