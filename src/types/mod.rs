//! Core types for Driftwatch

mod lexicon;
mod message;
mod scored;
mod state;
mod output;

pub use lexicon::LexiconEntry;
pub use message::Message;
pub use scored::{ScoredMessage, ScoringRule};
pub use state::{UserState, WindowState};
pub use output::{AlertDecision, AnalysisResult, DriftAnalysis, TrustDecayAnalysis};
