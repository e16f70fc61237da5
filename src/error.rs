//! Error types
//!
//! Lexicon and config errors are fatal and surface before any message is read.
//! Pipeline and stream errors are per-message: the driver logs and skips them.

use thiserror::Error;

/// Invalid phrase table
#[derive(Debug, Error, PartialEq)]
pub enum LexiconError {
    #[error("lexicon has no entries")]
    Empty,
    #[error("lexicon entry #{index} has an empty phrase")]
    EmptyPhrase { index: usize },
    #[error("lexicon phrase '{phrase}' is declared more than once")]
    DuplicatePhrase { phrase: String },
    #[error("lexicon phrase '{phrase}' has base score {score} outside [0, 1]")]
    ScoreOutOfRange { phrase: String, score: f64 },
    #[error("unable to read lexicon file {path}: {message}")]
    Io { path: String, message: String },
    #[error("unable to parse lexicon file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Invalid configuration value
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window size must be at least 1, got {0}")]
    InvalidWindowSize(usize),
    #[error("threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Per-message processing failure
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("no state registered for user '{0}'")]
    MissingUserState(String),
    #[error("message at {timestamp} has an empty user id")]
    EmptyUser { timestamp: String },
}

/// Malformed input record
#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("read failed at line {line}: {message}")]
    Io { line: usize, message: String },
}

/// Alert log persistence failure
#[derive(Debug, Error)]
pub enum AlertLogError {
    #[error("alert log io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("alert log serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level error for the binary
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("alert log error: {0}")]
    AlertLog(#[from] AlertLogError),
    #[error("telemetry error: {0}")]
    Telemetry(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
