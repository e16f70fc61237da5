//! Per-message result record

use colored::Colorize;
use serde::{Deserialize, Serialize};
use crate::types::WindowState;

/// Outcome of comparing a window average with the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AlertDecision {
    pub fn quiet() -> Self {
        Self {
            triggered: false,
            message: None,
        }
    }
}

/// Message-level part of the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAnalysis {
    pub drift_score: f64,
    pub reason: String,
}

/// Window-level part of the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustDecayAnalysis {
    pub triggered: bool,
    /// None until the window is full
    pub average_score_in_window: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
}

/// One result per processed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: String,
    pub user: String,
    pub message_text: String,
    pub analysis: DriftAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_reading: Option<f64>,
    pub trust_decay_analysis: TrustDecayAnalysis,
    pub state: WindowState,
}

impl AnalysisResult {
    pub fn triggered(&self) -> bool {
        self.trust_decay_analysis.triggered
    }

    pub fn drift_score(&self) -> f64 {
        self.analysis.drift_score
    }

    pub fn window_average(&self) -> Option<f64> {
        self.trust_decay_analysis.average_score_in_window
    }

    fn average_display(&self) -> String {
        match self.window_average() {
            Some(avg) => format!("{:.2}", avg),
            None => "--".to_string(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = format!(
            "{} [{}] {} drift={:.2} | avg={} | state={} | {}",
            self.state.symbol(),
            self.timestamp,
            self.user,
            self.drift_score(),
            self.average_display(),
            self.state,
            self.analysis.reason,
        );
        let mut out = line.color(self.state.color()).to_string();
        if let Some(warning) = &self.trust_decay_analysis.warning_message {
            out.push_str(&format!("\n  {} {}", "[!]".red().bold(), warning.red()));
        }
        out
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "ts={} | user={} | drift={:.2} | avg={} | state={} | triggered={} | reason={}",
            self.timestamp,
            self.user,
            self.drift_score(),
            self.average_display(),
            self.state,
            self.triggered(),
            self.analysis.reason,
        )
    }
}
