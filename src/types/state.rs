//! Per-user window state

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};

/// Where a user's window stands after the latest record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowState {
    /// Window not yet full, no average
    Warming,
    /// Full, average at or below threshold
    Steady,
    /// Full, average above threshold
    Decaying,
}

impl WindowState {
    /// ANSI color for terminal display
    pub fn color(&self) -> colored::Color {
        match self {
            WindowState::Warming => colored::Color::BrightBlack,
            WindowState::Steady => colored::Color::Green,
            WindowState::Decaying => colored::Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WindowState::Warming => "…",
            WindowState::Steady => "●",
            WindowState::Decaying => "▼",
        }
    }
}

impl std::fmt::Display for WindowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WindowState::Warming => "WARMING",
            WindowState::Steady => "STEADY",
            WindowState::Decaying => "DECAYING",
        };
        write!(f, "{}", name)
    }
}

/// Mutable state kept for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: String,
    /// Most recent scores, oldest first
    pub recent_scores: VecDeque<f64>,
    /// Score of the user's previous message (0.0 before any)
    pub last_score: f64,
}

impl UserState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            recent_scores: VecDeque::new(),
            last_score: 0.0,
        }
    }
}
