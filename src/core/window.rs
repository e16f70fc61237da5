//! Per-User Window Tracker: bounded FIFO of recent scores per user
//!
//! Appending beyond capacity evicts the oldest score. The average is only
//! reported once the window holds exactly `capacity` scores.

use std::collections::{BTreeMap, VecDeque};
use tracing::debug;
use crate::error::PipelineError;
use crate::types::UserState;
use crate::{round2, WINDOW_SIZE};

/// What to do with a user that has no state yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownUserPolicy {
    /// Create empty state on first sight
    #[default]
    LazyInit,
    /// Only pre-seeded users are accepted
    Reject,
}

/// Mean of a full window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverage {
    /// Unrounded mean, compared with the threshold
    pub mean: f64,
    /// Two-decimal mean, reported in results
    pub rounded: f64,
}

/// Keyed store of user windows
#[derive(Debug, Clone)]
pub struct WindowTracker {
    capacity: usize,
    policy: UnknownUserPolicy,
    users: BTreeMap<String, UserState>,
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self::new(WINDOW_SIZE, UnknownUserPolicy::LazyInit)
    }
}

impl WindowTracker {
    /// A capacity of 0 is raised to 1
    pub fn new(capacity: usize, policy: UnknownUserPolicy) -> Self {
        Self {
            capacity: capacity.max(1),
            policy,
            users: BTreeMap::new(),
        }
    }

    /// Register users up front (e.g. from a roster). Existing state is kept.
    pub fn seed<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for user in users {
            let user = user.into();
            self.users
                .entry(user.clone())
                .or_insert_with(|| UserState::new(user));
        }
    }

    fn state_mut(&mut self, user: &str) -> Result<&mut UserState, PipelineError> {
        if !self.users.contains_key(user) {
            match self.policy {
                UnknownUserPolicy::LazyInit => {
                    debug!(user, "initializing user state");
                    self.users.insert(user.to_string(), UserState::new(user));
                }
                UnknownUserPolicy::Reject => {
                    return Err(PipelineError::MissingUserState(user.to_string()));
                }
            }
        }
        self.users
            .get_mut(user)
            .ok_or_else(|| PipelineError::MissingUserState(user.to_string()))
    }

    /// Last score for `user`, creating state per the policy
    pub fn last_score(&mut self, user: &str) -> Result<f64, PipelineError> {
        Ok(self.state_mut(user)?.last_score)
    }

    /// Append a score, evict the oldest past capacity, return the mean
    /// once the window is full
    pub fn record(&mut self, user: &str, score: f64) -> Result<Option<WindowAverage>, PipelineError> {
        let capacity = self.capacity;
        let state = self.state_mut(user)?;
        push_bounded(&mut state.recent_scores, score, capacity);

        if state.recent_scores.len() < capacity {
            return Ok(None);
        }
        let mean = state.recent_scores.iter().sum::<f64>() / capacity as f64;
        Ok(Some(WindowAverage {
            mean,
            rounded: round2(mean),
        }))
    }

    /// Remember `score` as the user's previous score
    pub fn set_last_score(&mut self, user: &str, score: f64) -> Result<(), PipelineError> {
        self.state_mut(user)?.last_score = score;
        Ok(())
    }

    pub fn get(&self, user: &str) -> Option<&UserState> {
        self.users.get(user)
    }

    pub fn users(&self) -> impl Iterator<Item = &UserState> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn push_bounded(window: &mut VecDeque<f64>, score: f64, capacity: usize) {
    window.push_back(score);
    while window.len() > capacity {
        window.pop_front();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rounded(avg: Option<WindowAverage>) -> Option<f64> {
        avg.map(|a| a.rounded)
    }

    #[test]
    fn test_warming_until_full() {
        let mut tracker = WindowTracker::default();
        for i in 0..WINDOW_SIZE - 1 {
            assert_eq!(rounded(tracker.record("ben", 0.4).unwrap()), None, "message {}", i);
        }
        assert_eq!(rounded(tracker.record("ben", 0.4).unwrap()), Some(0.4));
        // stays available afterwards
        assert!(tracker.record("ben", 0.4).unwrap().is_some());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut tracker = WindowTracker::new(3, UnknownUserPolicy::LazyInit);
        tracker.record("a", 1.0).unwrap();
        tracker.record("a", 0.0).unwrap();
        tracker.record("a", 0.0).unwrap();
        assert_eq!(rounded(tracker.record("a", 0.0).unwrap()), Some(0.0));
        let window: Vec<f64> = tracker.get("a").unwrap().recent_scores.iter().copied().collect();
        assert_eq!(window, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_users_isolated() {
        let mut tracker = WindowTracker::new(2, UnknownUserPolicy::LazyInit);
        tracker.record("a", 0.9).unwrap();
        assert_eq!(rounded(tracker.record("b", 0.1).unwrap()), None);
        assert_eq!(rounded(tracker.record("a", 0.9).unwrap()), Some(0.9));
    }

    #[test]
    fn test_average_rounding() {
        let mut tracker = WindowTracker::new(3, UnknownUserPolicy::LazyInit);
        tracker.record("a", 0.1).unwrap();
        tracker.record("a", 0.2).unwrap();
        let avg = tracker.record("a", 0.2).unwrap().unwrap();
        assert_eq!(avg.rounded, 0.17);
        assert!((avg.mean - 0.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lazy_init_defaults() {
        let mut tracker = WindowTracker::default();
        assert_eq!(tracker.last_score("new").unwrap(), 0.0);
        assert!(tracker.get("new").unwrap().recent_scores.is_empty());
    }

    #[test]
    fn test_reject_unknown() {
        let mut tracker = WindowTracker::new(5, UnknownUserPolicy::Reject);
        tracker.seed(["ben"]);
        assert!(tracker.record("ben", 0.1).is_ok());
        assert_eq!(
            tracker.record("eve", 0.1),
            Err(PipelineError::MissingUserState("eve".to_string()))
        );
        assert!(tracker.get("eve").is_none());
    }

    #[test]
    fn test_set_last_score() {
        let mut tracker = WindowTracker::default();
        tracker.set_last_score("ben", 0.7).unwrap();
        assert_eq!(tracker.last_score("ben").unwrap(), 0.7);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let tracker = WindowTracker::new(0, UnknownUserPolicy::LazyInit);
        assert_eq!(tracker.capacity(), 1);
    }
}
