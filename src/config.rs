//! Runtime configuration
//!
//! Defaults come from the crate constants, then `.env` / process
//! environment, then CLI flags (applied by the binary).

use std::env;
use std::path::PathBuf;
use crate::core::lexicon::Lexicon;
use crate::core::window::UnknownUserPolicy;
use crate::error::{ConfigError, LexiconError};
use crate::{TRUST_DECAY_THRESHOLD, WINDOW_SIZE};

pub const ENV_WINDOW_SIZE: &str = "DRIFT_WINDOW_SIZE";
pub const ENV_THRESHOLD: &str = "DRIFT_THRESHOLD";
pub const ENV_LEXICON_PATH: &str = "DRIFT_LEXICON_PATH";
pub const ENV_UNKNOWN_USERS: &str = "DRIFT_UNKNOWN_USERS";
pub const ENV_BIOMETRICS: &str = "DRIFT_BIOMETRICS";
pub const ENV_ALERT_DIR: &str = "DRIFT_ALERT_DIR";
pub const ENV_USERS: &str = "DRIFT_USERS";
pub const ENV_LOG: &str = "DRIFT_LOG";

pub const DEFAULT_LOG_FILTER: &str = "driftwatch=info,warn";

/// Everything the pipeline and driver need
#[derive(Debug, Clone, PartialEq)]
pub struct DriftConfig {
    pub window_size: usize,
    pub threshold: f64,
    /// Custom lexicon JSON; built-in table when None
    pub lexicon_path: Option<PathBuf>,
    pub unknown_users: UnknownUserPolicy,
    /// Users registered before the first message
    pub users: Vec<String>,
    /// Feed synthetic biometric readings to the scorer
    pub biometrics: bool,
    /// Directory for triggered-alert logs; disabled when None
    pub alert_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            threshold: TRUST_DECAY_THRESHOLD,
            lexicon_path: None,
            unknown_users: UnknownUserPolicy::LazyInit,
            users: Vec::new(),
            biometrics: false,
            alert_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl DriftConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_WINDOW_SIZE) {
            config.window_size = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_WINDOW_SIZE,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_THRESHOLD) {
            config.threshold = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_THRESHOLD,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_LEXICON_PATH).filter(|v| !v.trim().is_empty()) {
            config.lexicon_path = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = lookup(ENV_UNKNOWN_USERS) {
            config.unknown_users = parse_policy(&raw)?;
        }
        if let Some(raw) = lookup(ENV_USERS) {
            config.users = parse_users(&raw);
        }
        if let Some(raw) = lookup(ENV_BIOMETRICS) {
            config.biometrics = parse_switch(ENV_BIOMETRICS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ALERT_DIR).filter(|v| !v.trim().is_empty()) {
            config.alert_dir = Some(PathBuf::from(raw.trim()));
        }
        if let Some(raw) = lookup(ENV_LOG).or_else(|| lookup("RUST_LOG")) {
            config.log_filter = raw;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize(self.window_size));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// The configured lexicon, validated
    pub fn load_lexicon(&self) -> Result<Lexicon, LexiconError> {
        match &self.lexicon_path {
            Some(path) => Lexicon::from_path(path),
            None => Ok(Lexicon::builtin()),
        }
    }
}

fn parse_policy(raw: &str) -> Result<UnknownUserPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "lazy" | "create" | "auto" => Ok(UnknownUserPolicy::LazyInit),
        "reject" | "strict" => Ok(UnknownUserPolicy::Reject),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_UNKNOWN_USERS,
            value: raw.to_string(),
        }),
    }
}

/// Comma-separated roster; blanks are dropped
pub fn parse_users(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect()
}

fn parse_switch(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DriftConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DriftConfig::default());
        assert_eq!(config.window_size, 5);
        assert_eq!(config.threshold, 0.5);
    }

    #[test]
    fn test_overrides() {
        let config = DriftConfig::from_lookup(lookup(&[
            (ENV_WINDOW_SIZE, "3"),
            (ENV_THRESHOLD, "0.4"),
            (ENV_UNKNOWN_USERS, "reject"),
            (ENV_BIOMETRICS, "on"),
            (ENV_ALERT_DIR, "/tmp/alerts"),
        ]))
        .unwrap();
        assert_eq!(config.window_size, 3);
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.unknown_users, UnknownUserPolicy::Reject);
        assert!(config.biometrics);
        assert_eq!(config.alert_dir, Some(PathBuf::from("/tmp/alerts")));
    }

    #[test]
    fn test_user_roster() {
        let config = DriftConfig::from_lookup(lookup(&[(ENV_USERS, " ana, ben,,cara ")])).unwrap();
        assert_eq!(config.users, vec!["ana", "ben", "cara"]);

        let config = DriftConfig::from_lookup(lookup(&[(ENV_USERS, " , ")])).unwrap();
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_rejects_zero_window() {
        let err = DriftConfig::from_lookup(lookup(&[(ENV_WINDOW_SIZE, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidWindowSize(0));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        assert!(DriftConfig::from_lookup(lookup(&[(ENV_THRESHOLD, "abc")])).is_err());
        assert!(DriftConfig::from_lookup(lookup(&[(ENV_THRESHOLD, "1.5")])).is_err());
    }

    #[test]
    fn test_rejects_bad_switch() {
        let err = DriftConfig::from_lookup(lookup(&[(ENV_BIOMETRICS, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_BIOMETRICS, .. }));
    }
}
