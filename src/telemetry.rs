//! Tracing subscriber setup for the binary
//!
//! Logs go to stderr so stdout carries only result documents.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use crate::error::DriftError;

/// Install a compact stderr subscriber filtered by `filter`
/// (an `EnvFilter` directive such as `driftwatch=debug`).
pub fn init(filter: &str) -> Result<(), DriftError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| DriftError::Telemetry(format!("invalid log filter '{}': {}", filter, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| DriftError::Telemetry(e.to_string()))
}
