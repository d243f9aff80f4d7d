//! Oracle error types

use std::time::Duration;
use thiserror::Error;

/// Failures at the plan oracle boundary
///
/// The lifecycle controller does not distinguish these sub-causes: all of
/// them collapse into its single `OracleUnavailable` condition. They exist so
/// logs and tests can see what actually went wrong.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Oracle output is not JSON: {0}")]
    MalformedOutput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
