//! Error types for Tagwatch
//!
//! This module defines the error types used by the relay pipeline,
//! using `thiserror` for ergonomic error handling. Benign outcomes
//! (non-push events, unwatched images) are not errors and never appear here.

use crate::gotify::GotifyError;
use thiserror::Error;

/// Main error type for Tagwatch operations
///
/// Covers configuration failures raised once at startup as well as the
/// per-request failures that the HTTP layer converts into a 500 response.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inbound webhook body could not be decoded
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Notification server rejected the message or was unreachable
    #[error("Delivery failed: {0}")]
    Delivery(#[from] GotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::InvalidPayload(err.to_string())
    }
}

/// Result type alias for startup and command-level operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation to `main`.
pub type Result<T> = anyhow::Result<T>;
