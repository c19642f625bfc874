//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for hush.
#[derive(Debug, Error)]
pub enum HushError {
    #[error("invalid moderation parameters: {0}")]
    InvalidParams(String),

    #[error("invalid identity: {0}")]
    InvalidId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("{0}")]
    Other(String),
}
