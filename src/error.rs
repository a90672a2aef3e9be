//! Error types for Daycast
//!
//! The aggregation core never fails; these errors only surface at the
//! boundaries (payload decoding, configuration, source acquisition).

use thiserror::Error;

/// Errors that can occur at the edges of an aggregation run
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unexpected payload shape: {0}")]
    UnexpectedShape(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Source fetch failed for {source_name}: {message}")]
    FetchFailed {
        source_name: String,
        message: String,
    },

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
