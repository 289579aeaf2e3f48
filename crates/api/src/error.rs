//! API client error model.

use thiserror::Error;

/// Failure talking to the backend.
///
/// Remote *business* failures (invalid OTP, expired pending change, field
/// validation) are not errors at this level; they arrive as a well-formed
/// error envelope and are surfaced as a `Failed` outcome instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, connection refused, request build failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response without a parseable error envelope.
    #[error("API error ({0}): {1}")]
    Api(u16, String),

    /// 2xx response whose body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
