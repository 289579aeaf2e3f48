//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, local failures (validation, missing
/// context, lifecycle violations). Transport concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed OTP code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required piece of workflow context was absent (e.g. no pending id).
    #[error("missing context: {0}")]
    MissingContext(String),

    /// An identifier was invalid (empty or malformed).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A pending change is past its expiration and admits no transition.
    #[error("pending change expired")]
    Expired,

    /// An illegal status transition was attempted.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_context(msg: impl Into<String>) -> Self {
        Self::MissingContext(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }
}
