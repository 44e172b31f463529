//! Domain-level errors.
//!
//! These errors represent business rule violations detected on the client
//! before any request reaches the backend.

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation. Messages are kept in form order.
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A user-interface rule refused the action (e.g. the protected user)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Value could not be parsed into a domain type
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl DomainError {
    /// Create a validation error carrying a single message
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(vec![msg.into()])
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        DomainError::Forbidden(msg.into())
    }

    /// Create an invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        DomainError::InvalidValue(msg.into())
    }

    /// Messages to show to the user, one per failed rule
    pub fn messages(&self) -> Vec<String> {
        match self {
            DomainError::Validation(messages) => messages.clone(),
            DomainError::Forbidden(msg) | DomainError::InvalidValue(msg) => vec![msg.clone()],
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
