//! Unified error handling for the administration client.
//!
//! A single error type covers client-side validation failures, non-2xx
//! backend responses and transport problems. Backend failures caused by
//! existing references (foreign keys, linked complaints) get their own
//! variant so views can explain them instead of showing a raw message.

use domain::DomainError;
use serde::Deserialize;
use thiserror::Error;

/// Phrases the backend uses when a row cannot be deleted because of references.
pub const DEPENDENCY_ERROR_PATTERNS: &[&str] = &[
    "violates foreign key constraint",
    "asociadas",
    "asociados",
    "dependientes",
];

/// Check whether a backend message reports a dependency conflict.
pub fn is_dependency_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    DEPENDENCY_ERROR_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Client-side
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Action cancelled")]
    Cancelled,

    // Backend responses
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{message}")]
    Dependency { status: u16, message: String },

    // Transport
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    // Setup
    #[error("Configuration error: {0}")]
    Config(String),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

/// Error body the backend sends on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "detail", alias = "message", alias = "mensaje")]
    error: serde_json::Value,
}

impl AppError {
    /// Get error code for logs and scripting
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Cancelled => "CANCELLED",
            AppError::Http { .. } => "HTTP_ERROR",
            AppError::Dependency { .. } => "DEPENDENCY_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status of a backend failure
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } | AppError::Dependency { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Messages to list to the user, one per failed rule for validation errors
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(messages) => messages.clone(),
            other => vec![other.user_message()],
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(messages) => messages.join("\n"),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::Http { message, .. } => message.clone(),
            AppError::Dependency { .. } => {
                "The record cannot be deleted because other records depend on it".to_string()
            }
            AppError::Network(msg) => {
                tracing::error!("Network error: {}", msg);
                "Could not reach the server".to_string()
            }
            AppError::Decode(msg) => {
                tracing::error!("Decode error: {}", msg);
                "The server sent an unexpected response".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }

    /// True for failures worth logging as errors (not user mistakes or refusals)
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            AppError::Validation(_) | AppError::Forbidden(_) | AppError::Cancelled
        )
    }

    /// Build the error for a non-2xx response.
    ///
    /// The message comes from the body's `error` field when present, falling
    /// back to `Error {status}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| match b.error {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .unwrap_or_else(|| format!("Error {}", status));

        if is_dependency_message(&message) {
            AppError::Dependency { status, message }
        } else {
            AppError::Http { status, message }
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(messages) => AppError::Validation(messages),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::InvalidValue(msg) => AppError::Decode(msg),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}
