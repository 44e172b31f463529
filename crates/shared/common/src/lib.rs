//! Common utilities shared by the administration client.
//!
//! This crate provides:
//! - Unified error handling for client-side validation and backend calls
//! - HTTP client configuration

pub mod config;
pub mod error;

pub use config::*;
pub use error::{is_dependency_message, AppError, AppResult, DEPENDENCY_ERROR_PATTERNS};
