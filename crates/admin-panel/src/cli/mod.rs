//! CLI module - Command-line interface for the admin panel.
//!
//! Provides commands for:
//! - `users` - User listing, search and CRUD
//! - `taxonomy` - Family / group / subgroup browsing and node CRUD
//! - `requirements` - Requirement search and CRUD
//! - `check` - Offline RUT, phone, password and email checks

pub mod args;

pub use args::{Cli, Commands};
