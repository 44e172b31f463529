//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! users and roles, the complaint taxonomy, and the validation rules applied
//! to forms before anything is sent to the backend.

pub mod constants;
pub mod email;
pub mod error;
pub mod form;
pub mod password;
pub mod phone;
pub mod rut;
pub mod taxonomy;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use form::{FieldStatus, FormMode, UserForm, ValidUser};
pub use password::{Password, PasswordMatch, PasswordStrength, StrengthTier};
pub use taxonomy::{
    Classification, Family, Group, HierarchyPath, Level, NewNode, PathNode, Requirement,
    RequirementStats, RequirementUpdate, Subgroup,
};
pub use user::{filter_shifts, Role, ShiftSelection, User, UserStats, UserSummary};
