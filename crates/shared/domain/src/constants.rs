//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role id
pub const ROLE_ADMINISTRATOR: i64 = 1;

/// Operator role id
pub const ROLE_OPERATOR: i64 = 2;

/// Citizen role id (never managed from the administration screens)
pub const ROLE_CITIZEN: i64 = 3;

/// Driver role id
pub const ROLE_DRIVER: i64 = 4;

/// Inspector role id
pub const ROLE_INSPECTOR: i64 = 5;

// =============================================================================
// Shifts
// =============================================================================

/// Shifts available to every role except Inspector
pub const GENERAL_SHIFTS: &[i64] = &[1, 2, 3];

/// Shifts reserved for the Inspector role
pub const INSPECTOR_SHIFTS: &[i64] = &[4, 5];

// =============================================================================
// Users
// =============================================================================

/// User id that the administration screens refuse to delete
pub const PROTECTED_USER_ID: i64 = 1;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum strength percentage accepted when creating a user
pub const MIN_CREATE_PASSWORD_STRENGTH: u8 = 66;

/// Chilean country calling code, as digits
pub const CHILE_COUNTRY_CODE: &str = "56";

// =============================================================================
// Colors used for inline feedback
// =============================================================================

pub const COLOR_NEUTRAL: &str = "#6c757d";
pub const COLOR_INVALID: &str = "#dc3545";
pub const COLOR_WARNING: &str = "#ffc107";
pub const COLOR_VALID: &str = "#28a745";
