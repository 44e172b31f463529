//! User domain entity and related types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{
    GENERAL_SHIFTS, INSPECTOR_SHIFTS, PROTECTED_USER_ID, ROLE_ADMINISTRATOR, ROLE_CITIZEN,
    ROLE_DRIVER, ROLE_INSPECTOR, ROLE_OPERATOR,
};
use crate::error::DomainError;
use crate::phone;

/// Every shift id known to the backend
pub const ALL_SHIFTS: &[i64] = &[1, 2, 3, 4, 5];

/// Wire format of the backend's creation timestamp
const CREATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    Administrator,
    Operator,
    Citizen,
    Driver,
    Inspector,
}

impl Role {
    /// Roles offered by the administration screens (Citizen excluded)
    pub const MANAGEABLE: [Role; 4] = [
        Role::Administrator,
        Role::Operator,
        Role::Driver,
        Role::Inspector,
    ];

    /// Backend identifier of the role
    pub fn id(self) -> i64 {
        match self {
            Role::Administrator => ROLE_ADMINISTRATOR,
            Role::Operator => ROLE_OPERATOR,
            Role::Citizen => ROLE_CITIZEN,
            Role::Driver => ROLE_DRIVER,
            Role::Inspector => ROLE_INSPECTOR,
        }
    }

    /// Check if this role can be created or edited from the admin screens
    pub fn is_manageable(self) -> bool {
        !matches!(self, Role::Citizen)
    }

    /// Check if this role has admin privileges
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Administrator)
    }

    /// Shift ids a user with this role may be assigned to
    pub fn allowed_shifts(self) -> &'static [i64] {
        match self {
            Role::Inspector => INSPECTOR_SHIFTS,
            _ => GENERAL_SHIFTS,
        }
    }

    /// Parse the role name the backend sends next to the id
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "administrador" | "administrator" => Some(Role::Administrator),
            "operador" | "operator" => Some(Role::Operator),
            "ciudadano" | "citizen" => Some(Role::Citizen),
            "conductor" | "driver" => Some(Role::Driver),
            "inspector" => Some(Role::Inspector),
            _ => None,
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = DomainError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        match id {
            ROLE_ADMINISTRATOR => Ok(Role::Administrator),
            ROLE_OPERATOR => Ok(Role::Operator),
            ROLE_CITIZEN => Ok(Role::Citizen),
            ROLE_DRIVER => Ok(Role::Driver),
            ROLE_INSPECTOR => Ok(Role::Inspector),
            other => Err(DomainError::invalid_value(format!("unknown role id {}", other))),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Administrator => "Administrator",
            Role::Operator => "Operator",
            Role::Citizen => "Citizen",
            Role::Driver => "Driver",
            Role::Inspector => "Inspector",
        };
        write!(f, "{}", name)
    }
}

/// Result of restricting the shift control to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSelection {
    /// Shift ids the control may offer
    pub allowed: &'static [i64],
    /// Current selection, cleared when it falls outside `allowed`
    pub selected: Option<i64>,
}

/// Restrict the shift choices to the selected role.
///
/// Without a role every shift stays available and the selection is kept.
pub fn filter_shifts(role: Option<Role>, current: Option<i64>) -> ShiftSelection {
    let allowed = role.map(Role::allowed_shifts).unwrap_or(ALL_SHIFTS);
    let selected = current.filter(|shift| allowed.contains(shift));
    ShiftSelection { allowed, selected }
}

/// User as returned by the backend, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub paternal_last_name: String,
    pub maternal_last_name: String,
    /// Stored without dots or dash, e.g. `123456785`
    pub rut: String,
    /// Canonical 9-digit mobile number
    pub phone: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub shift_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_name: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl User {
    /// First name followed by both last names
    pub fn full_name(&self) -> String {
        [
            self.first_name.as_str(),
            self.paternal_last_name.as_str(),
            self.maternal_last_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Check if the admin screens must refuse to delete this user
    pub fn is_protected(&self) -> bool {
        self.id == PROTECTED_USER_ID
    }

    /// Check if the user belongs on the administration screens
    pub fn is_manageable(&self) -> bool {
        self.role.is_manageable()
    }

    /// Phone in `+56 9 XXXX XXXX` form
    pub fn display_phone(&self) -> String {
        phone::format_display(&self.phone)
    }
}

/// Parse the backend's `dd/mm/YYYY HH:MM` timestamp.
pub fn parse_created_at(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, CREATED_AT_FORMAT).ok()
}

/// Short summary returned by the server-side user search and by mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub full_name: Option<String>,
    pub rut: Option<String>,
    pub email: Option<String>,
    pub role_name: Option<String>,
    pub active: Option<bool>,
}

/// Aggregate counters shown above the user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub administrators: usize,
    pub active: usize,
}

impl UserStats {
    /// Count users by role and activity
    pub fn from_users(users: &[User]) -> Self {
        Self {
            total: users.len(),
            administrators: users.iter().filter(|u| u.role.is_admin()).count(),
            active: users.iter().filter(|u| u.active).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: i64, role: Role, active: bool) -> User {
        User {
            id,
            first_name: "Ana".to_string(),
            paternal_last_name: "Rojas".to_string(),
            maternal_last_name: "Soto".to_string(),
            rut: "123456785".to_string(),
            phone: "987654321".to_string(),
            email: "ana@muni.cl".to_string(),
            role,
            role_name: None,
            shift_id: None,
            shift_name: None,
            active,
            address: None,
            created_at: None,
        }
    }

    #[test]
    fn test_inspector_restricted_to_inspector_shifts() {
        let selection = filter_shifts(Some(Role::Inspector), Some(2));
        assert_eq!(selection.allowed, &[4, 5]);
        assert_eq!(selection.selected, None);

        let kept = filter_shifts(Some(Role::Inspector), Some(5));
        assert_eq!(kept.selected, Some(5));
    }

    #[test]
    fn test_other_roles_restricted_to_general_shifts() {
        for role in [Role::Administrator, Role::Operator, Role::Driver] {
            let selection = filter_shifts(Some(role), Some(4));
            assert_eq!(selection.allowed, &[1, 2, 3]);
            assert_eq!(selection.selected, None);
        }
        assert_eq!(filter_shifts(Some(Role::Driver), Some(3)).selected, Some(3));
    }

    #[test]
    fn test_no_role_keeps_every_shift() {
        let selection = filter_shifts(None, Some(4));
        assert_eq!(selection.allowed, ALL_SHIFTS);
        assert_eq!(selection.selected, Some(4));
    }

    #[test]
    fn test_role_round_trips_through_id() {
        for id in 1..=5 {
            let role = Role::try_from(id).unwrap();
            assert_eq!(i64::from(role), id);
        }
        assert!(Role::try_from(9).is_err());
    }

    #[test]
    fn test_citizen_is_not_manageable() {
        assert!(!Role::Citizen.is_manageable());
        assert!(!Role::MANAGEABLE.contains(&Role::Citizen));
    }

    #[test]
    fn test_role_from_backend_name() {
        assert_eq!(Role::from_name("Conductor"), Some(Role::Driver));
        assert_eq!(Role::from_name("administrador"), Some(Role::Administrator));
        assert_eq!(Role::from_name("Supervisor"), None);
    }

    #[test]
    fn test_full_name_and_protection() {
        let user = sample_user(1, Role::Administrator, true);
        assert_eq!(user.full_name(), "Ana Rojas Soto");
        assert!(user.is_protected());
        assert!(!sample_user(2, Role::Operator, true).is_protected());
    }

    #[test]
    fn test_parse_created_at() {
        let parsed = parse_created_at("05/03/2024 14:30").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-03-05 14:30");
        assert!(parse_created_at("").is_none());
        assert!(parse_created_at("2024-03-05").is_none());
    }

    #[test]
    fn test_user_stats() {
        let users = vec![
            sample_user(1, Role::Administrator, true),
            sample_user(2, Role::Operator, false),
            sample_user(3, Role::Administrator, true),
        ];
        let stats = UserStats::from_users(&users);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.administrators, 2);
        assert_eq!(stats.active, 2);
    }
}
