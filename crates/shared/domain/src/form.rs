//! User form validation.
//!
//! Two separate concerns live here: the submit-time gate, which aggregates
//! every failed rule into one message list, and the per-field status used
//! for inline feedback while the user types.

use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::constants::{
    COLOR_INVALID, COLOR_NEUTRAL, COLOR_VALID, MIN_CREATE_PASSWORD_STRENGTH, MIN_PASSWORD_LENGTH,
};
use crate::error::{DomainError, DomainResult};
use crate::password::{Password, PasswordMatch, PasswordStrength};
use crate::user::{Role, User};
use crate::{email, phone, rut};

/// Order in which field messages are reported
const FIELD_ORDER: &[&str] = &[
    "first_name",
    "paternal_last_name",
    "maternal_last_name",
    "rut",
    "phone",
    "email",
    "role",
];

// =============================================================================
// Field status
// =============================================================================

/// Inline feedback state of one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldStatus {
    /// Nothing typed yet
    Neutral,
    Invalid,
    Valid,
}

impl FieldStatus {
    fn from_check(input: &str, valid: bool) -> Self {
        if input.trim().is_empty() {
            FieldStatus::Neutral
        } else if valid {
            FieldStatus::Valid
        } else {
            FieldStatus::Invalid
        }
    }

    /// Border color for the input
    pub fn color(self) -> &'static str {
        match self {
            FieldStatus::Neutral => COLOR_NEUTRAL,
            FieldStatus::Invalid => COLOR_INVALID,
            FieldStatus::Valid => COLOR_VALID,
        }
    }
}

pub fn rut_status(input: &str) -> FieldStatus {
    FieldStatus::from_check(input, rut::is_valid(input))
}

pub fn phone_status(input: &str) -> FieldStatus {
    FieldStatus::from_check(input, phone::is_valid(input))
}

pub fn email_status(input: &str) -> FieldStatus {
    FieldStatus::from_check(input, email::is_valid(input))
}

/// Status of the password input; only the length rule turns it red.
pub fn password_status(input: &str) -> FieldStatus {
    FieldStatus::from_check(input, input.chars().count() >= MIN_PASSWORD_LENGTH)
}

pub fn confirmation_status(password: &str, confirmation: &str) -> FieldStatus {
    match PasswordMatch::check(password, confirmation) {
        PasswordMatch::Empty => FieldStatus::Neutral,
        PasswordMatch::Matches => FieldStatus::Valid,
        PasswordMatch::Mismatch => FieldStatus::Invalid,
    }
}

// =============================================================================
// Submit-time validation
// =============================================================================

/// Whether the form creates a user or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// Raw values of the user form, as typed.
#[derive(Debug, Clone, Default, Validate)]
pub struct UserForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Paternal last name is required"))]
    pub paternal_last_name: String,
    #[validate(length(min = 1, message = "Maternal last name is required"))]
    pub maternal_last_name: String,
    #[validate(custom(function = "validate_rut"))]
    pub rut: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[validate(required(message = "A role must be selected"))]
    pub role: Option<Role>,
    pub shift_id: Option<i64>,
    pub active: bool,
    pub address: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

/// Form values that passed validation, normalized for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidUser {
    pub first_name: String,
    pub paternal_last_name: String,
    pub maternal_last_name: String,
    /// Body and check character, no separators
    pub rut: String,
    /// Nine-digit mobile number
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub shift_id: Option<i64>,
    pub active: bool,
    pub address: Option<String>,
    /// `None` on update when the password is left unchanged
    pub password: Option<Password>,
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_rut(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(failure("required", "RUT is required"))
    } else if rut::is_valid(value) {
        Ok(())
    } else {
        Err(failure("rut", "The RUT entered is not valid"))
    }
}

fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(failure("required", "Phone is required"))
    } else if phone::is_valid(value) {
        Ok(())
    } else {
        Err(failure("phone", "The phone must use the Chilean format: 9 1234 5678"))
    }
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(failure("required", "Email is required"))
    } else if email::is_valid(value) {
        Ok(())
    } else {
        Err(failure("email", "The email format is not valid"))
    }
}

impl UserForm {
    /// Prefill the edit form from an existing user. Passwords start empty.
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            paternal_last_name: user.paternal_last_name.clone(),
            maternal_last_name: user.maternal_last_name.clone(),
            rut: rut::format(&user.rut),
            phone: phone::format_display(&user.phone),
            email: user.email.clone(),
            role: Some(user.role),
            shift_id: user.shift_id,
            active: user.active,
            address: user.address.clone(),
            password: String::new(),
            password_confirmation: String::new(),
        }
    }

    fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            paternal_last_name: self.paternal_last_name.trim().to_string(),
            maternal_last_name: self.maternal_last_name.trim().to_string(),
            rut: self.rut.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self
                .address
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            ..self.clone()
        }
    }

    /// Every failed rule, in form order. Empty when the form may be submitted.
    pub fn errors(&self, mode: FormMode) -> Vec<String> {
        let form = self.trimmed();
        let mut messages = Vec::new();

        if let Err(errors) = form.validate() {
            let by_field = errors.field_errors();
            for field in FIELD_ORDER {
                if let Some(list) = by_field.get(*field) {
                    messages.extend(list.iter().map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field))
                    }));
                }
            }
        }

        if let Some(role) = form.role {
            if !role.is_manageable() {
                messages.push(format!("The {} role cannot be managed here", role));
            } else if let Some(shift) = form.shift_id {
                if !role.allowed_shifts().contains(&shift) {
                    messages.push(format!("Shift {} is not available for the {} role", shift, role));
                }
            }
        }

        messages.extend(form.password_errors(mode));
        messages
    }

    fn password_errors(&self, mode: FormMode) -> Vec<String> {
        let mut messages = Vec::new();
        let password = self.password.as_str();
        let confirmation = self.password_confirmation.as_str();
        let too_short = password.chars().count() < MIN_PASSWORD_LENGTH;

        match mode {
            FormMode::Create => {
                if password != confirmation {
                    messages.push("Passwords do not match".to_string());
                }
                if !password.is_empty()
                    && PasswordStrength::evaluate(password).percent() < MIN_CREATE_PASSWORD_STRENGTH
                {
                    messages.push(
                        "The password is too weak. Use uppercase letters, digits and symbols"
                            .to_string(),
                    );
                }
                if too_short {
                    messages.push(format!(
                        "The password must be at least {} characters long",
                        MIN_PASSWORD_LENGTH
                    ));
                }
            }
            FormMode::Update => {
                if !password.is_empty() || !confirmation.is_empty() {
                    if password != confirmation {
                        messages.push("The new passwords do not match".to_string());
                    }
                    if !password.is_empty() && too_short {
                        messages.push(format!(
                            "The new password must be at least {} characters long",
                            MIN_PASSWORD_LENGTH
                        ));
                    }
                }
            }
        }
        messages
    }

    /// Gate a submission: either the normalized values or every failed rule.
    pub fn validate_for(&self, mode: FormMode) -> DomainResult<ValidUser> {
        let messages = self.errors(mode);
        if !messages.is_empty() {
            return Err(DomainError::Validation(messages));
        }

        let form = self.trimmed();
        let role = form
            .role
            .ok_or_else(|| DomainError::validation("A role must be selected"))?;
        let password = (!form.password.is_empty()).then(|| Password::new(form.password.clone()));

        Ok(ValidUser {
            rut: rut::normalize(&form.rut)?,
            phone: phone::normalize(&form.phone)?,
            first_name: form.first_name,
            paternal_last_name: form.paternal_last_name,
            maternal_last_name: form.maternal_last_name,
            email: form.email,
            role,
            shift_id: form.shift_id,
            active: form.active,
            address: form.address,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> UserForm {
        UserForm {
            first_name: "Ana".to_string(),
            paternal_last_name: "Rojas".to_string(),
            maternal_last_name: "Soto".to_string(),
            rut: "12.345.678-5".to_string(),
            phone: "9 8765 4321".to_string(),
            email: "ana@muni.cl".to_string(),
            role: Some(Role::Inspector),
            shift_id: Some(4),
            active: true,
            address: Some("  ".to_string()),
            password: "Segura1!".to_string(),
            password_confirmation: "Segura1!".to_string(),
        }
    }

    #[test]
    fn test_valid_create_is_normalized() {
        let valid = filled_form().validate_for(FormMode::Create).unwrap();
        assert_eq!(valid.rut, "123456785");
        assert_eq!(valid.phone, "987654321");
        assert_eq!(valid.role, Role::Inspector);
        assert_eq!(valid.address, None);
        assert_eq!(valid.password.unwrap().as_str(), "Segura1!");
    }

    #[test]
    fn test_errors_are_aggregated_in_form_order() {
        let form = UserForm {
            first_name: "  ".to_string(),
            rut: "12.345.678-4".to_string(),
            email: "ana@".to_string(),
            ..filled_form()
        };
        let errors = form.errors(FormMode::Create);
        assert_eq!(
            errors,
            vec![
                "First name is required".to_string(),
                "The RUT entered is not valid".to_string(),
                "The email format is not valid".to_string(),
            ]
        );
        match form.validate_for(FormMode::Create) {
            Err(DomainError::Validation(messages)) => assert_eq!(messages.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_requires_strong_enough_password() {
        let weak = UserForm {
            password: "abcdefgh".to_string(),
            password_confirmation: "abcdefgh".to_string(),
            ..filled_form()
        };
        let errors = weak.errors(FormMode::Create);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("too weak"));

        let empty = UserForm {
            password: String::new(),
            password_confirmation: String::new(),
            ..filled_form()
        };
        assert!(empty.errors(FormMode::Create)[0].contains("at least 8"));
    }

    #[test]
    fn test_update_password_is_optional() {
        let form = UserForm {
            password: String::new(),
            password_confirmation: String::new(),
            ..filled_form()
        };
        let valid = form.validate_for(FormMode::Update).unwrap();
        assert!(valid.password.is_none());
    }

    #[test]
    fn test_update_password_rules_apply_when_either_field_is_set() {
        let only_confirmation = UserForm {
            password: String::new(),
            password_confirmation: "abc".to_string(),
            ..filled_form()
        };
        assert_eq!(
            only_confirmation.errors(FormMode::Update),
            vec!["The new passwords do not match".to_string()]
        );

        let short = UserForm {
            password: "abc".to_string(),
            password_confirmation: "abc".to_string(),
            ..filled_form()
        };
        assert_eq!(short.errors(FormMode::Update).len(), 1);

        // Weak but long enough passes on update
        let weak = UserForm {
            password: "abcdefgh".to_string(),
            password_confirmation: "abcdefgh".to_string(),
            ..filled_form()
        };
        assert!(weak.errors(FormMode::Update).is_empty());
    }

    #[test]
    fn test_role_and_shift_rules() {
        let missing_role = UserForm {
            role: None,
            ..filled_form()
        };
        assert_eq!(missing_role.errors(FormMode::Update), vec!["A role must be selected"]);

        let wrong_shift = UserForm {
            role: Some(Role::Driver),
            shift_id: Some(5),
            ..filled_form()
        };
        assert!(wrong_shift.errors(FormMode::Update)[0].contains("Shift 5"));

        let citizen = UserForm {
            role: Some(Role::Citizen),
            shift_id: None,
            ..filled_form()
        };
        assert_eq!(citizen.errors(FormMode::Update).len(), 1);
    }

    #[test]
    fn test_field_status() {
        assert_eq!(rut_status(""), FieldStatus::Neutral);
        assert_eq!(rut_status("12345678-5"), FieldStatus::Valid);
        assert_eq!(rut_status("12345678-6").color(), COLOR_INVALID);
        assert_eq!(phone_status("+56 9 8765 4321"), FieldStatus::Valid);
        assert_eq!(email_status("nope"), FieldStatus::Invalid);
        assert_eq!(password_status("short"), FieldStatus::Invalid);
        assert_eq!(confirmation_status("Segura1!", ""), FieldStatus::Neutral);
        assert_eq!(confirmation_status("Segura1!", "Segura1!"), FieldStatus::Valid);
    }

    #[test]
    fn test_prefill_from_user() {
        let user = User {
            id: 4,
            first_name: "Luis".to_string(),
            paternal_last_name: "Pérez".to_string(),
            maternal_last_name: "Díaz".to_string(),
            rut: "123456785".to_string(),
            phone: "987654321".to_string(),
            email: "luis@muni.cl".to_string(),
            role: Role::Operator,
            role_name: None,
            shift_id: Some(2),
            shift_name: None,
            active: true,
            address: None,
            created_at: None,
        };
        let form = UserForm::from_user(&user);
        assert_eq!(form.rut, "12.345.678-5");
        assert_eq!(form.phone, "+56 9 8765 4321");
        assert!(form.validate_for(FormMode::Update).is_ok());
    }
}
