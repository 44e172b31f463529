//! Check command - offline field validation.
//!
//! Runs the same rules the forms apply, without contacting the backend.

use serde::Serialize;

use common::{AppError, AppResult};
use domain::{
    email, phone, rut, FieldStatus, PasswordStrength, MIN_CREATE_PASSWORD_STRENGTH,
    MIN_PASSWORD_LENGTH,
};

use super::Output;
use crate::cli::args::{CheckAction, CheckArgs};

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strength: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percent: Option<u8>,
    color: &'static str,
}

/// Execute the check command
pub async fn execute(args: CheckArgs, output: Output) -> AppResult<()> {
    let report = match args.action {
        CheckAction::Rut { value } => check_rut(&value),
        CheckAction::Phone { value } => check_phone(&value),
        CheckAction::Password { value } => check_password(&value),
        CheckAction::Email { value } => check_email(&value),
    };

    output.emit(&report, || {
        println!("Valid:     {}", if report.valid { "yes" } else { "no" });
        if let Some(formatted) = &report.formatted {
            println!("Formatted: {}", formatted);
        }
        if let Some(stored) = &report.stored {
            println!("Stored as: {}", stored);
        }
        if let (Some(strength), Some(percent)) = (&report.strength, report.percent) {
            println!("Strength:  {} ({}%)", strength, percent);
        }
        println!("Color:     {}", report.color);
    })?;

    if report.valid {
        Ok(())
    } else {
        Err(AppError::validation("The value did not pass validation"))
    }
}

fn status_report(valid: bool, status: FieldStatus) -> CheckReport {
    CheckReport {
        valid,
        formatted: None,
        stored: None,
        strength: None,
        percent: None,
        color: status.color(),
    }
}

fn check_rut(value: &str) -> CheckReport {
    let valid = rut::is_valid(value);
    CheckReport {
        formatted: Some(rut::format(value)),
        stored: valid.then(|| rut::clean(value)),
        ..status_report(valid, domain::form::rut_status(value))
    }
}

fn check_phone(value: &str) -> CheckReport {
    let stored = phone::normalize(value).ok();
    let valid = stored.is_some();
    CheckReport {
        formatted: Some(phone::format_display(value)),
        stored,
        ..status_report(valid, domain::form::phone_status(value))
    }
}

fn check_password(value: &str) -> CheckReport {
    let strength = PasswordStrength::evaluate(value);
    // Same bar as account creation
    let valid = value.chars().count() >= MIN_PASSWORD_LENGTH
        && strength.percent() >= MIN_CREATE_PASSWORD_STRENGTH;
    CheckReport {
        strength: Some(strength.label().to_string()),
        percent: Some(strength.percent()),
        color: strength.color(),
        ..status_report(valid, domain::form::password_status(value))
    }
}

fn check_email(value: &str) -> CheckReport {
    let valid = email::is_valid(value);
    status_report(valid, domain::form::email_status(value))
}
