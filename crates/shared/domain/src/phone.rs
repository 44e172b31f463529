//! Chilean mobile phone normalization and display.
//!
//! The stored form is nine digits starting with `9`. The international form
//! prefixes the `56` country code and the display form is `+56 9 XXXX XXXX`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::CHILE_COUNTRY_CODE;
use crate::error::{DomainError, DomainResult};

static MOBILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^9[0-9]{8}$").expect("mobile pattern compiles"));

/// Longest international number: country code plus nine digits
const MAX_INTERNATIONAL_DIGITS: usize = 11;

fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip formatting and a leading country code, without validating.
pub fn strip(input: &str) -> String {
    let digits = digits(input);
    match digits.strip_prefix(CHILE_COUNTRY_CODE) {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

/// Check a phone in any notation against the nine-digit mobile pattern.
pub fn is_valid(input: &str) -> bool {
    MOBILE_PATTERN.is_match(&strip(input))
}

/// Validate and return the stored nine-digit form.
pub fn normalize(input: &str) -> DomainResult<String> {
    let stripped = strip(input);
    if MOBILE_PATTERN.is_match(&stripped) {
        Ok(stripped)
    } else {
        Err(DomainError::validation(
            "The phone must use the Chilean format: 9 1234 5678",
        ))
    }
}

/// Digits with the country code prepended, capped at eleven digits.
///
/// A value that does not look like a complete mobile number is only stripped
/// of non-digits.
pub fn to_international(input: &str) -> String {
    let mut digits = digits(input);
    if digits.starts_with('9') && digits.len() >= 9 {
        digits.insert_str(0, CHILE_COUNTRY_CODE);
    }
    digits.truncate(MAX_INTERNATIONAL_DIGITS);
    digits
}

/// Render a phone as `+56 9 XXXX XXXX`.
///
/// Partial numbers are rendered progressively. The result is a fixed point:
/// formatting an already formatted value returns it unchanged.
pub fn format_display(input: &str) -> String {
    let international = to_international(input);
    let Some(local) = international.strip_prefix(CHILE_COUNTRY_CODE) else {
        return international;
    };

    let mut out = format!("+{}", CHILE_COUNTRY_CODE);
    let groups = [(0, 1), (1, 5), (5, 9)];
    for (start, end) in groups {
        if local.len() <= start {
            break;
        }
        out.push(' ');
        out.push_str(&local[start..end.min(local.len())]);
    }
    out
}
