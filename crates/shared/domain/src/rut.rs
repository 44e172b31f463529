//! Chilean national id (RUT) checksum and formatting.

use crate::error::{DomainError, DomainResult};

/// Keep only digits and the `K` check character, uppercased.
pub fn clean(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Compute the check character for a numeric RUT body.
///
/// Returns `None` when the body is empty or contains anything but digits.
pub fn compute_check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = body
        .bytes()
        .rev()
        .zip((2..=7).cycle())
        .map(|(b, factor)| u32::from(b - b'0') * factor)
        .sum();

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Check a RUT in any common notation (`12.345.678-5`, `12345678-5`, `123456785`).
pub fn is_valid(input: &str) -> bool {
    let cleaned = clean(input);
    if cleaned.len() < 2 {
        return false;
    }
    let (body, check) = cleaned.split_at(cleaned.len() - 1);
    match compute_check_digit(body) {
        Some(expected) => check.starts_with(expected),
        None => false,
    }
}

/// Validate and return the RUT in its stored form (body + check char, no separators).
pub fn normalize(input: &str) -> DomainResult<String> {
    if is_valid(input) {
        Ok(clean(input))
    } else {
        Err(DomainError::validation("The RUT entered is not valid"))
    }
}

/// Render a RUT as `12.345.678-5`.
///
/// Inputs shorter than two significant characters are returned cleaned but
/// otherwise untouched.
pub fn format(input: &str) -> String {
    let cleaned = clean(input);
    if cleaned.len() < 2 {
        return cleaned;
    }
    let (body, check) = cleaned.split_at(cleaned.len() - 1);

    let mut grouped = String::with_capacity(body.len() + body.len() / 3);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}-{}", grouped, check)
}
