//! Email shape check (`local@domain.tld`, not full RFC 5322).

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Check an email address after trimming surrounding whitespace.
pub fn is_valid(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input.trim())
}
