//! CSRF token sourcing.
//!
//! Mutating requests must carry `X-CSRFToken`. The token comes either from an
//! explicit form-field value (`csrfmiddlewaretoken`) or from the `csrftoken`
//! cookie of an established session.

use percent_encoding::percent_decode_str;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Read a cookie from a `Cookie` header string (`a=1; csrftoken=xyz`).
///
/// The value is percent-decoded. Returns `None` when absent or empty.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode(value))
        .filter(|value| !value.is_empty())
}

/// Pick the token to send: the explicit form value wins over the cookie.
pub fn resolve_token(form_token: Option<&str>, cookie_header: Option<&str>) -> Option<String> {
    form_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .or_else(|| cookie_header.and_then(|h| cookie_value(h, CSRF_COOKIE_NAME)))
}

fn percent_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
