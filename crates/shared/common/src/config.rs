//! Shared configuration structures.

use std::time::Duration;

/// Backend HTTP connection configuration.
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Established `sessionid` cookie value
    pub session_cookie: Option<String>,
    /// Raw cookie header to read `csrftoken` from
    pub csrf_cookie: Option<String>,
    /// Explicit CSRF token (form-field value), wins over the cookie
    pub csrf_token: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            session_cookie: None,
            csrf_cookie: None,
            csrf_token: None,
            request_timeout_ms: 30000,
        }
    }
}

// Session and CSRF values are credentials
impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("session_cookie", &redact(&self.session_cookie))
            .field("csrf_cookie", &redact(&self.csrf_cookie))
            .field("csrf_token", &redact(&self.csrf_token))
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}
