//! Admin panel configuration.

use std::env;
use std::time::Duration;

use common::HttpClientConfig;

/// Admin panel configuration.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Backend connection
    pub api: HttpClientConfig,
    /// Quiet period before a search runs, in milliseconds
    pub search_debounce_ms: u64,
    /// Delay before a requested full reload, in milliseconds
    pub reload_delay_ms: u64,
}

impl PanelConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: HttpClientConfig {
                base_url: env::var("API_BASE_URL").unwrap_or(defaults.api.base_url),
                session_cookie: env::var("API_SESSION_COOKIE").ok(),
                csrf_cookie: env::var("API_CSRF_COOKIE").ok(),
                csrf_token: env::var("API_CSRF_TOKEN").ok(),
                request_timeout_ms: env::var("API_TIMEOUT_MS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(defaults.api.request_timeout_ms),
            },
            search_debounce_ms: env::var("SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
            reload_delay_ms: env::var("RELOAD_DELAY_MS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(defaults.reload_delay_ms),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            api: HttpClientConfig::default(),
            search_debounce_ms: 300,
            reload_delay_ms: 2000,
        }
    }
}
