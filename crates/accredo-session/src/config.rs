use std::env;
use std::time::Duration;

use accredo_core::endpoints;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_AUTH_PREFIX: &str = "/auth";
pub const DEFAULT_USERS_PREFIX: &str = "/users";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_URL_ENV: &str = "ACCREDO_API_URL";
pub const SERVER_API_URL_ENV: &str = "ACCREDO_SERVER_API_URL";
pub const AUTH_PREFIX_ENV: &str = "ACCREDO_AUTH_PREFIX";
pub const USERS_PREFIX_ENV: &str = "ACCREDO_USERS_PREFIX";
pub const TIMEOUT_ENV: &str = "ACCREDO_HTTP_TIMEOUT_SECS";

/// Where the backend lives and how its auth/user routes are prefixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Server-side address of the same backend, preferred when set.
    pub server_base_url: Option<String>,
    pub auth_prefix: String,
    pub users_prefix: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            server_base_url: None,
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            users_prefix: DEFAULT_USERS_PREFIX.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = non_empty_env(API_URL_ENV) {
            if is_http_url(&value) {
                self.base_url = value;
            } else {
                warn!(event = "config_invalid", field = API_URL_ENV, value = %value);
            }
        }
        if let Some(value) = non_empty_env(SERVER_API_URL_ENV) {
            if is_http_url(&value) {
                self.server_base_url = Some(value);
            } else {
                warn!(event = "config_invalid", field = SERVER_API_URL_ENV, value = %value);
            }
        }
        if let Some(value) = non_empty_env(AUTH_PREFIX_ENV) {
            self.auth_prefix = value;
        }
        if let Some(value) = non_empty_env(USERS_PREFIX_ENV) {
            self.users_prefix = value;
        }
        if let Some(value) = non_empty_env(TIMEOUT_ENV) {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout = Duration::from_secs(secs),
                _ => warn!(event = "config_invalid", field = TIMEOUT_ENV, value = %value),
            }
        }
    }

    pub fn effective_base_url(&self) -> &str {
        self.server_base_url
            .as_deref()
            .unwrap_or(&self.base_url)
            .trim_end_matches('/')
    }

    /// Joins a path onto the base url. Absolute urls are passed through.
    pub fn url(&self, path: &str) -> String {
        if is_http_url(path) {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.effective_base_url(),
            path.trim_start_matches('/')
        )
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        self.url(&join_prefix(&self.auth_prefix, endpoint))
    }

    pub fn users_url(&self, endpoint: &str) -> String {
        self.url(&join_prefix(&self.users_prefix, endpoint))
    }

    pub fn login_url(&self) -> String {
        self.auth_url(endpoints::JWT_CREATE)
    }

    pub fn refresh_url(&self) -> String {
        self.auth_url(endpoints::JWT_REFRESH)
    }

    pub fn me_url(&self) -> String {
        self.users_url(endpoints::USERS_ME)
    }

    pub fn build_http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }
}

fn join_prefix(prefix: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
