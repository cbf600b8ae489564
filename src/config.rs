//! Endpoint table and tunables, parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CHECK_THROTTLE_MS: u64 = 1000;

/// Errors building configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The backend base URL environment variable is not set.
    #[error("missing base URL: env var {var} not set")]
    MissingBaseUrl { var: String },
}

// =============================================================================
// ENDPOINT TABLE
// =============================================================================

/// Absolute URLs for every backend operation, derived from one base URL.
///
/// Handlers append entity suffixes (`/active/{token}`, `/{type}`, `/users`)
/// to these; the table itself never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub login: String,
    pub signup: String,
    pub user: String,
    pub check_name: String,
    pub check_name_unique: String,
    pub changepwd: String,
    pub projects_check_name: String,
}

impl ApiPaths {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            login: format!("{base}/login"),
            signup: format!("{base}/signup"),
            user: format!("{base}/user"),
            check_name: format!("{base}/checkName"),
            check_name_unique: format!("{base}/checkNameUnique"),
            changepwd: format!("{base}/changepwd"),
            projects_check_name: format!("{base}/projectsCheckName"),
        }
    }
}

// =============================================================================
// API CONFIG
// =============================================================================

/// HTTP client timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Configuration for the HTTP API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub paths: ApiPaths,
    pub timeouts: HttpTimeouts,
}

impl ApiConfig {
    /// Build a config with default timeouts around a base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            paths: ApiPaths::new(base_url),
            timeouts: HttpTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }

    /// Build typed API config from environment variables.
    ///
    /// Required:
    /// - `AUTH_API_BASE_URL`
    ///
    /// Optional:
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: default 10
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("AUTH_API_BASE_URL")
            .map_err(|_| ConfigError::MissingBaseUrl { var: "AUTH_API_BASE_URL".into() })?;

        Ok(Self {
            paths: ApiPaths::new(&base_url),
            timeouts: HttpTimeouts {
                request_secs: env_parse("AUTH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("AUTH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
        })
    }
}

// =============================================================================
// DISPATCH CONFIG
// =============================================================================

/// Tuning for the dispatch runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Window during which repeated name-check intents are dropped.
    pub check_throttle: Duration,
}

impl DispatchConfig {
    #[must_use]
    pub fn new(check_throttle: Duration) -> Self {
        Self { check_throttle }
    }

    /// Read `AUTH_CHECK_THROTTLE_MS` (default 1000). Never fails.
    #[must_use]
    pub fn from_env() -> Self {
        Self { check_throttle: Duration::from_millis(env_parse("AUTH_CHECK_THROTTLE_MS", DEFAULT_CHECK_THROTTLE_MS)) }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { check_throttle: Duration::from_millis(DEFAULT_CHECK_THROTTLE_MS) }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
