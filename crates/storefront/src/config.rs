//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QKART_BACKEND_URL` - Base URL of the QKart REST backend
//!   (e.g., `https://qkart-backend.example.com/api/v1`)
//!
//! ## Optional
//! - `QKART_SESSION_FILE` - Where the login session is persisted
//!   (default: `.qkart-session.json`)
//! - `QKART_SEARCH_DEBOUNCE_MS` - Search debounce quiet period (default: 500)
//! - `QKART_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default debounce quiet period for product search.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default session file path.
pub const DEFAULT_SESSION_FILE: &str = ".qkart-session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub backend: BackendConfig,
    /// Path of the persisted session file
    pub session_file: PathBuf,
    /// Quiet period before a search request is dispatched
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Backend REST API configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, always ending in `/` so endpoint paths join beneath it
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let session_file = PathBuf::from(get_env_or_default(
            "QKART_SESSION_FILE",
            DEFAULT_SESSION_FILE,
        ));
        let search_debounce = match get_optional_env("QKART_SEARCH_DEBOUNCE_MS") {
            Some(value) => Duration::from_millis(parse_env("QKART_SEARCH_DEBOUNCE_MS", &value)?),
            None => DEFAULT_SEARCH_DEBOUNCE,
        };

        Ok(Self {
            backend,
            session_file,
            search_debounce,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl BackendConfig {
    /// Create a backend configuration for the given base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("QKART_BACKEND_URL", base_url)?,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("QKART_BACKEND_URL")?;
        let request_timeout = match get_optional_env("QKART_REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_env("QKART_REQUEST_TIMEOUT_SECS", &value)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            base_url: parse_base_url("QKART_BACKEND_URL", &raw_url)?,
            request_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric environment value.
fn parse_env(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and normalize the backend base URL.
///
/// A trailing slash is appended so `Url::join("products")` resolves beneath
/// the base path instead of replacing its last segment.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
