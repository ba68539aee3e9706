//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CRAVII_API_BASE_URL` - Backend API root (default: `https://cravii.ng/cravii/api/`)
//! - `CRAVII_STORE_PATH` - Local key-value store file (default: `cravii-store.json`)
//! - `CRAVII_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `CRAVII_RETRY_ATTEMPTS` - Attempts for checkout-critical reads (default: 4)
//! - `CRAVII_RETRY_BASE_DELAY_MS` - Delay before the first retry, doubled each time (default: 3000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::RetryPolicy;

/// Default backend API root.
pub const DEFAULT_API_BASE_URL: &str = "https://cravii.ng/cravii/api/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cravii client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API root; always ends with `/` so endpoint names join onto it
    pub api_base_url: Url,
    /// Path of the on-device key-value store
    pub store_path: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Retry policy for reads the checkout cannot proceed without
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: parse_base_url(DEFAULT_API_BASE_URL)
                .expect("default base URL is valid"),
            store_path: PathBuf::from("cravii-store.json"),
            http_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base_url = parse_base_url(&get("CRAVII_API_BASE_URL", DEFAULT_API_BASE_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CRAVII_API_BASE_URL".to_string(), e.to_string())
            })?;

        let store_path = PathBuf::from(get("CRAVII_STORE_PATH", "cravii-store.json"));

        let timeout_secs = parse_number::<u64>(
            "CRAVII_HTTP_TIMEOUT_SECS",
            &get("CRAVII_HTTP_TIMEOUT_SECS", "30"),
        )?;

        let max_attempts =
            parse_number::<u32>("CRAVII_RETRY_ATTEMPTS", &get("CRAVII_RETRY_ATTEMPTS", "4"))?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CRAVII_RETRY_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let base_delay_ms = parse_number::<u64>(
            "CRAVII_RETRY_BASE_DELAY_MS",
            &get("CRAVII_RETRY_BASE_DELAY_MS", "3000"),
        )?;

        Ok(Self {
            api_base_url,
            store_path,
            http_timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(base_delay_ms)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, forcing a trailing slash so `Url::join` appends rather
/// than replaces the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
