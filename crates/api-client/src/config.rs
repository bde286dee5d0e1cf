//! Configuration for the EcoRoute API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use ecoroute_core::config::ApiConfig;
use ecoroute_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default production API URL
const DEFAULT_API_URL: &str = "https://edsondoes.pythonanywhere.com/api";

/// Local backend as seen from an Android emulator or a dev machine
const DEVELOPMENT_API_URL: &str = "http://localhost:8000/api";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development backend
    Development,
    /// Production backend
    #[default]
    Production,
}

impl Environment {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match env::var("ECOROUTE_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "development" | "dev" | "local" => Self::Development,
            _ => Self::Production,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend API (e.g. `https://host/api`)
    pub base_url: String,
    /// Request timeout
    #[serde(with = "secs_serde")]
    pub timeout: Duration,
    /// Retry policy for best-effort calls such as stats sync
    pub retry: RetryConfig,
    /// Current environment
    pub environment: Environment,
}

mod secs_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            retry: RetryConfig::default(),
            environment: Environment::default(),
        }
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self::default()
            .with_base_url(api.base_url.clone())
            .with_timeout(Duration::from_secs(api.timeout_secs))
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `ECOROUTE_API_URL`: Base URL of the backend API
    /// - `ECOROUTE_ENV`: Environment (development/production)
    /// - `ECOROUTE_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url = env::var("ECOROUTE_API_URL").unwrap_or_else(|_| match environment {
            Environment::Development => DEVELOPMENT_API_URL.to_string(),
            Environment::Production => DEFAULT_API_URL.to_string(),
        });

        let timeout = match env::var("ECOROUTE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ApiError::config(format!("ECOROUTE_TIMEOUT_SECS is not a number: {raw}")))?,
            Err(_) => Duration::from_secs(15),
        };

        let retry = match environment {
            Environment::Development => RetryConfig::quick(),
            Environment::Production => RetryConfig::patient(),
        };

        Ok(Self {
            base_url,
            timeout,
            retry,
            environment,
        })
    }

    /// Create development configuration (local backend)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEVELOPMENT_API_URL.to_string(),
            timeout: Duration::from_secs(5),
            retry: RetryConfig::quick(),
            environment: Environment::Development,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::InvalidUrl(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
