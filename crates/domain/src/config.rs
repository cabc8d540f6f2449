//! Client configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SERVICE_NAME, MAX_RETRY_ATTEMPTS};
use crate::{CivicError, Result};

/// Deployment environment the client talks to.
///
/// Each environment carries its own timeout and retry defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

crate::impl_wire_str_conversions!(Environment {
    Development => "development",
    Staging => "staging",
    Production => "production",
});

impl Environment {
    /// Per-call timeout used when the configuration does not override it.
    pub const fn default_timeout_ms(self) -> u64 {
        match self {
            Self::Development => 5_000,
            Self::Staging => 10_000,
            Self::Production => 15_000,
        }
    }

    /// Total attempts (initial try + retries) for retryable failures.
    pub const fn default_retry_attempts(self) -> u32 {
        match self {
            Self::Development => 1,
            Self::Staging => 2,
            Self::Production => 3,
        }
    }

    /// Base URL of the REST API for this environment.
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:5000/api",
            Self::Staging => "https://staging-api.civic.example.org/api",
            Self::Production => "https://api.civic.example.org/api",
        }
    }
}

/// Configuration for the API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Keychain service under which the session is persisted
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl ClientConfig {
    /// Defaults for the given environment.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            base_url: environment.default_base_url().to_string(),
            timeout_ms: environment.default_timeout_ms(),
            retry_attempts: environment.default_retry_attempts(),
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            service_name: default_service_name(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Check invariants the API client relies on.
    ///
    /// # Errors
    /// Returns `CivicError::Config` when the base URL is empty, the timeout
    /// is zero, or the attempt count is outside `1..=MAX_RETRY_ATTEMPTS`.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CivicError::Config("base_url must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(CivicError::Config("timeout_ms must be greater than zero".into()));
        }
        if self.retry_attempts == 0 || self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(CivicError::Config(format!(
                "retry_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}, got {}",
                self.retry_attempts
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}
