//! Configuration loader
//!
//! Loads the API client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `CIVIC_ENV` is set, start from that environment's defaults and
//!    apply any `CIVIC_API_*` overrides
//! 2. Otherwise fall back to a config file. An invalid `CIVIC_*` value is an
//!    error whenever `CIVIC_ENV` is set, never a silent switch to the file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CIVIC_ENV`: `development`, `staging` or `production` (required for env loading)
//! - `CIVIC_API_BASE_URL`: Base URL including the `/api` prefix
//! - `CIVIC_API_TIMEOUT_MS`: Per-attempt timeout in milliseconds
//! - `CIVIC_API_RETRY_ATTEMPTS`: Total attempts for retryable failures (1-5)
//! - `CIVIC_API_RETRY_BACKOFF_MS`: Backoff unit in milliseconds
//! - `CIVIC_SERVICE_NAME`: Keychain service name for the persisted session
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./civic.toml`, `./civic.json`, `./config.toml`, `./config.json`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use civic_domain::{CivicError, ClientConfig, Environment, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["civic.toml", "civic.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CivicError::Config` if:
/// - `CIVIC_ENV` is set and any environment value is invalid
/// - `CIVIC_ENV` is unset and no config file can be loaded
/// - File format is invalid
/// - Values fail validation
pub fn load() -> Result<ClientConfig> {
    if optional_env("CIVIC_ENV").is_none() {
        tracing::debug!("CIVIC_ENV not set, loading configuration file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!(environment = %config.environment, "Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// `CIVIC_ENV` selects the baseline; the remaining variables are optional
/// overrides.
///
/// # Errors
/// Returns `CivicError::Config` if `CIVIC_ENV` is missing or any value is
/// invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    let environment = Environment::from_str(&env_var("CIVIC_ENV")?).map_err(CivicError::Config)?;
    let mut config = ClientConfig::for_environment(environment);

    if let Some(base_url) = optional_env("CIVIC_API_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(timeout) = optional_env("CIVIC_API_TIMEOUT_MS") {
        config.timeout_ms = parse_number(&timeout, "timeout")?;
    }
    if let Some(attempts) = optional_env("CIVIC_API_RETRY_ATTEMPTS") {
        config.retry_attempts = parse_number(&attempts, "retry attempts")?;
    }
    if let Some(backoff) = optional_env("CIVIC_API_RETRY_BACKOFF_MS") {
        config.retry_backoff_ms = parse_number(&backoff, "retry backoff")?;
    }
    if let Some(service) = optional_env("CIVIC_SERVICE_NAME") {
        config.service_name = service;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CivicError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CivicError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CivicError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CivicError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CivicError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CivicError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CivicError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| CivicError::Config(format!("Missing required environment variable: {key}")))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_number<T: FromStr>(raw: &str, what: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| CivicError::Config(format!("Invalid {what} '{raw}': {e}")))
}
