//! Tracing setup and structured operation logging

use std::time::Duration;

use civic_domain::CivicError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info,civic_infra=info,civic_core=info";

/// Install the global `tracing` subscriber
///
/// Honors `RUST_LOG`; emits JSON lines when `CIVIC_LOG_JSON` is set to a
/// truthy value. Calling it twice is harmless: the second install is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if json_logs_requested() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn json_logs_requested() -> bool {
    std::env::var("CIVIC_LOG_JSON")
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Log the outcome of an application operation with structured fields.
///
/// `operation` is a stable identifier such as `"issues::fetch_all"`; callers
/// must not forward sensitive values through it.
#[inline]
pub fn log_operation(operation: &str, elapsed: Duration, outcome: Result<(), &CivicError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(operation, duration_ms, "operation_success"),
        Err(error) => warn!(
            operation,
            duration_ms,
            error_type = error_label(error),
            error = %error,
            "operation_failure"
        ),
    }
}

/// Convert a `CivicError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &CivicError) -> &'static str {
    match error {
        CivicError::NetworkUnavailable(_) => "network",
        CivicError::Timeout(_) => "timeout",
        CivicError::Server { .. } => "server",
        CivicError::Client { .. } => "client",
        CivicError::MalformedResponse(_) => "malformed_response",
        CivicError::Rejected(_) => "rejected",
        CivicError::Config(_) => "config",
        CivicError::Storage(_) => "storage",
        CivicError::Internal(_) => "internal",
    }
}
