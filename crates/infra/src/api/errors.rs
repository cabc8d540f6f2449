//! API-specific error types
//!
//! Provides error classification for API operations with retry metadata.

use civic_domain::CivicError;
use thiserror::Error;

use crate::http::TransportError;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Connection failures and timeouts - retryable
    Network,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx, including auth) - non-retryable
    Client,
    /// Response did not match the expected schema - non-retryable
    Protocol,
    /// Configuration errors - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Network unavailable after {attempts} attempt(s): {message}")]
    NetworkUnavailable { message: String, attempts: u32 },

    #[error("Request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Server error {status} after {attempts} attempt(s): {message}")]
    Server { status: u16, message: String, attempts: u32 },

    #[error("Client error {status}: {message}")]
    Client { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::NetworkUnavailable { .. } | Self::Timeout { .. } => ApiErrorCategory::Network,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::MalformedResponse(_) => ApiErrorCategory::Protocol,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Check if this kind of failure is one the transport retries
    pub const fn should_retry(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }

    /// HTTP status, when a response was received
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Number of attempts made before giving up, when retry applied
    pub const fn attempts(&self) -> Option<u32> {
        match self {
            Self::NetworkUnavailable { attempts, .. }
            | Self::Timeout { attempts }
            | Self::Server { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        CivicError::from(self.clone()).user_message()
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { attempts } => Self::Timeout { attempts },
            TransportError::Network { message, attempts } => {
                Self::NetworkUnavailable { message, attempts }
            }
            TransportError::Request(message) => Self::Config(message),
        }
    }
}

impl From<ApiError> for CivicError {
    fn from(err: ApiError) -> Self {
        let description = err.to_string();
        match err {
            ApiError::NetworkUnavailable { .. } => Self::NetworkUnavailable(description),
            ApiError::Timeout { .. } => Self::Timeout(description),
            ApiError::Server { status, message, .. } => Self::Server { status, message },
            ApiError::Client { status, message } => Self::Client { status, message },
            ApiError::MalformedResponse(message) => Self::MalformedResponse(message),
            ApiError::Config(message) => Self::Config(message),
        }
    }
}
