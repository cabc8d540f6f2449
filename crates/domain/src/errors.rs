//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the civic client
///
/// The network-facing variants mirror the transport taxonomy produced by the
/// API client so the store and UI can branch on the failure kind without
/// knowing anything about HTTP.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum CivicError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The server answered 2xx but the envelope carried `success: false`.
    #[error("Operation rejected: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CivicError {
    /// HTTP status carried by the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the server refused the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Client { status: 401, .. })
    }

    /// `true` for failures where the request may never have reached the
    /// server (no connection, deadline exceeded).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_) | Self::Timeout(_))
    }

    /// Message suitable for showing to the person using the app.
    ///
    /// Client errors and envelope rejections pass the server text through
    /// unchanged so field-level validation feedback survives.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnavailable(_) | Self::Timeout(_) => {
                "Unable to reach the server. Please check your connection and try again."
                    .to_string()
            }
            Self::Server { .. } => {
                "The server is having trouble right now. Please try again later.".to_string()
            }
            Self::Client { message, .. } | Self::Rejected(message) => message.clone(),
            Self::MalformedResponse(_) => {
                "Received an unexpected response from the server.".to_string()
            }
            Self::Config(_) | Self::Storage(_) | Self::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for civic client operations
pub type Result<T> = std::result::Result<T, CivicError>;
