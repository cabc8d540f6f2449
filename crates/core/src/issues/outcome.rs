//! Result shapes returned to the UI by store operations

use civic_domain::CivicError;
use serde::Serialize;

/// `{success, data?, message}` result of a store mutation
///
/// A rejected mutation never touched local state; `error` keeps the typed
/// cause so callers can react to, e.g., an expired session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CivicError>,
}

impl<T> MutationResult<T> {
    pub fn applied(data: Option<T>, message: impl Into<String>) -> Self {
        Self { success: true, data, message: message.into(), error: None }
    }

    pub fn rejected(error: CivicError) -> Self {
        Self { success: false, data: None, message: error.user_message(), error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// What happened to a fetch's response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The view was replaced with `count` issues
    Applied { count: usize },
    /// A newer fetch for the same view was issued; the response was dropped
    Superseded,
}
