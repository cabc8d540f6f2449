//! Response envelope shared by every endpoint

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::issue::Issue;
use crate::{CivicError, Result};

/// `{success, data?, message?}` wrapper used by every API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()) }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Decode an envelope from an already-parsed JSON body.
    ///
    /// # Errors
    /// Returns `CivicError::MalformedResponse` when the value does not match
    /// the envelope schema for `T`.
    pub fn from_value(value: serde_json::Value) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(value).map_err(|e| {
            CivicError::MalformedResponse(format!("response does not match envelope: {e}"))
        })
    }

    /// Collapse the envelope into its payload.
    ///
    /// # Errors
    /// `CivicError::Rejected` when `success` is false,
    /// `CivicError::MalformedResponse` when a successful envelope has no data.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(CivicError::Rejected(
                self.message.unwrap_or_else(|| "Request was not successful".to_string()),
            ));
        }
        self.data.ok_or_else(|| {
            CivicError::MalformedResponse("successful response is missing data".to_string())
        })
    }
}

/// Page metadata some list endpoints attach to their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

/// `data` of the issue list endpoints: a bare array or a page object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueList {
    Items(Vec<Issue>),
    Page {
        issues: Vec<Issue>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

impl IssueList {
    pub fn into_parts(self) -> (Vec<Issue>, Option<Pagination>) {
        match self {
            Self::Items(issues) => (issues, None),
            Self::Page { issues, pagination } => (issues, pagination),
        }
    }
}

impl From<Vec<Issue>> for IssueList {
    fn from(issues: Vec<Issue>) -> Self {
        Self::Items(issues)
    }
}
