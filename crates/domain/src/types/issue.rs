//! Issue model
//!
//! Wire format is the backend's camelCase JSON with a Mongo-style `_id`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned opaque issue identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IssueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Road,
    Lighting,
    Sanitation,
    Water,
    Drainage,
    Parks,
    Traffic,
    Noise,
    /// Also absorbs categories this client does not know about yet
    #[serde(other)]
    Other,
}

crate::impl_wire_str_conversions!(IssueCategory {
    Road => "road",
    Lighting => "lighting",
    Sanitation => "sanitation",
    Water => "water",
    Drainage => "drainage",
    Parks => "parks",
    Traffic => "traffic",
    Noise => "noise",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

crate::impl_wire_str_conversions!(IssuePriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

/// Triage lifecycle; transitions happen only on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Reported,
    InReview,
    Assigned,
    InProgress,
    Resolved,
    Closed,
    Rejected,
}

crate::impl_wire_str_conversions!(IssueStatus {
    Reported => "reported",
    InReview => "in_review",
    Assigned => "assigned",
    InProgress => "in_progress",
    Resolved => "resolved",
    Closed => "closed",
    Rejected => "rejected",
});

impl IssueStatus {
    /// No further work is expected on the issue.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Rejected)
    }
}

/// The current user's own vote on an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

crate::impl_wire_str_conversions!(VoteKind {
    Upvote => "upvote",
    Downvote => "downvote",
});

/// GeoJSON point plus a human-readable address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLocation {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    /// `[longitude, latitude]`, GeoJSON order
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl IssueLocation {
    pub fn point(latitude: f64, longitude: f64, address: Option<String>) -> Self {
        Self { kind: point_type(), coordinates: [longitude, latitude], address }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

/// Reporter of an issue; absent for anonymous reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAuthor {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A single reported civic problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: IssueId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: IssueCategory,
    #[serde(default)]
    pub priority: IssuePriority,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub location: Option<IssueLocation>,
    #[serde(default)]
    pub images: Vec<IssueImage>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default)]
    pub user_vote: Option<VoteKind>,
    #[serde(default)]
    pub reported_by: Option<IssueAuthor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Merge the fields present in `patch`, leaving everything else as is.
    ///
    /// Returns `true` when at least one field actually changed.
    pub fn apply_patch(&mut self, patch: &IssuePatch) -> bool {
        let mut changed = false;
        changed |= merge_field(&mut self.title, patch.title.as_ref());
        changed |= merge_field(&mut self.description, patch.description.as_ref());
        changed |= merge_field(&mut self.category, patch.category.as_ref());
        changed |= merge_field(&mut self.priority, patch.priority.as_ref());
        changed |= merge_field(&mut self.status, patch.status.as_ref());
        changed |= merge_field(&mut self.images, patch.images.as_ref());

        if let Some(location) = &patch.location {
            if self.location.as_ref() != Some(location) {
                self.location = Some(location.clone());
                changed = true;
            }
        }
        if let Some(updated_at) = patch.updated_at {
            if self.updated_at != Some(updated_at) {
                self.updated_at = Some(updated_at);
                changed = true;
            }
        }

        changed
    }

    /// Overwrite the three server-authoritative vote fields.
    pub fn apply_votes(&mut self, tally: &VoteTally) {
        self.upvotes = tally.upvotes;
        self.downvotes = tally.downvotes;
        self.user_vote = tally.user_vote;
    }

    /// Net score shown next to the vote buttons.
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

fn merge_field<T: PartialEq + Clone>(slot: &mut T, value: Option<&T>) -> bool {
    match value {
        Some(value) if *slot != *value => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

/// Partial update of an issue
///
/// Used both as the `PUT /issues/:id` body and to decode whatever subset of
/// fields the server echoes back; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IssueCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<IssuePriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<IssueLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<IssueImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Server-computed vote state returned by the vote endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub upvotes: u32,
    pub downvotes: u32,
    #[serde(default)]
    pub user_vote: Option<VoteKind>,
}

/// Body of `POST /issues`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    #[serde(default)]
    pub priority: IssuePriority,
    pub location: IssueLocation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<IssueImage>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Raw image bytes for a multipart issue submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
