//! Filters for the issue list endpoints

use serde::{Deserialize, Serialize};

use super::issue::{IssueCategory, IssuePriority, IssueStatus};

/// Optional filters for `GET /issues`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilters {
    pub status: Option<IssueStatus>,
    pub category: Option<IssueCategory>,
    pub priority: Option<IssuePriority>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl IssueFilters {
    pub fn by_status(status: IssueStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn by_category(category: IssueCategory) -> Self {
        Self { category: Some(category), ..Self::default() }
    }

    /// Query-string pairs in a stable order; unset filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Parameters of `GET /issues/nearby`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in meters
    pub radius: u32,
}

impl NearbyQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.latitude.to_string()),
            ("lng", self.longitude.to_string()),
            ("radius", self.radius.to_string()),
        ]
    }
}
