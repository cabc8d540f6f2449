//! Shared test helpers for `civic-core` integration tests.
//!
//! Scripted gateway fakes answer each call with the next queued response,
//! optionally parking on a [`Gate`] so tests can force responses to resolve
//! out of order.

#![allow(dead_code)]

pub mod auth;
pub mod issues;

use civic_domain::{
    Issue, IssueCategory, IssueId, IssueLocation, IssuePriority, IssueStatus, NewIssue, User,
    UserRole,
};

/// Minimal persisted issue with the given id and title.
pub fn issue(id: &str, title: &str) -> Issue {
    Issue {
        id: IssueId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        category: IssueCategory::Road,
        priority: IssuePriority::Medium,
        status: IssueStatus::Reported,
        location: Some(IssueLocation::point(40.0, -74.0, None)),
        images: Vec::new(),
        upvotes: 0,
        downvotes: 0,
        user_vote: None,
        reported_by: None,
        created_at: None,
        updated_at: None,
    }
}

/// Same as [`issue`] with an explicit status.
pub fn issue_with_status(id: &str, title: &str, status: IssueStatus) -> Issue {
    Issue { status, ..issue(id, title) }
}

/// Submission body for a new pothole report.
pub fn new_issue(title: &str) -> NewIssue {
    NewIssue {
        title: title.to_string(),
        description: "Deep pothole near the crossing".to_string(),
        category: IssueCategory::Road,
        priority: IssuePriority::High,
        location: IssueLocation::point(40.0, -74.0, Some("Main St".to_string())),
        images: Vec::new(),
        is_anonymous: false,
    }
}

/// Citizen profile with a predictable email.
pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.org"),
        role: UserRole::Citizen,
        phone: None,
        avatar: None,
        created_at: None,
    }
}
