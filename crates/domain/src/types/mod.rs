//! Domain data types

pub mod envelope;
pub mod issue;
pub mod query;
pub mod user;

pub use envelope::{Envelope, IssueList, Pagination};
pub use issue::{
    ImageUpload, Issue, IssueAuthor, IssueCategory, IssueId, IssueImage, IssueLocation, IssuePatch,
    IssuePriority, IssueStatus, NewIssue, VoteKind, VoteTally,
};
pub use query::{IssueFilters, NearbyQuery};
pub use user::{AuthPayload, LoginRequest, ProfileUpdate, RegisterRequest, User, UserRole};
