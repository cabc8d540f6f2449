//! Port interface for the remote issue endpoints

use async_trait::async_trait;
use civic_domain::{
    Envelope, ImageUpload, Issue, IssueFilters, IssueId, IssueList, IssuePatch, NearbyQuery,
    NewIssue, Result, VoteKind, VoteTally,
};

/// Remote issue endpoints (`/issues/*`)
///
/// Implementations return the decoded envelope untouched; deciding what a
/// `success: false` means is left to the store.
#[async_trait]
pub trait IssueGateway: Send + Sync {
    /// `GET /issues` with optional filters
    async fn list(&self, filters: &IssueFilters) -> Result<Envelope<IssueList>>;

    /// `GET /issues/my-issues`
    async fn list_mine(&self) -> Result<Envelope<IssueList>>;

    /// `GET /issues/nearby`
    async fn list_nearby(&self, query: &NearbyQuery) -> Result<Envelope<IssueList>>;

    /// `GET /issues/:id`
    async fn get(&self, id: &IssueId) -> Result<Envelope<Issue>>;

    /// `POST /issues` with a JSON body
    async fn create(&self, issue: &NewIssue) -> Result<Envelope<Issue>>;

    /// `POST /issues` as multipart with image parts (never retried)
    async fn create_with_images(
        &self,
        issue: &NewIssue,
        images: Vec<ImageUpload>,
    ) -> Result<Envelope<Issue>>;

    /// `PUT /issues/:id`; `data` is whatever subset of fields the server echoes
    async fn update(&self, id: &IssueId, patch: &IssuePatch) -> Result<Envelope<IssuePatch>>;

    /// `DELETE /issues/:id`
    async fn delete(&self, id: &IssueId) -> Result<Envelope<serde_json::Value>>;

    /// `POST /issues/:id/upvote` or `POST /issues/:id/downvote`
    async fn vote(&self, id: &IssueId, vote: VoteKind) -> Result<Envelope<VoteTally>>;
}
