//! HTTP implementation of the issue gateway (`/issues/*`)

use std::sync::Arc;

use async_trait::async_trait;
use civic_core::IssueGateway;
use civic_domain::{
    CivicError, Envelope, ImageUpload, Issue, IssueFilters, IssueId, IssueList, IssuePatch,
    NearbyQuery, NewIssue, Result, VoteKind, VoteTally,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::auth::to_body;
use super::client::ApiClient;
use crate::errors::InfraError;

/// Issue endpoints over the shared [`ApiClient`]; every call is authenticated
#[derive(Clone)]
pub struct HttpIssueGateway {
    client: Arc<ApiClient>,
}

impl HttpIssueGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Envelope<T>> {
        Ok(self.client.request_envelope(endpoint, method, body.as_ref(), true).await?)
    }
}

#[async_trait]
impl IssueGateway for HttpIssueGateway {
    async fn list(&self, filters: &IssueFilters) -> Result<Envelope<IssueList>> {
        let endpoint = with_query("/issues", &filters.query_pairs());
        self.call(&endpoint, Method::GET, None).await
    }

    async fn list_mine(&self) -> Result<Envelope<IssueList>> {
        self.call("/issues/my-issues", Method::GET, None).await
    }

    async fn list_nearby(&self, query: &NearbyQuery) -> Result<Envelope<IssueList>> {
        let endpoint = with_query("/issues/nearby", &query.query_pairs());
        self.call(&endpoint, Method::GET, None).await
    }

    async fn get(&self, id: &IssueId) -> Result<Envelope<Issue>> {
        self.call(&issue_path(id), Method::GET, None).await
    }

    async fn create(&self, issue: &NewIssue) -> Result<Envelope<Issue>> {
        self.call("/issues", Method::POST, Some(to_body(issue)?)).await
    }

    async fn create_with_images(
        &self,
        issue: &NewIssue,
        images: Vec<ImageUpload>,
    ) -> Result<Envelope<Issue>> {
        let form = issue_form(issue, images)?;
        Ok(self.client.upload("/issues", form, true).await?)
    }

    async fn update(&self, id: &IssueId, patch: &IssuePatch) -> Result<Envelope<IssuePatch>> {
        self.call(&issue_path(id), Method::PUT, Some(to_body(patch)?)).await
    }

    async fn delete(&self, id: &IssueId) -> Result<Envelope<Value>> {
        self.call(&issue_path(id), Method::DELETE, None).await
    }

    async fn vote(&self, id: &IssueId, vote: VoteKind) -> Result<Envelope<VoteTally>> {
        let endpoint = format!("{}/{vote}", issue_path(id));
        self.call(&endpoint, Method::POST, None).await
    }
}

/// `/issues/{id}` with the id escaped as a single path segment
fn issue_path(id: &IssueId) -> String {
    let segment: String = url::form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
    format!("/issues/{}", segment.replace('+', "%20"))
}

fn with_query(path: &str, pairs: &[(&'static str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish();
    format!("{path}?{query}")
}

/// Multipart body for `POST /issues`: scalar fields as text parts, the
/// location as JSON and each image as an `images` file part.
fn issue_form(issue: &NewIssue, images: Vec<ImageUpload>) -> Result<Form> {
    let location = serde_json::to_string(&issue.location)
        .map_err(|e| CivicError::Internal(format!("failed to serialize location: {e}")))?;

    let mut form = Form::new()
        .text("title", issue.title.clone())
        .text("description", issue.description.clone())
        .text("category", issue.category.as_str())
        .text("priority", issue.priority.as_str())
        .text("location", location)
        .text("isAnonymous", issue.is_anonymous.to_string());

    debug!(images = images.len(), "building multipart issue submission");
    for image in images {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| CivicError::from(InfraError::from(e)))?;
        form = form.part("images", part);
    }

    Ok(form)
}
