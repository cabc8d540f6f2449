//! Scripted `IssueGateway` fake.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use civic_core::IssueGateway;
use civic_domain::{
    CivicError, Envelope, ImageUpload, Issue, IssueFilters, IssueId, IssueList, IssuePatch,
    NearbyQuery, NewIssue, Result, VoteKind, VoteTally,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Pair of signals used to hold a response until the test releases it.
#[derive(Clone, Default)]
pub struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once the gated call has reached the gateway.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    /// Let the gated call return its response.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn hold(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

/// One queued answer, optionally held behind a gate.
pub struct Scripted<T> {
    response: Result<Envelope<T>>,
    gate: Option<Gate>,
}

impl<T> Scripted<T> {
    pub fn ok(data: T) -> Self {
        Self { response: Ok(Envelope::ok(data)), gate: None }
    }

    pub fn envelope(envelope: Envelope<T>) -> Self {
        Self { response: Ok(envelope), gate: None }
    }

    pub fn err(error: CivicError) -> Self {
        Self { response: Err(error), gate: None }
    }

    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }
}

pub struct Queue<T>(Mutex<VecDeque<Scripted<T>>>);

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Queue<T> {
    pub fn push(&self, scripted: Scripted<T>) {
        self.0.lock().push_back(scripted);
    }

    pub async fn next(&self, operation: &str) -> Result<Envelope<T>> {
        let scripted = self.0.lock().pop_front();
        let Some(scripted) = scripted else {
            return Err(CivicError::Internal(format!("no scripted response for {operation}")));
        };
        if let Some(gate) = &scripted.gate {
            gate.hold().await;
        }
        scripted.response
    }
}

/// Records every call and answers from per-operation queues.
#[derive(Default)]
pub struct FakeIssueGateway {
    list: Queue<IssueList>,
    mine: Queue<IssueList>,
    nearby: Queue<IssueList>,
    get: Queue<Issue>,
    create: Queue<Issue>,
    update: Queue<IssuePatch>,
    delete: Queue<serde_json::Value>,
    vote: Queue<VoteTally>,
    list_calls: Mutex<Vec<IssueFilters>>,
    nearby_calls: Mutex<Vec<NearbyQuery>>,
    uploads: Mutex<Vec<usize>>,
}

impl FakeIssueGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_list(&self, scripted: Scripted<IssueList>) {
        self.list.push(scripted);
    }

    pub fn push_mine(&self, scripted: Scripted<IssueList>) {
        self.mine.push(scripted);
    }

    pub fn push_nearby(&self, scripted: Scripted<IssueList>) {
        self.nearby.push(scripted);
    }

    pub fn push_get(&self, scripted: Scripted<Issue>) {
        self.get.push(scripted);
    }

    pub fn push_create(&self, scripted: Scripted<Issue>) {
        self.create.push(scripted);
    }

    pub fn push_update(&self, scripted: Scripted<IssuePatch>) {
        self.update.push(scripted);
    }

    pub fn push_delete(&self, scripted: Scripted<serde_json::Value>) {
        self.delete.push(scripted);
    }

    pub fn push_vote(&self, scripted: Scripted<VoteTally>) {
        self.vote.push(scripted);
    }

    pub fn list_calls(&self) -> Vec<IssueFilters> {
        self.list_calls.lock().clone()
    }

    pub fn nearby_calls(&self) -> Vec<NearbyQuery> {
        self.nearby_calls.lock().clone()
    }

    /// Image counts of every multipart submission.
    pub fn uploads(&self) -> Vec<usize> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl IssueGateway for FakeIssueGateway {
    async fn list(&self, filters: &IssueFilters) -> Result<Envelope<IssueList>> {
        self.list_calls.lock().push(*filters);
        self.list.next("list").await
    }

    async fn list_mine(&self) -> Result<Envelope<IssueList>> {
        self.mine.next("list_mine").await
    }

    async fn list_nearby(&self, query: &NearbyQuery) -> Result<Envelope<IssueList>> {
        self.nearby_calls.lock().push(*query);
        self.nearby.next("list_nearby").await
    }

    async fn get(&self, _id: &IssueId) -> Result<Envelope<Issue>> {
        self.get.next("get").await
    }

    async fn create(&self, _issue: &NewIssue) -> Result<Envelope<Issue>> {
        self.create.next("create").await
    }

    async fn create_with_images(
        &self,
        _issue: &NewIssue,
        images: Vec<ImageUpload>,
    ) -> Result<Envelope<Issue>> {
        self.uploads.lock().push(images.len());
        self.create.next("create_with_images").await
    }

    async fn update(&self, _id: &IssueId, _patch: &IssuePatch) -> Result<Envelope<IssuePatch>> {
        self.update.next("update").await
    }

    async fn delete(&self, _id: &IssueId) -> Result<Envelope<serde_json::Value>> {
        self.delete.next("delete").await
    }

    async fn vote(&self, _id: &IssueId, _vote: VoteKind) -> Result<Envelope<VoteTally>> {
        self.vote.next("vote").await
    }
}
