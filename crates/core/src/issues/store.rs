//! Issue synchronization store
//!
//! Keeps the `issues`, `myIssues` and `nearbyIssues` views consistent with
//! each other and with the server. Every mutation waits for the server to
//! confirm before touching local state, and a failed call leaves state
//! exactly as it was.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use civic_domain::{
    CivicError, Envelope, ImageUpload, Issue, IssueCategory, IssueFilters, IssueId, IssueList,
    IssuePatch, IssueStatus, NearbyQuery, NewIssue, Pagination, Result, VoteKind, VoteTally,
};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use super::outcome::{FetchStatus, MutationResult};
use super::ports::IssueGateway;
use super::view::{IssueSet, IssueView};

#[derive(Debug, Default)]
struct StoreState {
    issues: IssueSet,
    filters: IssueFilters,
    pagination: Option<Pagination>,
    last_error: Option<CivicError>,
}

#[derive(Debug, Clone, Copy)]
enum Activity {
    Loading,
    Refreshing,
}

/// Issue synchronization store
///
/// Shared behind an `Arc`; all methods take `&self`. The internal lock is
/// never held across an `.await`.
pub struct IssueStore {
    gateway: Arc<dyn IssueGateway>,
    state: RwLock<StoreState>,
    /// Latest request ticket issued per view
    tickets: [AtomicU64; 3],
    /// Bumped by `reset`; responses from an older epoch are not applied
    epoch: AtomicU64,
    loading: AtomicUsize,
    refreshing: AtomicUsize,
    changes: watch::Sender<u64>,
}

impl IssueStore {
    /// Create an empty store backed by the given gateway
    pub fn new(gateway: Arc<dyn IssueGateway>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            gateway,
            state: RwLock::new(StoreState::default()),
            tickets: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            epoch: AtomicU64::new(0),
            loading: AtomicUsize::new(0),
            refreshing: AtomicUsize::new(0),
            changes,
        }
    }

    /* ------------------------------------------------------------------ */
    /* Reads */
    /* ------------------------------------------------------------------ */

    pub fn issues(&self) -> Vec<Issue> {
        self.view(IssueView::All)
    }

    pub fn my_issues(&self) -> Vec<Issue> {
        self.view(IssueView::Mine)
    }

    pub fn nearby_issues(&self) -> Vec<Issue> {
        self.view(IssueView::Nearby)
    }

    pub fn view(&self, view: IssueView) -> Vec<Issue> {
        self.state.read().issues.view(view)
    }

    pub fn issue(&self, id: &IssueId) -> Option<Issue> {
        self.state.read().issues.get(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst) > 0
    }

    /// Filters of the most recent `issues` fetch
    pub fn filters(&self) -> IssueFilters {
        self.state.read().filters
    }

    /// Page metadata of the most recent applied `issues` fetch, if any
    pub fn pagination(&self) -> Option<Pagination> {
        self.state.read().pagination
    }

    /// Error of the most recent fetch that was not superseded, cleared on
    /// the next successful one
    pub fn last_error(&self) -> Option<CivicError> {
        self.state.read().last_error.clone()
    }

    /// Snapshot of the whole normalized state
    pub fn snapshot(&self) -> IssueSet {
        self.state.read().issues.clone()
    }

    /// Receiver that ticks whenever state or loading flags change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /* ------------------------------------------------------------------ */
    /* Fetches: replace one view wholesale */
    /* ------------------------------------------------------------------ */

    /// Load the global list, optionally filtered
    ///
    /// # Errors
    /// Returns the gateway error or the server's rejection; the view is left
    /// untouched.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, filters: Option<IssueFilters>) -> Result<FetchStatus> {
        let filters = filters.unwrap_or_default();
        self.state.write().filters = filters;
        self.run_fetch(IssueView::All, Activity::Loading, self.gateway.list(&filters)).await
    }

    /// Load the global list filtered by status
    ///
    /// # Errors
    /// See [`IssueStore::fetch_all`].
    pub async fn fetch_by_status(&self, status: IssueStatus) -> Result<FetchStatus> {
        self.fetch_all(Some(IssueFilters::by_status(status))).await
    }

    /// Load the global list filtered by category
    ///
    /// # Errors
    /// See [`IssueStore::fetch_all`].
    pub async fn fetch_by_category(&self, category: IssueCategory) -> Result<FetchStatus> {
        self.fetch_all(Some(IssueFilters::by_category(category))).await
    }

    /// Pull-to-refresh: repeat the last `issues` fetch with its filters
    ///
    /// # Errors
    /// See [`IssueStore::fetch_all`].
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<FetchStatus> {
        let filters = self.filters();
        self.run_fetch(IssueView::All, Activity::Refreshing, self.gateway.list(&filters)).await
    }

    /// Load the signed-in user's issues
    ///
    /// # Errors
    /// See [`IssueStore::fetch_all`].
    #[instrument(skip(self))]
    pub async fn fetch_mine(&self) -> Result<FetchStatus> {
        self.run_fetch(IssueView::Mine, Activity::Loading, self.gateway.list_mine()).await
    }

    /// Load issues within `radius` meters of a point
    ///
    /// # Errors
    /// See [`IssueStore::fetch_all`].
    #[instrument(skip(self))]
    pub async fn fetch_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius: u32,
    ) -> Result<FetchStatus> {
        let query = NearbyQuery { latitude, longitude, radius };
        self.run_fetch(IssueView::Nearby, Activity::Loading, self.gateway.list_nearby(&query))
            .await
    }

    /// Load one issue and refresh its record in whichever views list it
    ///
    /// View membership is not changed.
    ///
    /// # Errors
    /// Returns the gateway error or the server's rejection.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_by_id(&self, id: &IssueId) -> Result<Issue> {
        let epoch = self.epoch();
        let issue = self.gateway.get(id).await.and_then(Envelope::into_data)?;
        if self.epoch() == epoch {
            self.mutate(|set| set.refresh_record(issue.clone()));
        }
        Ok(issue)
    }

    async fn run_fetch<F>(&self, view: IssueView, activity: Activity, request: F) -> Result<FetchStatus>
    where
        F: Future<Output = Result<Envelope<IssueList>>>,
    {
        let slot = &self.tickets[view.index()];
        let ticket = slot.fetch_add(1, Ordering::SeqCst) + 1;
        let _activity = ActivityGuard::enter(self, activity);
        debug!(%view, ticket, "fetch started");

        let outcome = request.await.and_then(Envelope::into_data);

        let mut state = self.state.write();
        if slot.load(Ordering::SeqCst) != ticket {
            debug!(%view, ticket, "fetch superseded by a newer request; response discarded");
            return match outcome {
                Ok(_) => Ok(FetchStatus::Superseded),
                Err(err) => Err(err),
            };
        }

        match outcome {
            Ok(list) => {
                let (issues, pagination) = list.into_parts();
                let count = issues.len();
                state.issues.replace_view(view, issues);
                if view == IssueView::All {
                    state.pagination = pagination;
                }
                state.last_error = None;
                drop(state);

                self.notify();
                info!(%view, count, "view replaced");
                Ok(FetchStatus::Applied { count })
            }
            Err(err) => {
                warn!(%view, error = %err, "fetch failed");
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /* ------------------------------------------------------------------ */
    /* Mutations: confirm, then apply */
    /* ------------------------------------------------------------------ */

    /// Report a new issue; on success it is prepended to `issues` only
    #[instrument(skip(self, new_issue), fields(title = %new_issue.title))]
    pub async fn create(&self, new_issue: &NewIssue) -> MutationResult<Issue> {
        let epoch = self.epoch();
        let response = self.gateway.create(new_issue).await;
        self.apply_created(epoch, response)
    }

    /// Report a new issue with photos as a multipart submission
    #[instrument(skip(self, new_issue, images), fields(title = %new_issue.title, images = images.len()))]
    pub async fn create_with_images(
        &self,
        new_issue: &NewIssue,
        images: Vec<ImageUpload>,
    ) -> MutationResult<Issue> {
        let epoch = self.epoch();
        let response = self.gateway.create_with_images(new_issue, images).await;
        self.apply_created(epoch, response)
    }

    fn apply_created(&self, epoch: u64, response: Result<Envelope<Issue>>) -> MutationResult<Issue> {
        let confirmed =
            confirm(response).and_then(|(data, message)| Ok((require(data, "create")?, message)));

        match confirmed {
            Ok((issue, message)) => {
                if self.epoch() == epoch {
                    self.mutate(|set| {
                        set.prepend(IssueView::All, issue.clone());
                        true
                    });
                }
                info!(id = %issue.id, "issue created");
                MutationResult::applied(
                    Some(issue),
                    message.unwrap_or_else(|| "Issue reported successfully".to_string()),
                )
            }
            Err(err) => reject("create", err),
        }
    }

    /// Update an issue; the merged fields show up in every view listing it
    ///
    /// Fields echoed by the server take precedence; when the server echoes
    /// nothing the request patch itself is merged.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &IssueId, patch: &IssuePatch) -> MutationResult<Issue> {
        let epoch = self.epoch();
        let response = self.gateway.update(id, patch).await;

        match confirm(response) {
            Ok((echoed, message)) => {
                let effective = echoed.filter(|p| !p.is_empty()).unwrap_or_else(|| patch.clone());
                if self.epoch() == epoch {
                    let changed = self.mutate(|set| set.patch(id, &effective));
                    debug!(changed, "update applied");
                }
                MutationResult::applied(
                    self.issue(id),
                    message.unwrap_or_else(|| "Issue updated successfully".to_string()),
                )
            }
            Err(err) => reject("update", err),
        }
    }

    /// Delete an issue from the server and from every view
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &IssueId) -> MutationResult<IssueId> {
        let epoch = self.epoch();
        let response = self.gateway.delete(id).await;

        match confirm(response) {
            Ok((_, message)) => {
                if self.epoch() == epoch {
                    let removed = self.mutate(|set| set.remove(id));
                    debug!(removed, "delete applied");
                }
                MutationResult::applied(
                    Some(id.clone()),
                    message.unwrap_or_else(|| "Issue deleted successfully".to_string()),
                )
            }
            Err(err) => reject("delete", err),
        }
    }

    pub async fn upvote(&self, id: &IssueId) -> MutationResult<VoteTally> {
        self.vote(id, VoteKind::Upvote).await
    }

    pub async fn downvote(&self, id: &IssueId) -> MutationResult<VoteTally> {
        self.vote(id, VoteKind::Downvote).await
    }

    /// Cast a vote; the server's tally overwrites the three vote fields
    #[instrument(skip(self), fields(id = %id, vote = %vote))]
    pub async fn vote(&self, id: &IssueId, vote: VoteKind) -> MutationResult<VoteTally> {
        let epoch = self.epoch();
        let response = self.gateway.vote(id, vote).await;
        let confirmed =
            confirm(response).and_then(|(data, message)| Ok((require(data, "vote")?, message)));

        match confirmed {
            Ok((tally, message)) => {
                if self.epoch() == epoch {
                    self.mutate(|set| set.set_votes(id, &tally));
                }
                MutationResult::applied(
                    Some(tally),
                    message.unwrap_or_else(|| "Vote recorded".to_string()),
                )
            }
            Err(err) => reject("vote", err),
        }
    }

    /// Forget everything, e.g. on logout
    ///
    /// In-flight fetches are superseded and in-flight mutations will not
    /// write their results back.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        for slot in &self.tickets {
            slot.fetch_add(1, Ordering::SeqCst);
        }
        *self.state.write() = StoreState::default();
        self.notify();
        debug!("issue store reset");
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn mutate(&self, apply: impl FnOnce(&mut IssueSet) -> bool) -> bool {
        let changed = {
            let mut state = self.state.write();
            apply(&mut state.issues)
        };
        if changed {
            self.notify();
        }
        changed
    }

    fn notify(&self) {
        self.changes.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

/// Split a gateway response into its confirmed payload and server message.
fn confirm<T>(response: Result<Envelope<T>>) -> Result<(Option<T>, Option<String>)> {
    let envelope = response?;
    if !envelope.success {
        return Err(CivicError::Rejected(
            envelope.message.unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }
    Ok((envelope.data, envelope.message))
}

fn require<T>(data: Option<T>, operation: &str) -> Result<T> {
    data.ok_or_else(|| {
        CivicError::MalformedResponse(format!("{operation} response is missing data"))
    })
}

fn reject<T>(operation: &'static str, err: CivicError) -> MutationResult<T> {
    warn!(operation, error = %err, "mutation rejected; local state unchanged");
    MutationResult::rejected(err)
}

/// Counts an in-flight fetch for the duration of its future
struct ActivityGuard<'a> {
    store: &'a IssueStore,
    activity: Activity,
}

impl<'a> ActivityGuard<'a> {
    fn enter(store: &'a IssueStore, activity: Activity) -> Self {
        store.counter(activity).fetch_add(1, Ordering::SeqCst);
        store.notify();
        Self { store, activity }
    }
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.store.counter(self.activity).fetch_sub(1, Ordering::SeqCst);
        self.store.notify();
    }
}

impl IssueStore {
    fn counter(&self, activity: Activity) -> &AtomicUsize {
        match activity {
            Activity::Loading => &self.loading,
            Activity::Refreshing => &self.refreshing,
        }
    }
}
