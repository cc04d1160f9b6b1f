//! Goal synchronizer.
//!
//! Owns the in-memory goal collection and keeps it consistent with the remote
//! goal store. Writes are applied locally only after the store accepted them;
//! `list` is the only operation with a recovery path (the cached snapshot).

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use goaltrack_auth::{AuthError, SessionEvent, SessionProvider};
use goaltrack_core::{Clock, GoalId, Notifier, Subscription, SystemClock, UserId};
use goaltrack_goals::{
    ExportDocument, Goal, GoalDraft, GoalFilter, GoalPatch, GoalStats, ImportDocument, SortKey,
    filter_goals, sort_goals,
};

use crate::cache::{GoalSnapshot, LocalCache};
use crate::error::{ClientError, ClientResult};
use crate::offline::{ConnectivityState, OfflineMode};
use crate::remote::{FieldUpdate, RemoteError, RemoteGoalStore};
use crate::types::{BatchKind, BatchReport, GoalSource, ListOutcome, SyncNotice};

/// Everything the synchronizer owns: the collection plus the view selections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalState {
    /// Most recently created first, until the next `list` replaces it.
    pub goals: Vec<Goal>,
    pub filter: GoalFilter,
    pub sort: SortKey,
}

pub struct GoalSynchronizer {
    remote: Arc<dyn RemoteGoalStore>,
    session: Arc<dyn SessionProvider>,
    cache: LocalCache,
    clock: Arc<dyn Clock>,
    state: GoalState,
    connectivity: OfflineMode,
    notifier: Notifier<SyncNotice>,
}

impl GoalSynchronizer {
    pub fn new(remote: Arc<dyn RemoteGoalStore>, session: Arc<dyn SessionProvider>, cache: LocalCache) -> Self {
        Self {
            remote,
            session,
            cache,
            clock: Arc::new(SystemClock),
            state: GoalState::default(),
            connectivity: OfflineMode::new(),
            notifier: Notifier::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &GoalState {
        &self.state
    }

    pub fn goals(&self) -> &[Goal] {
        &self.state.goals
    }

    pub fn get(&self, id: &GoalId) -> Option<&Goal> {
        self.state.goals.iter().find(|g| &g.id == id)
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity.state()
    }

    pub fn subscribe(&self) -> Subscription<SyncNotice> {
        self.notifier.subscribe()
    }

    /// Replace the collection with the store's view of `user_id`'s goals.
    ///
    /// On a remote failure the cached snapshot (if any, and if it belongs to
    /// `user_id`) is loaded instead and the outcome is marked degraded. With
    /// no usable snapshot the collection is emptied and the remote error is
    /// returned.
    ///
    /// Only the signed-in user's goals can be listed. A store response that
    /// contains another user's goal or repeats an id is rejected as invalid.
    pub async fn list(&mut self, user_id: &UserId) -> ClientResult<ListOutcome> {
        let current = self.session.current_user_id()?;
        if &current != user_id {
            return Err(ClientError::Validation(format!(
                "cannot list goals of user {user_id} while signed in as {current}"
            )));
        }
        let token = self.session.token().await?;

        let fetched = self.remote.list_by_user(user_id, &token).await;
        let err = match fetched.and_then(|goals| check_listing(user_id, goals)) {
            Ok(goals) => return Ok(self.loaded_from_remote(user_id, goals).await),
            Err(err) => err,
        };

        self.note_failure("list", &err);

        match self.cache.read_for(user_id).await {
            Some(snapshot) => {
                let count = snapshot.goals.len();
                let warning = format!("showing cached goals; remote goal store unavailable ({err})");
                tracing::warn!(count, "serving goals from cached snapshot");

                self.state.goals = snapshot.goals;
                self.notifier.publish(SyncNotice::DegradedMode {
                    reason: err.to_string(),
                });
                self.notifier.publish(SyncNotice::GoalsLoaded {
                    source: GoalSource::Cache,
                    count,
                });
                self.publish_progress();

                Ok(ListOutcome {
                    source: GoalSource::Cache,
                    count,
                    warning: Some(warning),
                })
            }
            None => {
                self.state.goals.clear();
                Err(ClientError::Sync(err))
            }
        }
    }

    async fn loaded_from_remote(&mut self, user_id: &UserId, goals: Vec<Goal>) -> ListOutcome {
        self.connectivity.set_online();
        let count = goals.len();

        let snapshot = GoalSnapshot::new(user_id.clone(), goals, self.clock.now());
        if let Err(err) = self.cache.write(&snapshot).await {
            tracing::warn!("failed to write goal snapshot: {err}");
        }
        self.state.goals = snapshot.goals;

        tracing::info!(user_id = %user_id, count, "goals loaded");
        self.notifier.publish(SyncNotice::GoalsLoaded {
            source: GoalSource::Remote,
            count,
        });
        self.publish_progress();

        ListOutcome {
            source: GoalSource::Remote,
            count,
            warning: None,
        }
    }

    /// Create a goal for the signed-in user and put it at the front of the
    /// collection.
    pub async fn create(&mut self, draft: GoalDraft) -> ClientResult<Goal> {
        draft.validate()?;

        let user_id = self.session.current_user_id()?;
        let token = self.session.token().await?;
        let new_goal = draft.into_new_goal(user_id, self.clock.now())?;

        let result = self.remote.create(&new_goal, &token).await;
        let created = match result {
            Ok(goal) => goal,
            Err(err) => return Err(self.remote_failed("create", err)),
        };
        if created.id.is_blank() {
            let err = RemoteError::InvalidResponse("created goal has no id".to_string());
            return Err(self.remote_failed("create", err));
        }
        if created.user_id != new_goal.user_id {
            let err = RemoteError::InvalidResponse(format!("created goal is owned by {}", created.user_id));
            return Err(self.remote_failed("create", err));
        }
        if self.get(&created.id).is_some() {
            let err = RemoteError::InvalidResponse(format!("created goal reuses id {}", created.id));
            return Err(self.remote_failed("create", err));
        }
        self.connectivity.set_online();

        tracing::info!(goal_id = %created.id, "goal created");
        self.state.goals.insert(0, created.clone());
        self.notifier.publish(SyncNotice::GoalCreated(created.clone()));
        self.publish_progress();

        Ok(created)
    }

    /// Send `patch` with a fresh `updatedAt` and merge it in place. The store
    /// receives the same normalized fields that are merged locally.
    pub async fn update(&mut self, id: &GoalId, patch: GoalPatch) -> ClientResult<Goal> {
        patch.validate()?;
        let patch = patch.normalized();

        let index = self.position(id)?;
        let stamp = self.state.goals[index].next_update_stamp(self.clock.now());
        let token = self.session.token().await?;

        let update = FieldUpdate::new(patch, stamp);
        let result = self.remote.replace_fields(id, &update, &token).await;
        if let Err(err) = result {
            return Err(self.remote_failed("update", err));
        }
        self.connectivity.set_online();

        let goal = &mut self.state.goals[index];
        goal.apply_patch(&update.patch, stamp);
        let updated = goal.clone();

        tracing::info!(goal_id = %id, "goal updated");
        self.notifier.publish(SyncNotice::GoalUpdated(updated.clone()));
        self.publish_progress();

        Ok(updated)
    }

    pub async fn toggle_complete(&mut self, id: &GoalId) -> ClientResult<Goal> {
        let completed = self.get(id).map(|g| g.completed).ok_or_else(|| ClientError::NotFound(id.clone()))?;
        self.update(id, GoalPatch::completed(!completed)).await
    }

    /// Delete a goal. Confirmation is the caller's job.
    pub async fn delete(&mut self, id: &GoalId) -> ClientResult<()> {
        let index = self.position(id)?;
        let token = self.session.token().await?;

        let result = self.remote.delete(id, &token).await;
        if let Err(err) = result {
            return Err(self.remote_failed("delete", err));
        }
        self.connectivity.set_online();

        self.state.goals.remove(index);
        tracing::info!(goal_id = %id, "goal deleted");
        self.notifier.publish(SyncNotice::GoalDeleted(id.clone()));
        self.publish_progress();

        Ok(())
    }

    /// Delete every completed goal, one at a time. Failures are counted, not
    /// rolled back.
    pub async fn bulk_delete_completed(&mut self) -> ClientResult<BatchReport> {
        self.session.current_user_id()?;

        let ids: Vec<GoalId> = self
            .state
            .goals
            .iter()
            .filter(|g| g.completed)
            .map(|g| g.id.clone())
            .collect();

        let mut report = BatchReport::default();
        for id in ids {
            let result = self.delete(&id).await;
            if let Err(err) = &result {
                tracing::debug!(goal_id = %id, "bulk delete skipped goal: {err}");
            }
            report.record(result.is_ok());
        }

        self.finish_batch(BatchKind::ClearCompleted, report);
        Ok(report)
    }

    /// Create one goal per record. Records that do not decode, fail
    /// validation, or are refused by the store count as failed; earlier
    /// successes are kept.
    pub async fn import(&mut self, records: &[Value]) -> ClientResult<BatchReport> {
        self.session.current_user_id()?;

        let mut report = BatchReport::default();
        for (index, record) in records.iter().enumerate() {
            let result = match ImportDocument::decode_draft(record) {
                Ok(draft) => self.create(draft).await.map(|_| ()),
                Err(err) => Err(ClientError::from(err)),
            };
            if let Err(err) = &result {
                tracing::debug!(record = index + 1, "import skipped record: {err}");
            }
            report.record(result.is_ok());
        }

        self.finish_batch(BatchKind::Import, report);
        Ok(report)
    }

    /// Parse an import document and import its `goals`.
    pub async fn import_document(&mut self, text: &str) -> ClientResult<BatchReport> {
        let document = ImportDocument::parse(text).map_err(|e| ClientError::Format(e.to_string()))?;
        self.import(&document.goals).await
    }

    pub fn export(&self) -> ClientResult<ExportDocument> {
        let user = self.session.current_user().ok_or(AuthError::NoSession)?;
        Ok(ExportDocument::new(user.email, &self.state.goals, self.clock.now()))
    }

    /// Goals matching `filter`, in collection order.
    pub fn filter(&self, filter: GoalFilter) -> Vec<&Goal> {
        filter_goals(&self.state.goals, filter, self.clock.today())
    }

    pub fn sort(view: &mut [&Goal], key: SortKey) {
        sort_goals(view, key);
    }

    pub fn set_filter(&mut self, filter: GoalFilter) {
        self.state.filter = filter;
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.state.sort = key;
    }

    pub fn clear_filters(&mut self) {
        self.state.filter = GoalFilter::All;
    }

    /// The collection filtered and sorted by the current selections.
    pub fn current_view(&self) -> Vec<&Goal> {
        let mut view = self.filter(self.state.filter);
        sort_goals(&mut view, self.state.sort);
        view
    }

    pub fn stats(&self) -> GoalStats {
        GoalStats::compute(&self.state.goals, self.clock.now())
    }

    /// React to a session change: load on sign-in, forget everything on
    /// sign-out.
    pub async fn handle_session_event(&mut self, event: SessionEvent) -> ClientResult<Option<ListOutcome>> {
        match event {
            SessionEvent::SignedIn(user) => self.list(&user.id).await.map(Some),
            SessionEvent::SignedOut => {
                self.clear().await;
                Ok(None)
            }
            SessionEvent::TokenRefreshed => Ok(None),
        }
    }

    /// Handle every session event queued on `events`. Stops at the first
    /// error.
    pub async fn process_session_events(&mut self, events: &Subscription<SessionEvent>) -> ClientResult<()> {
        for event in events.drain() {
            self.handle_session_event(event).await?;
        }
        Ok(())
    }

    /// Drop the collection, the view selections and the cached snapshot.
    pub async fn clear(&mut self) {
        self.state = GoalState::default();
        if let Err(err) = self.cache.clear().await {
            tracing::warn!("failed to remove goal snapshot: {err}");
        }
        tracing::info!("goal state cleared");
        self.notifier.publish(SyncNotice::Cleared);
    }

    fn position(&self, id: &GoalId) -> ClientResult<usize> {
        self.state
            .goals
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| ClientError::NotFound(id.clone()))
    }

    fn note_failure(&mut self, operation: &str, err: &RemoteError) {
        if err.is_unreachable() {
            self.connectivity.set_offline(err.to_string());
        }
        tracing::error!(operation, error = %err, "remote goal store call failed");
    }

    fn remote_failed(&mut self, operation: &str, err: RemoteError) -> ClientError {
        self.note_failure(operation, &err);
        ClientError::Sync(err)
    }

    fn publish_progress(&self) {
        self.notifier.publish(SyncNotice::ProgressChanged(self.stats()));
    }

    fn finish_batch(&self, kind: BatchKind, report: BatchReport) {
        if report.failed() > 0 {
            tracing::warn!(
                ?kind,
                attempted = report.attempted,
                succeeded = report.succeeded,
                "batch finished with failures"
            );
        } else {
            tracing::info!(?kind, attempted = report.attempted, "batch finished");
        }
        self.notifier.publish(SyncNotice::BatchFinished { kind, report });
    }
}

/// Reject a listing that is not entirely `user_id`'s or that repeats an id.
fn check_listing(user_id: &UserId, goals: Vec<Goal>) -> Result<Vec<Goal>, RemoteError> {
    let mut seen = HashSet::with_capacity(goals.len());
    for goal in &goals {
        if &goal.user_id != user_id {
            return Err(RemoteError::InvalidResponse(format!(
                "goal {} belongs to {}, not {user_id}",
                goal.id, goal.user_id
            )));
        }
        if !seen.insert(&goal.id) {
            return Err(RemoteError::InvalidResponse(format!("goal id {} listed twice", goal.id)));
        }
    }
    Ok(goals)
}
