//! Dashboard state container.
//!
//! # Responsibility
//! - Hold the latest snapshot together with the user's filter selections.
//! - Expose the derived views as pure recomputations of that state.
//!
//! # Invariants
//! - A snapshot older than the one held is ignored.
//! - Any delivery, snapshot or error, ends the loading state.

use crate::model::client::Client;
use crate::repo::client_repo::RepoError;
use crate::sync::{ClientStore, Snapshot, Subscription};
use crate::view::dashboard::{compute_stats, project_clients, ClientQuery, DashboardStats};
use crate::view::task_board::{list_assignees, project_tasks, TaskQuery, TaskRow};
use chrono::{DateTime, Utc};
use log::warn;
use parking_lot::Mutex;
use std::sync::Arc;

/// Dashboard state shared between the store listener and the UI.
pub type SharedDashboard = Arc<Mutex<DashboardState>>;

#[derive(Debug, Clone)]
pub struct DashboardState {
    snapshot: Arc<Snapshot>,
    loading: bool,
    sync_error: Option<String>,
    pub client_query: ClientQuery,
    pub task_query: TaskQuery,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::default()),
            loading: true,
            sync_error: None,
            client_query: ClientQuery::default(),
            task_query: TaskQuery::default(),
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held snapshot unless `snapshot` is older.
    ///
    /// Returns whether the snapshot was applied.
    pub fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>) -> bool {
        self.loading = false;
        if snapshot.version() < self.snapshot.version() {
            return false;
        }
        self.snapshot = snapshot;
        self.sync_error = None;
        true
    }

    /// Records a sync failure and leaves the last good snapshot in place.
    pub fn apply_sync_error(&mut self, err: &RepoError) {
        self.loading = false;
        self.sync_error = Some(err.to_string());
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sync_error(&self) -> Option<&str> {
        self.sync_error.as_deref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn clients(&self) -> &[Client] {
        self.snapshot.clients()
    }

    /// Dashboard grid for the current client query.
    pub fn visible_clients(&self) -> Vec<Client> {
        project_clients(self.snapshot.clients(), &self.client_query)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        compute_stats(self.snapshot.clients(), now)
    }

    /// Task board for the current task query.
    pub fn task_rows(&self) -> Vec<TaskRow> {
        project_tasks(self.snapshot.clients(), &self.task_query)
    }

    pub fn assignees(&self) -> Vec<String> {
        list_assignees(self.snapshot.clients())
    }
}

/// Subscribes a fresh dashboard state to `store`.
///
/// The returned subscription must be kept alive for updates to flow.
/// The listener locks the state, so do not hold that lock across a store
/// write.
pub fn attach_dashboard(store: &ClientStore) -> (SharedDashboard, Subscription) {
    let state: SharedDashboard = Arc::new(Mutex::new(DashboardState::new()));

    let on_snapshot = Arc::clone(&state);
    let on_error = Arc::clone(&state);
    let subscription = store.subscribe(
        move |snapshot| {
            if !on_snapshot.lock().apply_snapshot(snapshot) {
                warn!("event=dashboard_apply module=state status=skipped reason=stale_snapshot");
            }
        },
        move |err| on_error.lock().apply_sync_error(err),
    );

    (state, subscription)
}
