// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: drains the pending-operation queue against the trip service,
//! then reconciles the local cache with the server's canonical list.
//!
//! State machine: `idle → syncing → {completed, failed} → idle`. A pass
//! started while another is in flight returns immediately without touching
//! the network.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tripsync_core::trip::is_temp_id;
use tripsync_core::{
    ClockSource, DurableStore, Listeners, OpKind, OpPayload, PendingSyncOperation, Subscription,
    SyncStatus, SystemClock, Trip,
};

use super::queue::SyncQueue;
use crate::api::TripApi;
use crate::net::{ClientError, NetworkMonitor, ReqwestTransport, Transport};

/// Error type for a sync pass that could not finish.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Fetching the canonical trip list failed.
    #[error("reconciliation failed: {0}")]
    Reconcile(#[source] ClientError),

    /// The local store failed mid-pass.
    #[error("sync aborted: {0}")]
    Storage(#[from] tripsync_core::Error),
}

/// What a call to [`SyncEngine::sync_data`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Another pass was already running; nothing was done.
    AlreadyInProgress,
    /// The device is offline; nothing was done.
    Offline,
    /// A pass ran and reconciliation succeeded.
    Synced(SyncReport),
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::AlreadyInProgress => f.write_str("sync already in progress"),
            SyncOutcome::Offline => f.write_str("device offline, nothing synced"),
            SyncOutcome::Synced(report) => report.fmt(f),
        }
    }
}

/// Counts from one sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Operations that were queued when the pass started.
    pub total: usize,
    /// Operations the server accepted.
    pub applied: usize,
    /// Operations that failed this pass (dead-lettered ones included).
    pub failed: usize,
    /// Operations moved to the dead-letter list this pass.
    pub dead_lettered: usize,
    /// Temporary ids replaced by server ids.
    pub remapped: usize,
}

impl SyncReport {
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed == 0 {
            write!(f, "synced {} operation(s)", self.applied)?;
        } else {
            write!(
                f,
                "synced {} of {} operation(s), {} failed",
                self.applied, self.total, self.failed
            )?;
        }
        if self.dead_lettered > 0 {
            write!(f, " ({} moved to dead letters)", self.dead_lettered)?;
        }
        Ok(())
    }
}

/// Clears the in-flight flag when a pass ends, however it ends.
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drains queued operations and reconciles the cache.
pub struct SyncEngine<T: Transport = ReqwestTransport> {
    api: Arc<TripApi<T>>,
    store: Arc<DurableStore>,
    queue: SyncQueue,
    monitor: Arc<NetworkMonitor>,
    clock: Arc<dyn ClockSource>,
    listeners: Listeners<SyncStatus>,
    status: Mutex<SyncStatus>,
    syncing: AtomicBool,
    max_op_attempts: Option<u32>,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(
        api: Arc<TripApi<T>>,
        store: Arc<DurableStore>,
        monitor: Arc<NetworkMonitor>,
    ) -> Self {
        let clock: Arc<dyn ClockSource> = Arc::new(SystemClock);
        SyncEngine {
            queue: SyncQueue::new(Arc::clone(&store), Arc::clone(&clock)),
            api,
            store,
            monitor,
            clock,
            listeners: Listeners::new(),
            status: Mutex::new(SyncStatus::idle()),
            syncing: AtomicBool::new(false),
            max_op_attempts: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.queue = SyncQueue::new(Arc::clone(&self.store), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Retires an operation to the dead-letter list after `max` failed attempts.
    /// `None` keeps failing operations queued forever.
    pub fn with_max_op_attempts(mut self, max: Option<u32>) -> Self {
        self.max_op_attempts = max.filter(|m| *m > 0);
        self
    }

    /// Current status.
    pub fn status(&self) -> SyncStatus {
        self.status.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Registers a status callback. Dropping the handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SyncStatus) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    fn set_status(&self, status: SyncStatus) {
        if let Ok(mut slot) = self.status.lock() {
            *slot = status;
        }
        self.listeners.notify(&status);
    }

    /// Runs one sync pass.
    pub async fn sync_data(&self) -> Result<SyncOutcome, SyncError> {
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("sync requested while a pass is running");
            return Ok(SyncOutcome::AlreadyInProgress);
        }
        let _guard = PassGuard(&self.syncing);

        if !self.monitor.is_online() {
            debug!("sync requested while offline");
            return Ok(SyncOutcome::Offline);
        }

        info!("sync started");
        self.set_status(SyncStatus::syncing(0));

        let mut progress = 0;
        let result = self.run_pass(&mut progress).await;
        let result = match result {
            Ok(report) => self
                .store
                .set_last_sync(self.clock.now())
                .map(|()| report)
                .map_err(SyncError::from),
            Err(e) => Err(e),
        };

        match &result {
            Ok(report) => {
                info!(
                    applied = report.applied,
                    failed = report.failed,
                    "sync completed"
                );
                self.set_status(SyncStatus::completed());
            }
            Err(e) => {
                error!("sync failed: {}", e);
                self.set_status(SyncStatus::failed(progress));
            }
        }
        self.set_status(SyncStatus::idle());

        result.map(SyncOutcome::Synced)
    }

    async fn run_pass(&self, progress: &mut u8) -> Result<SyncReport, SyncError> {
        let ops = self.queue.list()?;
        let total = ops.len();
        let mut report = SyncReport {
            total,
            ..Default::default()
        };
        let mut pass = PassState::new(&ops);

        for (index, mut op) in ops.into_iter().enumerate() {
            if !pass.retired.contains(&op.id) {
                rewrite_ids(&mut op.payload, &pass.confirmed);
                self.apply_one(op, &mut pass, &mut report).await?;
            }

            *progress = SyncStatus::progress_of(index, total);
            self.set_status(SyncStatus::syncing(*progress));
        }

        let trips = self.api.list_trips().await.map_err(SyncError::Reconcile)?;
        self.store.save_trips(&trips)?;
        debug!(count = trips.len(), "cache reconciled");

        Ok(report)
    }

    async fn apply_one(
        &self,
        mut op: PendingSyncOperation,
        pass: &mut PassState,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        // Anything still naming a temp id depends on a create that has not
        // gone through, and the server cannot know that id.
        if op.kind() != OpKind::CreateEntity {
            if let Some(temp_id) = op.trip_id().filter(|id| is_temp_id(id)) {
                report.failed += 1;
                if pass.awaiting.contains(temp_id) {
                    debug!(op_id = %op.id, "waiting on trip creation, left queued");
                } else {
                    warn!(op_id = %op.id, temp_id, "trip creation is no longer queued, moving operation to dead letters");
                    self.retire(&op, pass, report)?;
                }
                return Ok(());
            }
        }

        match self.dispatch(&op.payload).await {
            Ok(created) => {
                report.applied += 1;
                match (&op.payload, created) {
                    (OpPayload::CreateTrip { temp_id, .. }, Some(trip)) => {
                        let rewritten = self.queue.confirm_create(&op.id, temp_id, &trip)?;
                        debug!(temp_id, server_id = %trip.id, rewritten, "trip confirmed by server");
                        pass.awaiting.remove(temp_id);
                        pass.confirmed.insert(temp_id.clone(), trip.id);
                        report.remapped += 1;
                    }
                    _ => {
                        self.queue.remove(&op.id)?;
                    }
                }
            }
            Err(e) => {
                warn!(op_id = %op.id, kind = %op.kind(), "queued operation failed: {}", e);
                report.failed += 1;
                if let Some(max) = self.max_op_attempts {
                    op.attempts += 1;
                    if op.attempts >= max {
                        warn!(op_id = %op.id, attempts = op.attempts, "moving operation to dead letters");
                        self.retire(&op, pass, report)?;
                    } else {
                        self.queue.replace(&op)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dead-letters `op` together with queued operations that depend on it.
    fn retire(
        &self,
        op: &PendingSyncOperation,
        pass: &mut PassState,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let dependents = self.queue.retire(op)?;
        report.dead_lettered += 1 + dependents.len();
        if let OpPayload::CreateTrip { temp_id, .. } = &op.payload {
            pass.awaiting.remove(temp_id);
        }
        if !dependents.is_empty() {
            warn!(op_id = %op.id, count = dependents.len(), "dependent operations moved to dead letters");
        }
        for dependent in dependents {
            if pass.queued.contains(&dependent.id) {
                report.failed += 1;
            }
            pass.retired.insert(dependent.id);
        }
        Ok(())
    }

    /// Replays one payload. Returns the created trip for `CreateTrip`.
    async fn dispatch(&self, payload: &OpPayload) -> Result<Option<Trip>, ClientError> {
        match payload {
            OpPayload::CreateTrip { trip, .. } => self.api.create_trip(trip).await.map(Some),
            OpPayload::UpdateTrip { trip_id, patch } => {
                self.api.update_trip(trip_id, patch).await.map(|_| None)
            }
            OpPayload::DeleteTrip { trip_id } => self.api.delete_trip(trip_id).await.map(|_| None),
            OpPayload::UpdateActivity {
                activity_id, patch, ..
            } => self
                .api
                .update_activity(activity_id, patch)
                .await
                .map(|_| None),
        }
    }
}

impl<T: Transport + 'static> SyncEngine<T> {
    /// Runs a pass on every offline→online transition of the monitor.
    pub fn spawn_auto_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut rx = self.monitor.watch();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if !online {
                    continue;
                }
                match engine.sync_data().await {
                    Ok(outcome) => info!("auto sync: {}", outcome),
                    Err(e) => error!("auto sync failed: {}", e),
                }
            }
        })
    }
}

/// Bookkeeping for one pass over the queue.
struct PassState {
    /// Ids of the operations the pass started with.
    queued: HashSet<String>,
    /// Temp ids whose `CreateTrip` is still queued.
    awaiting: HashSet<String>,
    /// Temp id to server id for creates confirmed this pass.
    confirmed: HashMap<String, String>,
    /// Operations already dead-lettered alongside the create they depend on.
    retired: HashSet<String>,
}

impl PassState {
    fn new(ops: &[PendingSyncOperation]) -> Self {
        PassState {
            queued: ops.iter().map(|op| op.id.clone()).collect(),
            awaiting: ops
                .iter()
                .filter(|op| op.kind() == OpKind::CreateEntity)
                .filter_map(|op| op.trip_id().map(str::to_string))
                .collect(),
            confirmed: HashMap::new(),
            retired: HashSet::new(),
        }
    }
}

/// Points references to confirmed temp ids at their server ids.
fn rewrite_ids(payload: &mut OpPayload, confirmed: &HashMap<String, String>) {
    let Some(current) = payload.trip_id().map(str::to_string) else {
        return;
    };
    if let Some(server_id) = confirmed.get(&current) {
        payload.remap_trip_id(&current, server_id);
    }
}
