// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed accessor over the durable pending-operation collection.
//!
//! The queue is a FIFO with no deduplication: two updates of the same trip
//! both replay, in the order they were made.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use tripsync_core::{ClockSource, DurableStore, OpPayload, PendingSyncOperation, Result, Trip};

/// Pending-operation queue backed by a [`DurableStore`].
#[derive(Clone)]
pub struct SyncQueue {
    store: Arc<DurableStore>,
    clock: Arc<dyn ClockSource>,
}

impl SyncQueue {
    pub fn new(store: Arc<DurableStore>, clock: Arc<dyn ClockSource>) -> Self {
        SyncQueue { store, clock }
    }

    /// Appends a mutation, assigning it a fresh id and timestamp.
    pub fn enqueue(&self, payload: OpPayload) -> Result<PendingSyncOperation> {
        let op = PendingSyncOperation::new(Uuid::new_v4().to_string(), payload, self.clock.now());
        self.store.append_pending_op(&op)?;
        debug!(op_id = %op.id, kind = %op.kind(), "queued operation");
        Ok(op)
    }

    /// All pending operations, oldest first.
    pub fn list(&self) -> Result<Vec<PendingSyncOperation>> {
        self.store.get_pending_ops()
    }

    /// Removes an operation. Returns false if it was not queued.
    pub fn remove(&self, id: &str) -> Result<bool> {
        self.store.remove_pending_op(id)
    }

    /// Overwrites a queued operation in place, keeping its FIFO position.
    pub fn replace(&self, op: &PendingSyncOperation) -> Result<bool> {
        self.store.replace_pending_op(op)
    }

    /// Drops a confirmed `CreateTrip` and points queued references to its
    /// temp id at the server's trip. Returns how many operations were rewritten.
    pub fn confirm_create(&self, op_id: &str, temp_id: &str, trip: &Trip) -> Result<usize> {
        self.store.confirm_created_trip(op_id, temp_id, trip)
    }

    /// Moves an operation to the dead-letter collection, along with queued
    /// operations that depend on it. Returns the dependents.
    pub fn retire(&self, op: &PendingSyncOperation) -> Result<Vec<PendingSyncOperation>> {
        self.store.retire_pending_op(op)
    }

    pub fn dead_letters(&self) -> Result<Vec<PendingSyncOperation>> {
        self.store.get_dead_letters()
    }

    /// Discards every dead letter, returning what was dropped.
    pub fn clear_dead_letters(&self) -> Result<Vec<PendingSyncOperation>> {
        let cleared = self.store.clear_dead_letters()?;
        debug!(count = cleared.len(), "cleared dead letters");
        Ok(cleared)
    }

    /// Puts every dead letter back on the queue for another round of attempts.
    pub fn requeue_dead_letters(&self) -> Result<usize> {
        let count = self.store.requeue_dead_letters()?;
        debug!(count, "requeued dead letters");
        Ok(count)
    }
}
