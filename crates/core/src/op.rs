// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending sync operations.
//!
//! Every mutation made while offline is recorded as a [`PendingSyncOperation`]
//! and replayed against the trip service, in FIFO order, on the next sync pass.
//! Ops are:
//!
//! - Serializable: persisted in the durable store between runs
//! - Self-contained: the payload carries everything the remote call needs
//! - Never deduplicated: two updates of the same trip both replay, in order

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trip::{ActivityPatch, NewTrip, TripPatch};

/// The four queueable mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    CreateEntity,
    UpdateEntity,
    DeleteEntity,
    UpdateSubresource,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::CreateEntity => "create_trip",
            OpKind::UpdateEntity => "update_trip",
            OpKind::DeleteEntity => "delete_trip",
            OpKind::UpdateSubresource => "update_activity",
        };
        f.write_str(s)
    }
}

/// Payload describing the mutation to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpPayload {
    /// Create a trip that currently exists locally under `temp_id`.
    CreateTrip { temp_id: String, trip: NewTrip },

    /// Update a trip.
    UpdateTrip { trip_id: String, patch: TripPatch },

    /// Delete a trip.
    DeleteTrip { trip_id: String },

    /// Update an activity.
    UpdateActivity {
        activity_id: String,
        /// The trip holding the activity when it was edited, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trip_id: Option<String>,
        patch: ActivityPatch,
    },
}

impl OpPayload {
    /// Returns the mutation kind.
    pub fn kind(&self) -> OpKind {
        match self {
            OpPayload::CreateTrip { .. } => OpKind::CreateEntity,
            OpPayload::UpdateTrip { .. } => OpKind::UpdateEntity,
            OpPayload::DeleteTrip { .. } => OpKind::DeleteEntity,
            OpPayload::UpdateActivity { .. } => OpKind::UpdateSubresource,
        }
    }

    /// Returns the trip id this payload refers to, if any.
    ///
    /// For `CreateTrip` this is the temporary id.
    pub fn trip_id(&self) -> Option<&str> {
        match self {
            OpPayload::CreateTrip { temp_id, .. } => Some(temp_id),
            OpPayload::UpdateTrip { trip_id, .. } => Some(trip_id),
            OpPayload::DeleteTrip { trip_id } => Some(trip_id),
            OpPayload::UpdateActivity { trip_id, .. } => trip_id.as_deref(),
        }
    }

    /// Rewrites references to `from` so they point at `to`.
    ///
    /// `CreateTrip` is never rewritten: its temp id names the local record it created.
    /// Returns true if anything changed.
    pub fn remap_trip_id(&mut self, from: &str, to: &str) -> bool {
        let slot = match self {
            OpPayload::CreateTrip { .. } => None,
            OpPayload::UpdateTrip { trip_id, .. } => Some(trip_id),
            OpPayload::DeleteTrip { trip_id } => Some(trip_id),
            OpPayload::UpdateActivity { trip_id, .. } => trip_id.as_mut(),
        };
        match slot {
            Some(id) if id == from => {
                *id = to.to_string();
                true
            }
            _ => false,
        }
    }
}

/// A queued mutation awaiting replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSyncOperation {
    /// Unique id of this queue entry.
    pub id: String,
    #[serde(flatten)]
    pub payload: OpPayload,
    /// When the operation was queued.
    pub enqueued_at: DateTime<Utc>,
    /// Failed replay attempts. Only tracked when a retry ceiling is configured.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub attempts: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl PendingSyncOperation {
    /// Creates a new queue entry.
    pub fn new(id: impl Into<String>, payload: OpPayload, enqueued_at: DateTime<Utc>) -> Self {
        PendingSyncOperation {
            id: id.into(),
            payload,
            enqueued_at,
            attempts: 0,
        }
    }

    /// Returns the mutation kind.
    pub fn kind(&self) -> OpKind {
        self.payload.kind()
    }

    /// Returns the trip id this operation refers to, if any.
    pub fn trip_id(&self) -> Option<&str> {
        self.payload.trip_id()
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
