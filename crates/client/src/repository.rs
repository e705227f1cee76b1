// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trip repository: the facade front ends talk to.
//!
//! Every mutating call branches on [`NetworkMonitor::is_online`]:
//!
//! - Online: call the server, write the result through to the cache, and
//!   propagate any classified error unchanged. A failed online call is never
//!   queued.
//! - Offline, queueable (create, update, delete, activity update): apply an
//!   optimistic change to the cache, queue the matching operation, and return
//!   without touching the network.
//! - Offline, online-only (activity replace and delete, optimize): fail with
//!   [`Error::UnavailableOffline`].

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use tripsync_core::trip::temp_id;
use tripsync_core::{
    Activity, ActivityPatch, ClockSource, DurableStore, NewTrip, OpPayload, PendingSyncOperation,
    SystemClock, Trip, TripPatch,
};

use crate::api::{ReplaceActivity, TripApi};
use crate::error::{Error, Result};
use crate::net::{NetworkMonitor, ReqwestTransport, Transport};
use crate::sync::SyncQueue;

/// Online/offline facade over the trip service and the local cache.
pub struct TripRepository<T: Transport = ReqwestTransport> {
    api: Arc<TripApi<T>>,
    store: Arc<DurableStore>,
    queue: SyncQueue,
    monitor: Arc<NetworkMonitor>,
    clock: Arc<dyn ClockSource>,
}

impl<T: Transport> TripRepository<T> {
    pub fn new(
        api: Arc<TripApi<T>>,
        store: Arc<DurableStore>,
        monitor: Arc<NetworkMonitor>,
    ) -> Self {
        let clock: Arc<dyn ClockSource> = Arc::new(SystemClock);
        TripRepository {
            queue: SyncQueue::new(Arc::clone(&store), Arc::clone(&clock)),
            api,
            store,
            monitor,
            clock,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.queue = SyncQueue::new(Arc::clone(&self.store), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    fn require_online(&self, operation: &'static str) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(Error::UnavailableOffline { operation })
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Trips
    // ─────────────────────────────────────────────────────────────────────

    /// Creates a trip. Offline, the returned trip carries a temporary id.
    pub async fn create_trip(&self, new_trip: &NewTrip) -> Result<Trip> {
        if new_trip.destination.trim().is_empty() {
            return Err(tripsync_core::Error::InvalidInput("destination is required".into()).into());
        }

        if self.is_online() {
            let trip = self.api.create_trip(new_trip).await?;
            self.store.save_trip(&trip)?;
            return Ok(trip);
        }

        let id = self.unused_temp_id()?;
        let trip = new_trip.to_trip(id.clone(), self.clock.now());
        self.store.save_trip(&trip)?;
        self.queue.enqueue(OpPayload::CreateTrip {
            temp_id: id,
            trip: new_trip.clone(),
        })?;
        debug!(trip_id = %trip.id, "trip created offline");
        Ok(trip)
    }

    /// Lists trips. Offline, serves the cache.
    pub async fn list_trips(&self) -> Result<Vec<Trip>> {
        if !self.is_online() {
            return Ok(self.store.get_trips()?);
        }
        let trips = self.api.list_trips().await?;
        self.store.upsert_trips(&trips)?;
        Ok(trips)
    }

    /// Fetches one trip. Offline, serves the cache.
    pub async fn get_trip(&self, id: &str) -> Result<Trip> {
        if !self.is_online() {
            return self.cached_trip(id);
        }
        let trip = self.api.get_trip(id).await?;
        self.store.save_trip(&trip)?;
        Ok(trip)
    }

    /// Updates a trip. Offline, the trip must be cached.
    pub async fn update_trip(&self, id: &str, patch: &TripPatch) -> Result<Trip> {
        if self.is_online() {
            let trip = self.api.update_trip(id, patch).await?;
            self.store.save_trip(&trip)?;
            return Ok(trip);
        }

        let mut trip = self.cached_trip(id)?;
        patch.apply(&mut trip);
        trip.updated_at = Some(self.clock.now());
        self.store.save_trip(&trip)?;
        self.queue.enqueue(OpPayload::UpdateTrip {
            trip_id: id.to_string(),
            patch: patch.clone(),
        })?;
        Ok(trip)
    }

    /// Deletes a trip. Offline, the trip leaves the cache immediately.
    pub async fn delete_trip(&self, id: &str) -> Result<()> {
        if self.is_online() {
            self.api.delete_trip(id).await?;
            self.store.delete_trip(id)?;
            return Ok(());
        }

        self.store.delete_trip(id)?;
        self.queue.enqueue(OpPayload::DeleteTrip {
            trip_id: id.to_string(),
        })?;
        Ok(())
    }

    /// Re-optimizes a trip's itinerary on the server.
    pub async fn optimize_trip(&self, id: &str) -> Result<Trip> {
        self.require_online("optimize trip")?;
        let trip = self.api.optimize_trip(id).await?;
        self.store.save_trip(&trip)?;
        Ok(trip)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Activities
    // ─────────────────────────────────────────────────────────────────────

    /// Updates an activity. Offline, the activity must be cached.
    pub async fn update_activity(&self, activity_id: &str, patch: &ActivityPatch) -> Result<Activity> {
        if self.is_online() {
            let activity = self.api.update_activity(activity_id, patch).await?;
            self.write_through_activity(activity_id, Some(activity.clone()))?;
            return Ok(activity);
        }

        let mut trip = self
            .trip_holding(activity_id)?
            .ok_or_else(|| tripsync_core::Error::ActivityNotFound(activity_id.to_string()))?;
        let mut activity = trip
            .activity(activity_id)
            .cloned()
            .ok_or_else(|| tripsync_core::Error::ActivityNotFound(activity_id.to_string()))?;
        patch.apply(&mut activity);
        trip.replace_activity(activity_id, activity.clone());
        self.store.save_trip(&trip)?;
        self.queue.enqueue(OpPayload::UpdateActivity {
            activity_id: activity_id.to_string(),
            trip_id: Some(trip.id.clone()),
            patch: patch.clone(),
        })?;
        Ok(activity)
    }

    /// Deletes an activity. There is no queued form of this operation.
    pub async fn delete_activity(&self, activity_id: &str) -> Result<()> {
        self.require_online("delete activity")?;
        self.api.delete_activity(activity_id).await?;
        self.write_through_activity(activity_id, None)?;
        Ok(())
    }

    /// Asks the server for an alternative to an activity.
    pub async fn replace_activity(
        &self,
        activity_id: &str,
        request: &ReplaceActivity,
    ) -> Result<Activity> {
        self.require_online("replace activity")?;
        let activity = self.api.replace_activity(activity_id, request).await?;
        self.write_through_activity(activity_id, Some(activity.clone()))?;
        Ok(activity)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Local state
    // ─────────────────────────────────────────────────────────────────────

    /// Cached trips, without touching the network.
    pub fn cached_trips(&self) -> Result<Vec<Trip>> {
        Ok(self.store.get_trips()?)
    }

    pub fn pending_operations(&self) -> Result<Vec<PendingSyncOperation>> {
        Ok(self.queue.list()?)
    }

    pub fn dead_letters(&self) -> Result<Vec<PendingSyncOperation>> {
        Ok(self.queue.dead_letters()?)
    }

    /// Drops every dead letter for good. Returns how many were dropped.
    pub fn clear_dead_letters(&self) -> Result<usize> {
        Ok(self.queue.clear_dead_letters()?.len())
    }

    /// Queues every dead letter again, attempts reset.
    pub fn requeue_dead_letters(&self) -> Result<usize> {
        Ok(self.queue.requeue_dead_letters()?)
    }

    pub fn last_sync(&self) -> Result<Option<chrono::DateTime<Utc>>> {
        Ok(self.store.get_last_sync()?)
    }

    fn cached_trip(&self, id: &str) -> Result<Trip> {
        self.store
            .get_trip(id)?
            .ok_or_else(|| tripsync_core::Error::TripNotFound(id.to_string()).into())
    }

    fn trip_holding(&self, activity_id: &str) -> Result<Option<Trip>> {
        Ok(self
            .store
            .get_trips()?
            .into_iter()
            .find(|t| t.activity(activity_id).is_some()))
    }

    /// Replaces (or with `None`, removes) a cached activity after a server call.
    /// Activities of uncached trips are ignored.
    fn write_through_activity(&self, activity_id: &str, activity: Option<Activity>) -> Result<()> {
        let Some(mut trip) = self.trip_holding(activity_id)? else {
            return Ok(());
        };
        match activity {
            Some(activity) => trip.replace_activity(activity_id, activity),
            None => trip.remove_activity(activity_id),
        };
        self.store.save_trip(&trip)?;
        Ok(())
    }

    /// A temporary id not yet used in the cache. Same-millisecond creates
    /// advance the timestamp until the id is free.
    fn unused_temp_id(&self) -> Result<String> {
        let taken: Vec<String> = self.store.get_trips()?.into_iter().map(|t| t.id).collect();
        let mut ms = self.clock.now_ms();
        loop {
            let id = temp_id(ms);
            if !taken.contains(&id) {
                return Ok(id);
            }
            ms += 1;
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
