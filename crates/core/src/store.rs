// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable key-value store.
//!
//! The [`DurableStore`] holds independent JSON blobs under distinct keys:
//! the trip cache, the pending-operation queue, the last-sync timestamp and
//! the dead-letter list. Each mutation of a blob is a read-modify-write inside
//! one transaction while the connection lock is held.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::op::{OpPayload, PendingSyncOperation};
use crate::trip::Trip;

/// SQL schema for the key-value table.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Key of the cached trip list.
pub const TRIPS_KEY: &str = "trips";
/// Key of the pending-operation queue.
pub const PENDING_OPS_KEY: &str = "pending_sync_ops";
/// Key of the last successful sync timestamp.
pub const LAST_SYNC_KEY: &str = "last_sync_at";
/// Key of operations retired by the retry ceiling.
pub const DEAD_LETTER_KEY: &str = "dead_letter_ops";

/// Persisted local state.
pub struct DurableStore {
    conn: Mutex<Connection>,
}

impl DurableStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Self::from_connection(conn)
    }

    /// Opens a throwaway store held in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(DurableStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Trip cache
    // ─────────────────────────────────────────────────────────────────────

    /// Returns every cached trip.
    pub fn get_trips(&self) -> Result<Vec<Trip>> {
        let conn = self.lock()?;
        Ok(read_blob(&conn, TRIPS_KEY)?.unwrap_or_default())
    }

    /// Returns a cached trip by id.
    pub fn get_trip(&self, id: &str) -> Result<Option<Trip>> {
        Ok(self.get_trips()?.into_iter().find(|t| t.id == id))
    }

    /// Replaces the whole cache.
    pub fn save_trips(&self, trips: &[Trip]) -> Result<()> {
        let conn = self.lock()?;
        write_blob(&conn, TRIPS_KEY, &trips)
    }

    /// Inserts a trip, or replaces the cached trip with the same id.
    pub fn save_trip(&self, trip: &Trip) -> Result<()> {
        self.upsert_trips(std::slice::from_ref(trip))
    }

    /// Upserts a batch of trips in one write, keeping cached trips not in the batch.
    pub fn upsert_trips(&self, incoming: &[Trip]) -> Result<()> {
        self.update_blob(TRIPS_KEY, |trips: &mut Vec<Trip>| upsert_all(trips, incoming))
    }

    /// Removes a trip from the cache. Returns true if it was present.
    pub fn delete_trip(&self, id: &str) -> Result<bool> {
        self.update_blob(TRIPS_KEY, |trips: &mut Vec<Trip>| {
            let before = trips.len();
            trips.retain(|t| t.id != id);
            trips.len() != before
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pending operations
    // ─────────────────────────────────────────────────────────────────────

    /// Returns queued operations in FIFO order.
    pub fn get_pending_ops(&self) -> Result<Vec<PendingSyncOperation>> {
        let conn = self.lock()?;
        Ok(read_blob(&conn, PENDING_OPS_KEY)?.unwrap_or_default())
    }

    /// Appends an operation at the tail of the queue.
    pub fn append_pending_op(&self, op: &PendingSyncOperation) -> Result<()> {
        self.update_blob(PENDING_OPS_KEY, |ops: &mut Vec<PendingSyncOperation>| {
            ops.push(op.clone());
        })
    }

    /// Removes a queued operation by id. Returns true if it was present.
    pub fn remove_pending_op(&self, id: &str) -> Result<bool> {
        self.update_blob(PENDING_OPS_KEY, |ops: &mut Vec<PendingSyncOperation>| {
            let before = ops.len();
            ops.retain(|op| op.id != id);
            ops.len() != before
        })
    }

    /// Overwrites a queued operation in place, keeping its queue position.
    ///
    /// Returns false if no operation with that id is queued.
    pub fn replace_pending_op(&self, op: &PendingSyncOperation) -> Result<bool> {
        self.update_blob(PENDING_OPS_KEY, |ops: &mut Vec<PendingSyncOperation>| {
            match ops.iter_mut().find(|o| o.id == op.id) {
                Some(slot) => {
                    *slot = op.clone();
                    true
                }
                None => false,
            }
        })
    }

    /// Records the server's acceptance of a queued `CreateTrip` atomically.
    ///
    /// Drops the op, points every queued reference to `temp_id` at the server
    /// id, and swaps the cached temp record for `trip`. Returns how many
    /// queued operations were rewritten.
    pub fn confirm_created_trip(&self, op_id: &str, temp_id: &str, trip: &Trip) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut ops: Vec<PendingSyncOperation> =
            read_blob(&tx, PENDING_OPS_KEY)?.unwrap_or_default();
        ops.retain(|o| o.id != op_id);
        let rewritten = ops
            .iter_mut()
            .map(|o| o.payload.remap_trip_id(temp_id, &trip.id))
            .filter(|changed| *changed)
            .count();
        let mut trips: Vec<Trip> = read_blob(&tx, TRIPS_KEY)?.unwrap_or_default();
        trips.retain(|t| t.id != temp_id);
        upsert_all(&mut trips, std::slice::from_ref(trip));
        write_blob(&tx, PENDING_OPS_KEY, &ops)?;
        write_blob(&tx, TRIPS_KEY, &trips)?;
        tx.commit()?;
        Ok(rewritten)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dead letters
    // ─────────────────────────────────────────────────────────────────────

    /// Returns operations retired after exhausting their attempts.
    pub fn get_dead_letters(&self) -> Result<Vec<PendingSyncOperation>> {
        let conn = self.lock()?;
        Ok(read_blob(&conn, DEAD_LETTER_KEY)?.unwrap_or_default())
    }

    /// Moves an operation from the queue to the dead-letter list atomically.
    ///
    /// Retiring a `CreateTrip` also retires every queued operation that still
    /// names its temp id. Returns those dependents in queue order, not
    /// including `op` itself.
    pub fn retire_pending_op(&self, op: &PendingSyncOperation) -> Result<Vec<PendingSyncOperation>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let ops: Vec<PendingSyncOperation> =
            read_blob(&tx, PENDING_OPS_KEY)?.unwrap_or_default();
        let orphaned_id = match &op.payload {
            OpPayload::CreateTrip { temp_id, .. } => Some(temp_id.as_str()),
            _ => None,
        };
        let (dependents, kept): (Vec<_>, Vec<_>) = ops
            .into_iter()
            .filter(|o| o.id != op.id)
            .partition(|o| orphaned_id.is_some() && o.trip_id() == orphaned_id);
        let mut dead: Vec<PendingSyncOperation> =
            read_blob(&tx, DEAD_LETTER_KEY)?.unwrap_or_default();
        dead.push(op.clone());
        dead.extend(dependents.iter().cloned());
        write_blob(&tx, PENDING_OPS_KEY, &kept)?;
        write_blob(&tx, DEAD_LETTER_KEY, &dead)?;
        tx.commit()?;
        Ok(dependents)
    }

    /// Empties the dead-letter list, returning what it held.
    pub fn clear_dead_letters(&self) -> Result<Vec<PendingSyncOperation>> {
        self.update_blob(DEAD_LETTER_KEY, |dead: &mut Vec<PendingSyncOperation>| {
            std::mem::take(dead)
        })
    }

    /// Moves every dead letter back to the tail of the queue with its attempt
    /// count reset. Returns how many were requeued.
    pub fn requeue_dead_letters(&self) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let dead: Vec<PendingSyncOperation> =
            read_blob(&tx, DEAD_LETTER_KEY)?.unwrap_or_default();
        let mut ops: Vec<PendingSyncOperation> =
            read_blob(&tx, PENDING_OPS_KEY)?.unwrap_or_default();
        let count = dead.len();
        ops.extend(dead.into_iter().map(|mut op| {
            op.attempts = 0;
            op
        }));
        write_blob(&tx, PENDING_OPS_KEY, &ops)?;
        write_blob(&tx, DEAD_LETTER_KEY, &Vec::<PendingSyncOperation>::new())?;
        tx.commit()?;
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Last sync
    // ─────────────────────────────────────────────────────────────────────

    /// Returns when the last sync pass finished, if ever.
    pub fn get_last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        read_blob(&conn, LAST_SYNC_KEY)
    }

    /// Records when a sync pass finished.
    pub fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        write_blob(&conn, LAST_SYNC_KEY, &at)
    }

    /// Read-modify-write of one blob inside a transaction.
    fn update_blob<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> R,
    {
        let mut conn = self.lock()?;
        let tx: Transaction<'_> = conn.transaction()?;
        let mut value: T = read_blob(&tx, key)?.unwrap_or_default();
        let result = f(&mut value);
        write_blob(&tx, key, &value)?;
        tx.commit()?;
        Ok(result)
    }
}

/// Replaces trips in place by id and appends the ones not yet cached.
fn upsert_all(trips: &mut Vec<Trip>, incoming: &[Trip]) {
    let mut positions: HashMap<String, usize> = trips
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();
    for trip in incoming {
        match positions.get(&trip.id).and_then(|&i| trips.get_mut(i)) {
            Some(slot) => *slot = trip.clone(),
            None => {
                positions.insert(trip.id.clone(), trips.len());
                trips.push(trip.clone());
            }
        }
    }
}

fn read_blob<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;

    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::CorruptedData(format!("invalid value under '{key}': {e}"))),
    }
}

fn write_blob<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, json, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
