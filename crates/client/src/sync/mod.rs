// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline sync for trip mutations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SyncEngine  │────►│   TripApi   │────►│    Trip     │
//! │  (drain +   │◄────│ (ApiClient) │◄────│   service   │
//! │  reconcile) │     └─────────────┘     └─────────────┘
//! └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  SyncQueue  │  (pending operations, durable)
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - FIFO replay, strictly sequential
//! - Best-effort passes: a failing operation stays queued, the rest proceed
//! - Wholesale cache overwrite from the server after every pass
//! - Temporary ids swapped for server ids as soon as a create succeeds
//! - Optional attempt ceiling with a dead-letter list
//! - Auto sync on offline→online transitions

mod engine;
mod queue;

pub use engine::{SyncEngine, SyncError, SyncOutcome, SyncReport};
pub use queue::SyncQueue;

#[cfg(test)]
mod engine_tests;
