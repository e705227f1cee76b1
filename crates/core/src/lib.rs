// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tripsync-core: Shared library for the tripsync offline-first client
//!
//! This crate provides the data model, the durable local store, and the
//! small primitives (clock, observer registry) used by the sync layer.

pub mod clock;
pub mod error;
pub mod observer;
pub mod op;
pub mod status;
pub mod store;
pub mod trip;

pub use clock::{ClockSource, SystemClock};
pub use error::{Error, Result};
pub use observer::{Listeners, Subscription};
pub use op::{OpKind, OpPayload, PendingSyncOperation};
pub use status::{SyncPhase, SyncStatus};
pub use store::DurableStore;
pub use trip::{Activity, ActivityPatch, NewTrip, Trip, TripPatch, TEMP_ID_PREFIX};
