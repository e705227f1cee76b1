// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tripsync-core operations.

use thiserror::Error;

/// All possible errors that can occur in tripsync-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("trip not found: {0}")]
    TripNotFound(String),

    #[error("activity not found: {0}\n  hint: the activity must be in the local cache to edit it offline")]
    ActivityNotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data in store: {0}")]
    CorruptedData(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// A specialized Result type for tripsync-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
