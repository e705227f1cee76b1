// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::net::ClientError;
use crate::sync::SyncError;

/// All possible errors that can occur in the tripsync library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] tripsync_core::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("{operation} is unavailable offline\n  hint: reconnect and try again; this operation needs the server")]
    UnavailableOffline { operation: &'static str },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns the classified request failure, if this is one.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Client(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized Result type for tripsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
