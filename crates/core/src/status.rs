// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transient sync status broadcast to listeners. Never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the sync engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
    Completed,
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Syncing => "syncing",
            SyncPhase::Completed => "completed",
            SyncPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Snapshot of sync progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub status: SyncPhase,
    /// Percentage of the current pass, 0 to 100.
    pub progress: u8,
}

impl SyncStatus {
    pub fn idle() -> Self {
        SyncStatus::default()
    }

    pub fn syncing(progress: u8) -> Self {
        SyncStatus {
            status: SyncPhase::Syncing,
            progress: progress.min(100),
        }
    }

    pub fn completed() -> Self {
        SyncStatus {
            status: SyncPhase::Completed,
            progress: 100,
        }
    }

    pub fn failed(progress: u8) -> Self {
        SyncStatus {
            status: SyncPhase::Failed,
            progress: progress.min(100),
        }
    }

    /// Progress after finishing operation `index` (zero-based) of `total`.
    pub fn progress_of(index: usize, total: usize) -> u8 {
        if total == 0 {
            return 100;
        }
        let pct = ((index + 1) as f64 / total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}
