// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking.
//!
//! The monitor reduces platform connectivity reports to one boolean and
//! notifies listeners only when that boolean changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

use tripsync_core::{Listeners, Subscription};

use super::probe::ConnectivityProbe;

/// One connectivity report from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectivitySnapshot {
    /// An interface is up.
    pub connected: bool,
    /// The internet is known reachable (`Some(true)`), known unreachable
    /// (`Some(false)`), or not yet determined (`None`).
    pub reachable: Option<bool>,
}

impl ConnectivitySnapshot {
    pub fn online() -> Self {
        ConnectivitySnapshot {
            connected: true,
            reachable: Some(true),
        }
    }

    pub fn offline() -> Self {
        ConnectivitySnapshot {
            connected: false,
            reachable: None,
        }
    }

    /// Unknown reachability counts as online.
    pub fn is_online(&self) -> bool {
        self.connected && self.reachable != Some(false)
    }
}

/// Tracks whether the device is online.
pub struct NetworkMonitor {
    state: watch::Sender<bool>,
    listeners: Listeners<bool>,
}

impl NetworkMonitor {
    pub fn new(initial: ConnectivitySnapshot) -> Self {
        let (state, _) = watch::channel(initial.is_online());
        NetworkMonitor {
            state,
            listeners: Listeners::new(),
        }
    }

    /// Feeds a platform report. Returns true if the online state flipped.
    pub fn update(&self, snapshot: ConnectivitySnapshot) -> bool {
        let online = snapshot.is_online();
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "network state changed");
            self.listeners.notify(&online);
        }
        changed
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Registers a transition callback. Dropping the handle unsubscribes.
    pub fn add_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Receiver that observes every transition.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Waits until online or until `timeout` elapses.
    ///
    /// Returns true immediately when already online.
    pub async fn wait_for_online(&self, timeout: Duration) -> bool {
        if self.is_online() {
            return true;
        }
        let mut rx = self.watch();
        let reached = matches!(
            tokio::time::timeout(timeout, rx.wait_for(|online| *online)).await,
            Ok(Ok(_))
        );
        reached
    }

    /// Polls `probe` every `interval` and feeds the results into the monitor.
    pub fn spawn_probe(
        self: &Arc<Self>,
        probe: Arc<dyn ConnectivityProbe>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let snapshot = probe.check().await;
                monitor.update(snapshot);
            }
        })
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(ConnectivitySnapshot::online())
    }
}
