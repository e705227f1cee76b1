// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe for status and connectivity events.
//!
//! [`Listeners::subscribe`] hands back a [`Subscription`]; dropping it (or
//! calling [`Subscription::unsubscribe`]) removes the callback. Callbacks run
//! synchronously on the notifying task, outside the registry lock.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback<T>>,
}

/// A set of callbacks notified with values of type `T`.
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: BTreeMap::new(),
            })),
        }
    }

    /// Registers a callback. It stays registered while the returned handle lives.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = match self.registry.lock() {
            Ok(mut registry) => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.callbacks.insert(id, Arc::new(callback));
                id
            }
            Err(_) => {
                tracing::warn!("listener registry poisoned, subscription ignored");
                return Subscription { cancel: None };
            }
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    if let Ok(mut registry) = registry.lock() {
                        registry.callbacks.remove(&id);
                    }
                }
            })),
        }
    }

    /// Invokes every registered callback in subscription order.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = match self.registry.lock() {
            Ok(registry) => registry.callbacks.values().cloned().collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.callbacks.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Removes the callback.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
