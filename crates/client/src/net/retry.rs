// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded exponential backoff for single requests.

use std::time::Duration;

use rand::Rng;

/// Retry policy applied by the client to retryable failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound of the exponential part.
    pub max_delay: Duration,
    /// Upper bound of the random jitter added on top.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Retries immediately, for tests and local tooling.
    pub fn immediate(max_retries: u32) -> Self {
        RetryPolicy {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Exponential part of the delay before retry `attempt` (zero-based):
    /// `min(base * 2^attempt, max_delay)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retry `attempt`: backoff plus uniform jitter in `[0, max_jitter]`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.jitter()
    }

    /// Delay honouring a server-provided `Retry-After`, still capped at `max_delay`
    /// for the deterministic part.
    pub fn retry_delay_with_hint(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let floor = hint.map(|h| h.min(self.max_delay)).unwrap_or_default();
        self.backoff(attempt).max(floor) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
