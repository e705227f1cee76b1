// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Classified request failures.
//!
//! Raw transport failures and non-2xx responses are mapped onto a small
//! taxonomy at the client's inbound boundary. Callers branch on
//! [`ClientError::kind`] or [`ClientError::is_retryable`], never on raw
//! status codes.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// The error classes of the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Server,
    RateLimited,
    Auth,
    Validation,
    Unknown,
}

impl ErrorKind {
    /// Returns true for classes worth retrying with backoff.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server | ErrorKind::RateLimited
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Server => "server",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Auth => "auth",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A classified request failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// The request was sent but no response came back.
    #[error("network error: {0}\n  hint: check your connection; the request will be retried")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// 5xx response.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 429 response.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// 401 response. Stored credentials have been cleared.
    #[error("authentication required: {0}\n  hint: sign in again")]
    Auth(String),

    /// Any other 4xx response.
    #[error("request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Anything that fits no other class.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl ClientError {
    /// Returns the error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::RateLimited { .. } => ErrorKind::RateLimited,
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Returns true if the request may succeed when sent again.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Classifies a non-2xx response.
    ///
    /// Returns `None` for 2xx statuses.
    pub fn from_response(status: u16, body: &Value, retry_after: Option<Duration>) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        let message = response_message(status, body);
        let err = match status {
            401 => ClientError::Auth(message),
            429 => ClientError::RateLimited {
                message,
                retry_after,
            },
            500..=599 => ClientError::Server { status, message },
            400..=499 => ClientError::Validation { status, message },
            _ => ClientError::Unknown(format!("unexpected status {status}: {message}")),
        };
        Some(err)
    }
}

/// Extracts a human-readable message from an error body.
fn response_message(status: u16, body: &Value) -> String {
    let field = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str);

    match (field, body) {
        (Some(msg), _) => msg.to_string(),
        (None, Value::String(text)) if !text.trim().is_empty() => truncate(text, 200),
        _ => format!("HTTP {status}"),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}... (truncated)")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
