// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network layer for talking to the trip service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  ApiClient  │────►│  Transport  │────►│    Trip     │
//! │ (retry/auth)│◄────│   (trait)   │◄────│   service   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ Credential  │     │  Network    │◄──── ConnectivityProbe
//! │   Store     │     │  Monitor    │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Bearer credential and correlation id on every request
//! - Failure taxonomy with a retryable subset
//! - Bounded exponential backoff with jitter
//! - Edge-triggered online/offline notifications
//! - Injectable transport trait for testing

mod client;
mod credentials;
mod error;
mod monitor;
mod probe;
mod retry;
mod transport;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use credentials::{CredentialStore, FileCredentials, MemoryCredentials};
pub use error::{ClientError, ErrorKind};
pub use monitor::{ConnectivitySnapshot, NetworkMonitor};
pub use probe::{ConnectivityProbe, TcpProbe};
pub use retry::RetryPolicy;
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
    TransportResult,
};
