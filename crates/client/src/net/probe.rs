// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability probes feeding the network monitor.

use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;

use super::monitor::ConnectivitySnapshot;

/// Source of connectivity reports.
pub trait ConnectivityProbe: Send + Sync {
    fn check(&self) -> Pin<Box<dyn Future<Output = ConnectivitySnapshot> + Send + '_>>;
}

/// Probes by opening a TCP connection to the API host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
        }
    }

    /// Builds a probe for the host and port of an HTTP(S) URL.
    pub fn for_url(url: &str, timeout: Duration) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let port = parsed.port_or_known_default()?;
        Some(TcpProbe::new(format!("{host}:{port}"), timeout))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = ConnectivitySnapshot> + Send + '_>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
                Ok(Ok(_)) => ConnectivitySnapshot::online(),
                // A refusal proves the link works even though the host does not answer.
                Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => ConnectivitySnapshot {
                    connected: true,
                    reachable: Some(false),
                },
                Ok(Err(e)) => {
                    tracing::debug!("probe of {} failed: {}", self.addr, e);
                    ConnectivitySnapshot::offline()
                }
                Err(_) => ConnectivitySnapshot {
                    connected: true,
                    reachable: Some(false),
                },
            }
        })
    }
}
