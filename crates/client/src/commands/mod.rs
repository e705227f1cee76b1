// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod activity;
pub mod sync;
pub mod trips;

use std::sync::Arc;

use tracing::{debug, info};

use tripsync_core::DurableStore;

use crate::api::TripApi;
use crate::config::Config;
use crate::env;
use crate::error::{Error, Result};
use crate::net::{
    ApiClient, ConnectivityProbe, ConnectivitySnapshot, CredentialStore, FileCredentials,
    MemoryCredentials, NetworkMonitor, ReqwestTransport, TcpProbe, Transport,
};
use crate::repository::TripRepository;
use crate::sync::SyncEngine;

/// Everything a command needs, wired once per invocation.
pub struct Context<T: Transport = ReqwestTransport> {
    pub config: Config,
    pub repo: TripRepository<T>,
    pub engine: Arc<SyncEngine<T>>,
    pub monitor: Arc<NetworkMonitor>,
    /// Set by `--offline`: the monitor stays pinned offline.
    pub offline: bool,
}

impl Context {
    /// Loads configuration and opens the store, credentials and network stack.
    ///
    /// Unless `offline` is set, a single reachability probe against the API
    /// host decides the initial connectivity.
    pub async fn open(offline: bool) -> Result<Self> {
        let config = Config::load()?;
        let store = Arc::new(DurableStore::open(&config.db_path())?);

        let credentials: Arc<dyn CredentialStore> = match env::token() {
            Some(token) => Arc::new(MemoryCredentials::with_token(token)),
            None => Arc::new(FileCredentials::new(&config.token_path())),
        };
        let transport = ReqwestTransport::new(&config.api_url, config.request_timeout())
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        let client = ApiClient::new(transport, credentials).with_retry(config.retry.policy());
        let api = Arc::new(TripApi::new(client));

        let initial = if offline {
            ConnectivitySnapshot::offline()
        } else {
            match TcpProbe::for_url(&config.api_url, config.probe_timeout()) {
                Some(probe) => probe.check().await,
                None => ConnectivitySnapshot::online(),
            }
        };
        debug!(online = initial.is_online(), "initial connectivity");
        let monitor = Arc::new(NetworkMonitor::new(initial));

        info!(api_url = %config.api_url, data_dir = %config.data_dir().display(), "context opened");
        Ok(Context::new(config, api, store, monitor, offline))
    }
}

impl<T: Transport> Context<T> {
    pub fn new(
        config: Config,
        api: Arc<TripApi<T>>,
        store: Arc<DurableStore>,
        monitor: Arc<NetworkMonitor>,
        offline: bool,
    ) -> Self {
        let repo = TripRepository::new(Arc::clone(&api), Arc::clone(&store), Arc::clone(&monitor));
        let engine = SyncEngine::new(api, store, Arc::clone(&monitor))
            .with_max_op_attempts(config.sync.max_op_attempts);
        Context {
            config,
            repo,
            engine: Arc::new(engine),
            monitor,
            offline,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
