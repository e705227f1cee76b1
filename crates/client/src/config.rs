// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `TRIPSYNC_CONFIG`, or from
//! `<config dir>/tripsync/config.toml`, and includes:
//! - `api_url`: base URL of the trip service
//! - `request_timeout_secs`: per-request timeout
//! - `data_dir`: where the local store and credentials live
//! - `[retry]`: request backoff
//! - `[sync]`: queue retry ceiling and connectivity probing
//!
//! A missing file means defaults. `TRIPSYNC_API_URL` and `TRIPSYNC_DATA_DIR`
//! override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};
use crate::net::RetryPolicy;

const APP_DIR_NAME: &str = "tripsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "tripsync.db";
const TOKEN_FILE_NAME: &str = "token";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the trip service, e.g. `https://api.example.com/api`.
    pub api_url: String,
    /// Per-request timeout in seconds (default: 30).
    pub request_timeout_secs: u64,
    /// Directory for the local store and credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub retry: RetryConfig,
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
            data_dir: None,
            retry: RetryConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Request retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 3).
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds (default: 1000).
    pub base_delay_ms: u64,
    /// Cap of the exponential delay in milliseconds (default: 10000).
    pub max_delay_ms: u64,
    /// Upper bound of the random jitter in milliseconds (default: 1000).
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            max_jitter_ms: 1_000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_jitter: Duration::from_millis(self.max_jitter_ms),
        }
    }
}

/// Sync engine and connectivity settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed replays before an operation is dead-lettered. Absent means never.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_op_attempts: Option<u32>,
    /// Seconds between connectivity probes in `watch` (default: 15).
    pub probe_interval_secs: u64,
    /// Connect timeout of one probe in milliseconds (default: 3000).
    pub probe_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_op_attempts: None,
            probe_interval_secs: 15,
            probe_timeout_ms: 3_000,
        }
    }
}

impl Config {
    /// Loads the configuration from the environment-selected or default path,
    /// then applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::config_path().or_else(default_config_path);
        let mut config = match path {
            Some(path) => Config::load_from(&path)?,
            None => Config::default(),
        };
        config.apply_overrides(env::api_url(), env::data_dir());
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Applies values that take precedence over the file.
    pub fn apply_overrides(&mut self, api_url: Option<String>, data_dir: Option<PathBuf>) {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir);
        }
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "invalid api_url '{}': must start with http:// or https://",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::Config(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.sync.probe_interval_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.sync.probe_timeout_ms)
    }

    /// Directory for local state.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(".tripsync"))
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE_NAME)
    }

    pub fn token_path(&self) -> PathBuf {
        self.data_dir().join(TOKEN_FILE_NAME)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
