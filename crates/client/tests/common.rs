// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The binary, isolated to `temp` for state and config.
pub fn tripsync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("tripsync");
    cmd.env("TRIPSYNC_DATA_DIR", temp.path().join("state"))
        .env("TRIPSYNC_CONFIG", temp.path().join("config.toml"))
        .env_remove("TRIPSYNC_TOKEN")
        .env_remove("TRIPSYNC_API_URL")
        .env_remove("TRIPSYNC_LOG_FILE");
    cmd
}

/// Creates a trip offline and returns its temporary id.
pub fn create_offline(temp: &TempDir, destination: &str) -> String {
    let output = tripsync(temp)
        .args(["--offline", "create", destination])
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .find(|s| s.starts_with("[offline_"))
        .unwrap()
        .trim_matches(|c| c == '[' || c == ']')
        .to_string()
}
