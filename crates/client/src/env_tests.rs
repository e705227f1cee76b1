// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::TRIPSYNC_CONFIG, "TRIPSYNC_CONFIG");
    assert_eq!(vars::TRIPSYNC_API_URL, "TRIPSYNC_API_URL");
    assert_eq!(vars::TRIPSYNC_DATA_DIR, "TRIPSYNC_DATA_DIR");
    assert_eq!(vars::TRIPSYNC_TOKEN, "TRIPSYNC_TOKEN");
    assert_eq!(vars::TRIPSYNC_LOG_FILE, "TRIPSYNC_LOG_FILE");
}

// Each test owns one variable so parallel tests do not interfere.

#[test]
fn test_token_set_and_blank() {
    std::env::set_var("TRIPSYNC_TOKEN", "abc");
    assert_eq!(token().as_deref(), Some("abc"));
    std::env::set_var("TRIPSYNC_TOKEN", "   ");
    assert!(token().is_none());
    std::env::remove_var("TRIPSYNC_TOKEN");
    assert!(token().is_none());
}

#[test]
fn test_log_file_set() {
    std::env::set_var("TRIPSYNC_LOG_FILE", "/tmp/tripsync.log");
    assert_eq!(log_file(), Some(PathBuf::from("/tmp/tripsync.log")));
    std::env::remove_var("TRIPSYNC_LOG_FILE");
    assert!(log_file().is_none());
}
