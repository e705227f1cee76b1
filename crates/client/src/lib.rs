// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tripsync - offline-first client for a trip planning service.
//!
//! Reads are served from the server when reachable and from a local SQLite
//! cache when not. Edits made offline are applied to the cache, queued, and
//! replayed in order by the sync engine once the connection returns.
//!
//! # Main Components
//!
//! - [`TripRepository`] - online/offline facade used by front ends
//! - [`SyncEngine`] - replays the queue and reconciles the cache
//! - [`net`] - HTTP client with retries, error taxonomy, connectivity monitor
//! - [`TripApi`] - typed wrapper over the REST endpoints
//! - [`Config`] - file and environment configuration
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tripsync::{ApiClient, NetworkMonitor, ReqwestTransport, TripApi, TripRepository};
//!
//! let transport = ReqwestTransport::new("https://trips.example.com/api", timeout)?;
//! let api = Arc::new(TripApi::new(ApiClient::new(transport, credentials)));
//! let repo = TripRepository::new(api, store, monitor);
//! let trip = repo.create_trip(&NewTrip::new("Tokyo")).await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod net;
pub mod repository;
pub mod sync;

#[cfg(test)]
mod test_helpers;

pub use api::{ReplaceActivity, TripApi};
pub use cli::{ActivityCommand, ActivityFields, Cli, Command, OutputFormat, TripFields};
pub use config::Config;
pub use error::{Error, Result};
pub use net::{
    ApiClient, ClientError, ConnectivitySnapshot, ErrorKind, NetworkMonitor, ReqwestTransport,
    RetryPolicy,
};
pub use repository::TripRepository;
pub use sync::{SyncEngine, SyncOutcome, SyncReport};

use std::io::Write;

use commands::Context;

/// Execute a CLI invocation, writing command output to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::open(cli.offline).await?;
    let mut stdout = std::io::stdout().lock();
    let result = dispatch(&ctx, cli.command, &mut stdout).await;
    stdout.flush()?;
    result
}

async fn dispatch(ctx: &Context, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::List { output } => commands::trips::list(ctx, output, out).await,
        Command::Show { id, output } => commands::trips::show(ctx, &id, output, out).await,
        Command::Create {
            destination,
            fields,
            output,
        } => commands::trips::create(ctx, fields.into_new_trip(destination), output, out).await,
        Command::Update {
            id,
            destination,
            fields,
        } => commands::trips::update(ctx, &id, fields.into_patch(destination), out).await,
        Command::Delete { id } => commands::trips::delete(ctx, &id, out).await,
        Command::Optimize { id } => commands::trips::optimize(ctx, &id, out).await,
        Command::Activity(ActivityCommand::Update { id, fields }) => {
            commands::activity::update(ctx, &id, fields.into(), out).await
        }
        Command::Activity(ActivityCommand::Delete { id }) => {
            commands::activity::delete(ctx, &id, out).await
        }
        Command::Activity(ActivityCommand::Replace { id, reason }) => {
            commands::activity::replace(ctx, &id, reason, out).await
        }
        Command::Sync => commands::sync::sync(ctx, out).await,
        Command::Pending {
            dead: true,
            clear: true,
            ..
        } => commands::sync::clear_dead_letters(ctx, out),
        Command::Pending {
            dead: true,
            requeue: true,
            ..
        } => commands::sync::requeue_dead_letters(ctx, out),
        Command::Pending { dead, output, .. } => commands::sync::pending(ctx, dead, output, out),
        Command::Status { output } => commands::sync::status(ctx, output, out),
        Command::Watch { interval } => commands::sync::watch(ctx, interval, out).await,
    }
}
