// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use tripsync_core::{SyncPhase, SyncStatus};

use crate::cli::OutputFormat;
use crate::display::{format_op_line, format_status};
use crate::error::Result;
use crate::net::{ConnectivityProbe, TcpProbe, Transport};
use crate::sync::SyncOutcome;

use super::trips::queued_note;
use super::Context;

pub async fn sync<T: Transport>(ctx: &Context<T>, out: &mut impl Write) -> Result<()> {
    let outcome = ctx.engine.sync_data().await?;
    writeln!(out, "{outcome}")?;
    if let SyncOutcome::Synced(report) = &outcome {
        if report.is_partial() {
            writeln!(
                out,
                "  hint: failed operations stay queued; run `tripsync pending` to inspect them"
            )?;
        }
    }
    Ok(())
}

pub fn pending<T: Transport>(
    ctx: &Context<T>,
    dead: bool,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let ops = if dead {
        ctx.repo.dead_letters()?
    } else {
        ctx.repo.pending_operations()?
    };
    match output {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&ops)?)?,
        OutputFormat::Text if ops.is_empty() => {
            let what = if dead { "dead letters" } else { "pending operations" };
            writeln!(out, "No {what}")?;
        }
        OutputFormat::Text => {
            for op in &ops {
                writeln!(out, "{}", format_op_line(op))?;
            }
        }
    }
    Ok(())
}

pub fn clear_dead_letters<T: Transport>(ctx: &Context<T>, out: &mut impl Write) -> Result<()> {
    let count = ctx.repo.clear_dead_letters()?;
    writeln!(out, "Cleared {count} dead letter(s)")?;
    Ok(())
}

pub fn requeue_dead_letters<T: Transport>(ctx: &Context<T>, out: &mut impl Write) -> Result<()> {
    let count = ctx.repo.requeue_dead_letters()?;
    writeln!(out, "Requeued {count} operation(s)")?;
    if count > 0 {
        queued_note(ctx, out)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusReport {
    online: bool,
    pending: usize,
    dead_letters: usize,
    last_sync: Option<DateTime<Utc>>,
    sync: SyncStatus,
}

pub fn status<T: Transport>(
    ctx: &Context<T>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let report = StatusReport {
        online: ctx.monitor.is_online(),
        pending: ctx.repo.pending_operations()?.len(),
        dead_letters: ctx.repo.dead_letters()?.len(),
        last_sync: ctx.repo.last_sync()?,
        sync: ctx.engine.status(),
    };
    match output {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        OutputFormat::Text => writeln!(
            out,
            "{}",
            format_status(
                report.online,
                report.pending,
                report.dead_letters,
                report.last_sync,
                report.sync
            )
        )?,
    }
    Ok(())
}

/// Probes the API host every `interval` and syncs on reconnect until Ctrl-C.
pub async fn watch<T: Transport + 'static>(
    ctx: &Context<T>,
    interval: Option<u64>,
    out: &mut impl Write,
) -> Result<()> {
    let interval = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| ctx.config.probe_interval());
    let probe: Option<Arc<dyn ConnectivityProbe>> = if ctx.offline {
        None
    } else {
        match TcpProbe::for_url(&ctx.config.api_url, ctx.config.probe_timeout()) {
            Some(probe) => Some(Arc::new(probe)),
            None => {
                warn!("cannot probe {}, connectivity will not be tracked", ctx.config.api_url);
                None
            }
        }
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    watch_until(ctx, probe, interval, shutdown, out).await
}

/// Runs the watch loop until `shutdown` resolves.
pub(crate) async fn watch_until<T, F>(
    ctx: &Context<T>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
    interval: Duration,
    shutdown: F,
    out: &mut impl Write,
) -> Result<()>
where
    T: Transport + 'static,
    F: Future<Output = ()>,
{
    let (tx, mut statuses) = mpsc::unbounded_channel();
    let _subscription = ctx.engine.subscribe(move |status| {
        let _ = tx.send(*status);
    });
    let mut online = ctx.monitor.watch();
    let auto_sync = ctx.engine.spawn_auto_sync();
    let probing = probe.map(|probe| ctx.monitor.spawn_probe(probe, interval));

    writeln!(out, "Watching for connectivity changes (Ctrl-C to stop)")?;
    if ctx.monitor.is_online() {
        match ctx.engine.sync_data().await {
            Ok(outcome) => writeln!(out, "{outcome}")?,
            Err(e) => writeln!(out, "sync failed: {e}")?,
        }
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            Some(status) = statuses.recv() => match status.status {
                SyncPhase::Syncing if status.progress == 0 => writeln!(out, "Syncing...")?,
                SyncPhase::Completed => writeln!(out, "Sync completed")?,
                SyncPhase::Failed => writeln!(out, "Sync failed at {}%", status.progress)?,
                _ => {}
            },
            Ok(()) = online.changed() => {
                let now_online = *online.borrow_and_update();
                writeln!(out, "Network: {}", if now_online { "online" } else { "offline" })?;
            }
            _ = &mut shutdown => break,
        }
        out.flush()?;
    }

    auto_sync.abort();
    if let Some(probing) = probing {
        probing.abort();
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
