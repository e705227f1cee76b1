// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tripsync_core::ActivityPatch;

use crate::api::ReplaceActivity;
use crate::display::format_activity_line;
use crate::error::{Error, Result};
use crate::net::Transport;

use super::trips::queued_note;
use super::Context;

pub async fn update<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    patch: ActivityPatch,
    out: &mut impl Write,
) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::Core(tripsync_core::Error::InvalidInput(
            "nothing to update\n  hint: pass at least one of --name, --day, --location, --start-time, --notes, --cost"
                .to_string(),
        )));
    }
    let activity = ctx.repo.update_activity(id, &patch).await?;
    writeln!(out, "Updated {}", format_activity_line(&activity))?;
    queued_note(ctx, out)
}

pub async fn delete<T: Transport>(ctx: &Context<T>, id: &str, out: &mut impl Write) -> Result<()> {
    ctx.repo.delete_activity(id).await?;
    writeln!(out, "Deleted activity {id}")?;
    Ok(())
}

pub async fn replace<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    reason: Option<String>,
    out: &mut impl Write,
) -> Result<()> {
    let activity = ctx
        .repo
        .replace_activity(id, &ReplaceActivity { reason })
        .await?;
    writeln!(out, "Replaced {id} with {}", format_activity_line(&activity))?;
    Ok(())
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
