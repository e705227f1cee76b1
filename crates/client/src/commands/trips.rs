// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tripsync_core::{NewTrip, Trip, TripPatch};

use crate::cli::OutputFormat;
use crate::display::{format_trip_details, format_trip_line};
use crate::error::{Error, Result};
use crate::net::Transport;

use super::Context;

pub async fn list<T: Transport>(
    ctx: &Context<T>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let trips = ctx.repo.list_trips().await?;
    match output {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&trips)?)?,
        OutputFormat::Text => {
            if trips.is_empty() {
                writeln!(out, "No trips")?;
            }
            for trip in &trips {
                writeln!(out, "{}", format_trip_line(trip))?;
            }
        }
    }
    Ok(())
}

pub async fn show<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let trip = ctx.repo.get_trip(id).await?;
    write_trip(&trip, output, out)
}

pub async fn create<T: Transport>(
    ctx: &Context<T>,
    new_trip: NewTrip,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let trip = ctx.repo.create_trip(&new_trip).await?;
    if output == OutputFormat::Json {
        return write_trip(&trip, output, out);
    }
    writeln!(out, "Created [{}] {}", trip.id, trip.destination)?;
    if trip.is_local() {
        writeln!(out, "Saved offline; it will be sent on the next sync.")?;
    }
    Ok(())
}

pub async fn update<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    patch: TripPatch,
    out: &mut impl Write,
) -> Result<()> {
    if patch.is_empty() {
        return Err(Error::Core(tripsync_core::Error::InvalidInput(
            "nothing to update\n  hint: pass at least one of --destination, --title, --budget, --start, --end"
                .to_string(),
        )));
    }
    let trip = ctx.repo.update_trip(id, &patch).await?;
    writeln!(out, "Updated [{}] {}", trip.id, trip.destination)?;
    queued_note(ctx, out)
}

pub async fn delete<T: Transport>(ctx: &Context<T>, id: &str, out: &mut impl Write) -> Result<()> {
    ctx.repo.delete_trip(id).await?;
    writeln!(out, "Deleted {id}")?;
    queued_note(ctx, out)
}

pub async fn optimize<T: Transport>(
    ctx: &Context<T>,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let trip = ctx.repo.optimize_trip(id).await?;
    writeln!(out, "Optimized itinerary:")?;
    write_trip(&trip, OutputFormat::Text, out)
}

fn write_trip(trip: &Trip, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    match output {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(trip)?)?,
        OutputFormat::Text => writeln!(out, "{}", format_trip_details(trip))?,
    }
    Ok(())
}

/// Tells the user an offline edit was queued rather than sent.
pub(super) fn queued_note<T: Transport>(ctx: &Context<T>, out: &mut impl Write) -> Result<()> {
    if !ctx.repo.is_online() {
        writeln!(out, "Queued; it will be sent on the next sync.")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "trips_tests.rs"]
mod tests;
