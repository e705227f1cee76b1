// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};

use tripsync_core::{Activity, OpPayload, PendingSyncOperation, SyncStatus, Trip};

/// Marker shown next to trips that only exist locally.
const LOCAL_MARKER: &str = "(not synced)";

/// Format a trip as a single line for list output.
pub fn format_trip_line(trip: &Trip) -> String {
    let mut line = format!("- [{}] {}", trip.id, trip.destination);
    if let Some(title) = &trip.title {
        line.push_str(&format!(": {title}"));
    }
    if let Some(budget) = trip.budget {
        line.push_str(&format!(" (budget {budget:.2})"));
    }
    if trip.is_local() {
        line.push(' ');
        line.push_str(LOCAL_MARKER);
    }
    line
}

/// Format a trip with its itinerary.
pub fn format_trip_details(trip: &Trip) -> String {
    let mut out = String::new();
    out.push_str(&format!("[{}] {}\n", trip.id, trip.destination));
    if let Some(title) = &trip.title {
        out.push_str(&format!("Title: {title}\n"));
    }
    if let Some(budget) = trip.budget {
        out.push_str(&format!("Budget: {budget:.2}\n"));
    }
    match (trip.start_date, trip.end_date) {
        (Some(start), Some(end)) => out.push_str(&format!("Dates: {start} to {end}\n")),
        (Some(start), None) => out.push_str(&format!("Starts: {start}\n")),
        (None, Some(end)) => out.push_str(&format!("Ends: {end}\n")),
        (None, None) => {}
    }
    if trip.is_local() {
        out.push_str(&format!("Status: {LOCAL_MARKER}\n"));
    }

    if !trip.activities.is_empty() {
        out.push_str("\nActivities:\n");
        for activity in &trip.activities {
            out.push_str(&format!("  {}\n", format_activity_line(activity)));
        }
    }
    out.trim_end().to_string()
}

/// Format an activity as a single line.
pub fn format_activity_line(activity: &Activity) -> String {
    let mut line = String::new();
    if let Some(day) = activity.day {
        line.push_str(&format!("Day {day} "));
    }
    if let Some(time) = &activity.start_time {
        line.push_str(&format!("{time} "));
    }
    line.push_str(&format!("[{}] {}", activity.id, activity.name));
    if let Some(location) = &activity.location {
        line.push_str(&format!(" @ {location}"));
    }
    line
}

/// Format a pending operation as a single line.
pub fn format_op_line(op: &PendingSyncOperation) -> String {
    let target = match &op.payload {
        OpPayload::CreateTrip { temp_id, trip } => format!("{temp_id} ({})", trip.destination),
        OpPayload::UpdateTrip { trip_id, .. } | OpPayload::DeleteTrip { trip_id } => {
            trip_id.clone()
        }
        OpPayload::UpdateActivity { activity_id, .. } => activity_id.clone(),
    };
    let mut line = format!(
        "{} {} {} (queued {})",
        short_id(&op.id),
        op.kind(),
        target,
        op.enqueued_at.format("%Y-%m-%d %H:%M:%S")
    );
    if op.attempts > 0 {
        line.push_str(&format!(", {} failed attempt(s)", op.attempts));
    }
    line
}

/// Format the status summary.
pub fn format_status(
    online: bool,
    pending: usize,
    dead_letters: usize,
    last_sync: Option<DateTime<Utc>>,
    sync: SyncStatus,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Network: {}\n",
        if online { "online" } else { "offline" }
    ));
    out.push_str(&format!("Pending operations: {pending}\n"));
    if dead_letters > 0 {
        out.push_str(&format!("Dead letters: {dead_letters}\n"));
    }
    match last_sync {
        Some(at) => out.push_str(&format!("Last sync: {}\n", at.format("%Y-%m-%d %H:%M:%S UTC"))),
        None => out.push_str("Last sync: never\n"),
    }
    out.push_str(&format!("Sync: {} ({}%)", sync.status, sync.progress));
    out
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
