// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! Used with `#[command(flatten)]` by commands that edit the same fields.

use chrono::NaiveDate;
use clap::Args;

use tripsync_core::{ActivityPatch, NewTrip, TripPatch};

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(super) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got '{s}'"))
}

/// Parse a non-negative amount.
pub(super) fn parse_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("not a number: '{s}'"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err("must be a non-negative number".to_string())
    }
}

/// Editable trip fields.
#[derive(Args, Clone, Debug, Default)]
pub struct TripFields {
    /// Trip title
    #[arg(long)]
    pub title: Option<String>,

    /// Total budget
    #[arg(long, value_parser = parse_amount)]
    pub budget: Option<f64>,

    /// First day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

impl TripFields {
    pub fn into_new_trip(self, destination: String) -> NewTrip {
        NewTrip {
            destination,
            title: self.title,
            budget: self.budget,
            start_date: self.start,
            end_date: self.end,
        }
    }

    /// Converts the flags into a patch, with an optional new destination.
    pub fn into_patch(self, destination: Option<String>) -> TripPatch {
        TripPatch {
            destination,
            title: self.title,
            budget: self.budget,
            start_date: self.start,
            end_date: self.end,
        }
    }
}

/// Editable activity fields.
#[derive(Args, Clone, Debug, Default)]
pub struct ActivityFields {
    /// Activity name
    #[arg(long)]
    pub name: Option<String>,

    /// Day of the trip, starting at 1
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub day: Option<u32>,

    /// Where it takes place
    #[arg(long)]
    pub location: Option<String>,

    /// Start time, e.g. 09:30
    #[arg(long)]
    pub start_time: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Expected cost
    #[arg(long, value_parser = parse_amount)]
    pub cost: Option<f64>,
}

impl From<ActivityFields> for ActivityPatch {
    fn from(fields: ActivityFields) -> Self {
        ActivityPatch {
            name: fields.name,
            day: fields.day,
            location: fields.location,
            start_time: fields.start_time,
            notes: fields.notes,
            cost: fields.cost,
        }
    }
}
