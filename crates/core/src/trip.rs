// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trip and activity records.
//!
//! These mirror the JSON shapes exchanged with the trip service. A trip
//! created while offline carries a temporary id (see [`TEMP_ID_PREFIX`]) until
//! the next reconciliation replaces the cache with server-issued records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reserved prefix for locally synthesized trip ids.
pub const TEMP_ID_PREFIX: &str = "offline_";

/// Builds a temporary trip id from a millisecond timestamp.
pub fn temp_id(now_ms: u64) -> String {
    format!("{TEMP_ID_PREFIX}{now_ms}")
}

/// Returns true if the id was synthesized locally and never confirmed by the server.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// A planned trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Returns true if this record only exists locally so far.
    pub fn is_local(&self) -> bool {
        is_temp_id(&self.id)
    }

    /// Finds an activity of this trip by id.
    pub fn activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    /// Replaces the activity with the given id, returning false if absent.
    pub fn replace_activity(&mut self, activity_id: &str, activity: Activity) -> bool {
        match self.activities.iter_mut().find(|a| a.id == activity_id) {
            Some(slot) => {
                *slot = activity;
                true
            }
            None => false,
        }
    }

    /// Removes the activity with the given id, returning false if absent.
    pub fn remove_activity(&mut self, activity_id: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != activity_id);
        self.activities.len() != before
    }
}

/// A single itinerary entry within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Request body for creating a trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl NewTrip {
    /// Creates a request for the given destination with no other fields set.
    pub fn new(destination: impl Into<String>) -> Self {
        NewTrip {
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Sets the budget.
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Builds the optimistic local record for this request.
    pub fn to_trip(&self, id: String, now: DateTime<Utc>) -> Trip {
        Trip {
            id,
            destination: self.destination.clone(),
            title: self.title.clone(),
            budget: self.budget,
            start_date: self.start_date,
            end_date: self.end_date,
            activities: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Partial update of a trip. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl TripPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &TripPatch::default()
    }

    /// Applies the set fields to a trip.
    pub fn apply(&self, trip: &mut Trip) {
        if let Some(destination) = &self.destination {
            trip.destination = destination.clone();
        }
        if let Some(title) = &self.title {
            trip.title = Some(title.clone());
        }
        if let Some(budget) = self.budget {
            trip.budget = Some(budget);
        }
        if let Some(start) = self.start_date {
            trip.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            trip.end_date = Some(end);
        }
    }
}

/// Partial update of an activity. Unset fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl ActivityPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &ActivityPatch::default()
    }

    /// Applies the set fields to an activity.
    pub fn apply(&self, activity: &mut Activity) {
        if let Some(name) = &self.name {
            activity.name = name.clone();
        }
        if let Some(day) = self.day {
            activity.day = Some(day);
        }
        if let Some(location) = &self.location {
            activity.location = Some(location.clone());
        }
        if let Some(start_time) = &self.start_time {
            activity.start_time = Some(start_time.clone());
        }
        if let Some(notes) = &self.notes {
            activity.notes = Some(notes.clone());
        }
        if let Some(cost) = self.cost {
            activity.cost = Some(cost);
        }
    }
}

#[cfg(test)]
#[path = "trip_tests.rs"]
mod tests;
