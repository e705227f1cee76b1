// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrapper over the trip service's REST endpoints.
//!
//! Unwraps the response envelopes (`{ message, trip }`, `{ trips }`, ...).
//! A body that does not match its envelope is reported as
//! [`ClientError::Unknown`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tripsync_core::{Activity, ActivityPatch, NewTrip, Trip, TripPatch};

use crate::net::{ApiClient, ClientError, ReqwestTransport, Transport};

#[derive(Debug, Deserialize)]
struct TripEnvelope {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct TripListEnvelope {
    trips: Vec<Trip>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    message: String,
}

/// Body of a replace-activity request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplaceActivity {
    /// Why the user wants an alternative, passed to the server as a hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Remote trip service.
pub struct TripApi<T: Transport = ReqwestTransport> {
    client: ApiClient<T>,
}

impl<T: Transport> TripApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        TripApi { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// `POST /trips`
    pub async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, ClientError> {
        let body = self.client.post("/trips", to_body(trip)?).await?;
        Ok(decode::<TripEnvelope>(body)?.trip)
    }

    /// `GET /trips`
    pub async fn list_trips(&self) -> Result<Vec<Trip>, ClientError> {
        let body = self.client.get("/trips").await?;
        Ok(decode::<TripListEnvelope>(body)?.trips)
    }

    /// `GET /trips/:id`
    pub async fn get_trip(&self, id: &str) -> Result<Trip, ClientError> {
        let body = self.client.get(&format!("/trips/{id}")).await?;
        Ok(decode::<TripEnvelope>(body)?.trip)
    }

    /// `PUT /trips/:id`
    pub async fn update_trip(&self, id: &str, patch: &TripPatch) -> Result<Trip, ClientError> {
        let body = self
            .client
            .put(&format!("/trips/{id}"), to_body(patch)?)
            .await?;
        Ok(decode::<TripEnvelope>(body)?.trip)
    }

    /// `DELETE /trips/:id`, returning the server's message.
    pub async fn delete_trip(&self, id: &str) -> Result<String, ClientError> {
        let body = self.client.delete(&format!("/trips/{id}")).await?;
        Ok(decode_message(body))
    }

    /// `PUT /trips/activities/:id`
    pub async fn update_activity(
        &self,
        id: &str,
        patch: &ActivityPatch,
    ) -> Result<Activity, ClientError> {
        let body = self
            .client
            .put(&format!("/trips/activities/{id}"), to_body(patch)?)
            .await?;
        decode(body)
    }

    /// `DELETE /trips/activities/:id`
    pub async fn delete_activity(&self, id: &str) -> Result<String, ClientError> {
        let body = self.client.delete(&format!("/trips/activities/{id}")).await?;
        Ok(decode_message(body))
    }

    /// `POST /trips/activities/:id/replace`
    pub async fn replace_activity(
        &self,
        id: &str,
        request: &ReplaceActivity,
    ) -> Result<Activity, ClientError> {
        let body = self
            .client
            .post(&format!("/trips/activities/{id}/replace"), to_body(request)?)
            .await?;
        decode(body)
    }

    /// `POST /trips/:id/optimize`
    pub async fn optimize_trip(&self, id: &str) -> Result<Trip, ClientError> {
        let body = self
            .client
            .post(&format!("/trips/{id}/optimize"), Value::Object(Default::default()))
            .await?;
        Ok(decode::<TripEnvelope>(body)?.trip)
    }
}

fn to_body<S: Serialize>(value: &S) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Unknown(format!("cannot encode request: {e}")))
}

fn decode<D: DeserializeOwned>(body: Value) -> Result<D, ClientError> {
    serde_json::from_value(body)
        .map_err(|e| ClientError::Unknown(format!("malformed response: {e}")))
}

/// Delete responses only carry a message; an empty or odd body is still a success.
fn decode_message(body: Value) -> String {
    serde_json::from_value::<MessageEnvelope>(body)
        .map(|m| m.message)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
