// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::net::{MemoryCredentials, Method, RetryPolicy};
use crate::test_helpers::{make_trip, make_trip_with_activity, FakeServer};

fn make_api(server: &FakeServer) -> TripApi<FakeServer> {
    TripApi::new(
        ApiClient::new(server.clone(), Arc::new(MemoryCredentials::new()))
            .with_retry(RetryPolicy::immediate(0)),
    )
}

#[tokio::test]
async fn create_then_list() {
    let server = FakeServer::new();
    let api = make_api(&server);

    let trip = api
        .create_trip(&NewTrip::new("Tokyo").with_budget(1500.0))
        .await
        .unwrap();
    assert_eq!(trip.id, "trip-1");
    assert_eq!(trip.budget, Some(1500.0));

    let trips = api.list_trips().await.unwrap();
    assert_eq!(trips, vec![trip]);

    let request = &server.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.body, Some(json!({"destination": "Tokyo", "budget": 1500.0})));
}

#[tokio::test]
async fn get_update_delete_trip() {
    let server = FakeServer::new();
    server.seed(make_trip("t1", "Rome"));
    let api = make_api(&server);

    assert_eq!(api.get_trip("t1").await.unwrap().destination, "Rome");

    let patch = TripPatch {
        title: Some("Spring break".into()),
        ..Default::default()
    };
    let updated = api.update_trip("t1", &patch).await.unwrap();
    assert_eq!(updated.title.as_deref(), Some("Spring break"));

    assert_eq!(api.delete_trip("t1").await.unwrap(), "Trip deleted");
    assert!(server.trips().is_empty());
}

#[tokio::test]
async fn activity_endpoints() {
    let server = FakeServer::new();
    server.seed(make_trip_with_activity("t1", "a1", "Temple walk"));
    let api = make_api(&server);

    let patch = ActivityPatch {
        notes: Some("bring water".into()),
        ..Default::default()
    };
    let activity = api.update_activity("a1", &patch).await.unwrap();
    assert_eq!(activity.notes.as_deref(), Some("bring water"));

    let replaced = api
        .replace_activity("a1", &ReplaceActivity::default())
        .await
        .unwrap();
    assert_eq!(replaced.name, "Alternative to Temple walk");

    assert_eq!(api.delete_activity(&replaced.id).await.unwrap(), "Activity deleted");
    assert!(server.trips()[0].activities.is_empty());
}

#[tokio::test]
async fn optimize_returns_trip() {
    let server = FakeServer::new();
    server.seed(make_trip("t1", "Oslo"));
    let api = make_api(&server);

    let trip = api.optimize_trip("t1").await.unwrap();
    assert_eq!(trip.id, "t1");
    assert_eq!(server.requests()[0].path, "/trips/t1/optimize");
}

#[test]
fn malformed_envelope_is_unknown() {
    let err = decode::<TripEnvelope>(json!({"trips": []})).unwrap_err();
    assert!(matches!(err, ClientError::Unknown(msg) if msg.starts_with("malformed response")));
}

#[test]
fn delete_message_tolerates_empty_body() {
    assert_eq!(decode_message(serde_json::Value::Null), "");
    assert_eq!(decode_message(json!({"message": "gone"})), "gone");
}
