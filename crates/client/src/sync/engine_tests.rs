// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the sync engine.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tripsync_core::trip::is_temp_id;
use tripsync_core::{NewTrip, OpPayload, PendingSyncOperation, SyncPhase, SyncStatus, TripPatch};

use super::engine::{SyncError, SyncOutcome, SyncReport};
use crate::net::Method;
use crate::test_helpers::{make_trip, Fault, Harness};

fn record(engine: &super::SyncEngine<crate::test_helpers::FakeServer>) -> (
    Arc<Mutex<Vec<SyncStatus>>>,
    tripsync_core::Subscription,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = engine.subscribe(move |status| sink.lock().unwrap().push(*status));
    (seen, sub)
}

fn synced(outcome: SyncOutcome) -> SyncReport {
    match outcome {
        SyncOutcome::Synced(report) => report,
        other => unreachable!("expected a completed pass, got {other:?}"),
    }
}

#[tokio::test]
async fn test_offline_create_reconciles_to_server_id() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = h.engine();

    h.go_offline();
    let local = repo
        .create_trip(&NewTrip::new("Tokyo").with_budget(1500.0))
        .await
        .unwrap();
    assert!(is_temp_id(&local.id));

    h.go_online();
    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.remapped, 1);
    assert!(repo.pending_operations().unwrap().is_empty());

    let cached = repo.cached_trips().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, "trip-1");
    assert_eq!(cached[0].destination, "Tokyo");
    assert_eq!(cached[0].budget, Some(1500.0));
}

#[tokio::test]
async fn test_second_call_while_syncing_is_a_no_op() {
    let h = Harness::new();
    let engine = Arc::new(h.engine());

    h.server.hold();
    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.sync_data().await })
    };
    h.server.entered().await;
    let requests_in_flight = h.server.request_count();

    let second = engine.sync_data().await.unwrap();

    assert_eq!(second, SyncOutcome::AlreadyInProgress);
    assert_eq!(h.server.request_count(), requests_in_flight);
    assert!(engine.is_syncing());

    h.server.release();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, SyncOutcome::Synced(_)));
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_offline_sync_changes_nothing() {
    let h = Harness::new();
    let engine = h.engine();
    let (seen, _sub) = record(&engine);
    h.go_offline();

    assert_eq!(engine.sync_data().await.unwrap(), SyncOutcome::Offline);

    assert_eq!(h.server.request_count(), 0);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(engine.status(), SyncStatus::idle());
    assert!(h.store.get_last_sync().unwrap().is_none());
}

#[tokio::test]
async fn test_status_progression() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    let repo = h.repository();
    let engine = h.engine();
    repo.list_trips().await.unwrap();
    h.go_offline();
    for title in ["a", "b"] {
        let patch = TripPatch {
            title: Some(title.into()),
            ..Default::default()
        };
        repo.update_trip("t1", &patch).await.unwrap();
    }
    h.go_online();

    let (seen, _sub) = record(&engine);
    engine.sync_data().await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SyncStatus::syncing(0),
            SyncStatus::syncing(50),
            SyncStatus::syncing(100),
            SyncStatus::completed(),
            SyncStatus::idle(),
        ]
    );
}

#[tokio::test]
async fn test_empty_queue_still_reconciles() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    h.store.save_trip(&make_trip("stale", "Nowhere")).unwrap();
    let engine = h.engine();

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report, SyncReport::default());
    let cached = h.store.get_trips().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, "t1");
    assert_eq!(
        h.store.get_last_sync().unwrap().map(|t| t.timestamp_millis()),
        Some(1_700_000_000_000)
    );
}

#[tokio::test]
async fn test_updates_replay_in_fifo_order() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    let repo = h.repository();
    let engine = h.engine();
    repo.list_trips().await.unwrap();
    h.go_offline();
    for title in ["first", "second"] {
        let patch = TripPatch {
            title: Some(title.into()),
            ..Default::default()
        };
        repo.update_trip("t1", &patch).await.unwrap();
    }
    h.go_online();

    engine.sync_data().await.unwrap();

    let puts: Vec<_> = h
        .server
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Put)
        .map(|r| r.body.unwrap()["title"].clone())
        .collect();
    assert_eq!(puts, vec!["first", "second"]);
    assert_eq!(h.server.trips()[0].title.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_failed_delete_stays_queued_unchanged() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    let repo = h.repository();
    let engine = h.engine();
    repo.list_trips().await.unwrap();

    h.go_offline();
    repo.delete_trip("t1").await.unwrap();
    assert!(repo.cached_trips().unwrap().is_empty());
    let queued = repo.pending_operations().unwrap();

    h.go_online();
    h.server
        .fail_route(Method::Delete, "/trips/t1", Fault::Status(404));

    for _ in 0..3 {
        let report = synced(engine.sync_data().await.unwrap());
        assert_eq!(report.failed, 1);
        assert_eq!(report.applied, 0);
        assert_eq!(repo.pending_operations().unwrap(), queued);
    }
    assert!(h.store.get_dead_letters().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failure_does_not_block_the_rest() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    h.server.seed(make_trip("t2", "Oslo"));
    let repo = h.repository();
    let engine = h.engine();
    repo.list_trips().await.unwrap();

    h.go_offline();
    repo.delete_trip("t1").await.unwrap();
    repo.delete_trip("t2").await.unwrap();
    h.go_online();
    h.server
        .fail_route(Method::Delete, "/trips/t1", Fault::Status(409));

    let outcome = engine.sync_data().await.unwrap();
    let report = synced(outcome.clone());

    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 1);
    assert!(report.is_partial());
    assert_eq!(outcome.to_string(), "synced 1 of 2 operation(s), 1 failed");
    let left = repo.pending_operations().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].trip_id(), Some("t1"));
    // Reconciliation restores what the server still holds.
    assert_eq!(repo.cached_trips().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconcile_failure_fails_the_pass() {
    let h = Harness::new();
    let engine = h.engine();
    let (seen, _sub) = record(&engine);
    h.server
        .fail_route(Method::Get, "/trips", Fault::Status(500));

    let err = engine.sync_data().await.unwrap_err();

    assert!(matches!(err, SyncError::Reconcile(_)));
    let seen = seen.lock().unwrap().clone();
    let phases: Vec<SyncPhase> = seen.iter().map(|s| s.status).collect();
    assert_eq!(
        phases,
        vec![SyncPhase::Syncing, SyncPhase::Failed, SyncPhase::Idle]
    );
    assert!(!engine.is_syncing());
    assert!(h.store.get_last_sync().unwrap().is_none());

    h.server.clear_faults();
    assert!(matches!(
        engine.sync_data().await.unwrap(),
        SyncOutcome::Synced(_)
    ));
}

#[tokio::test]
async fn test_ops_on_temp_trip_follow_the_server_id() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = h.engine();

    h.go_offline();
    let local = repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();
    let patch = TripPatch {
        title: Some("Cherry blossoms".into()),
        ..Default::default()
    };
    repo.update_trip(&local.id, &patch).await.unwrap();
    h.go_online();

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.applied, 2);
    let paths: Vec<String> = h.server.requests().into_iter().map(|r| r.path).collect();
    assert!(paths.contains(&"/trips/trip-1".to_string()));
    assert!(!paths.iter().any(|p| p.contains("offline_")));
    assert_eq!(
        h.server.trips()[0].title.as_deref(),
        Some("Cherry blossoms")
    );
}

#[tokio::test]
async fn test_remap_is_persisted_for_failed_dependents() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = h.engine();

    h.go_offline();
    let local = repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();
    repo.update_trip(&local.id, &TripPatch::default())
        .await
        .unwrap();
    h.go_online();
    h.server
        .fail_route(Method::Put, "/trips/trip-1", Fault::Status(400));

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 1);
    let left = repo.pending_operations().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].trip_id(), Some("trip-1"));
}

#[tokio::test]
async fn test_dependents_of_failed_create_are_not_sent() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = h.engine();

    h.go_offline();
    let local = repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();
    repo.delete_trip(&local.id).await.unwrap();
    h.go_online();
    h.server
        .fail_route(Method::Post, "/trips", Fault::Status(400));

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.failed, 2);
    assert!(h
        .server
        .requests()
        .iter()
        .all(|r| r.method != Method::Delete));
    let left = repo.pending_operations().unwrap();
    assert!(matches!(left[0].payload, OpPayload::CreateTrip { .. }));
    assert!(matches!(left[1].payload, OpPayload::DeleteTrip { .. }));
}

#[tokio::test]
async fn test_dead_lettered_create_takes_its_dependents_along() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = h.engine().with_max_op_attempts(Some(1));

    h.go_offline();
    let local = repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();
    repo.delete_trip(&local.id).await.unwrap();
    h.go_online();
    h.server
        .fail_route(Method::Post, "/trips", Fault::Status(400));

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.failed, 2);
    assert_eq!(report.dead_lettered, 2);
    assert!(repo.pending_operations().unwrap().is_empty());
    let dead = repo.dead_letters().unwrap();
    assert!(matches!(dead[0].payload, OpPayload::CreateTrip { .. }));
    assert!(matches!(dead[1].payload, OpPayload::DeleteTrip { .. }));
    assert_eq!(dead[1].trip_id(), Some(local.id.as_str()));

    let next = synced(engine.sync_data().await.unwrap());
    assert_eq!(next.total, 0);
    assert_eq!(next.failed, 0);
}

#[tokio::test]
async fn test_op_naming_an_unqueued_temp_trip_is_dead_lettered() {
    let h = Harness::new();
    let engine = h.engine();
    h.store
        .append_pending_op(&PendingSyncOperation::new(
            "op-1",
            OpPayload::DeleteTrip {
                trip_id: "offline_5".into(),
            },
            chrono::Utc::now(),
        ))
        .unwrap();

    let report = synced(engine.sync_data().await.unwrap());

    assert_eq!(report.failed, 1);
    assert_eq!(report.dead_lettered, 1);
    assert!(h.store.get_pending_ops().unwrap().is_empty());
    assert_eq!(h.store.get_dead_letters().unwrap()[0].id, "op-1");
    assert!(h
        .server
        .requests()
        .iter()
        .all(|r| r.method != Method::Delete));
}

#[tokio::test]
async fn test_confirmed_create_rewrites_queued_dependents_before_they_replay() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = Arc::new(h.engine());

    h.go_offline();
    let local = repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();
    repo.update_trip(&local.id, &TripPatch::default())
        .await
        .unwrap();
    h.go_online();

    h.server.hold();
    let pass = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.sync_data().await })
    };
    h.server.entered().await;
    h.server.admit(1);
    // The update reaches the server only after the create was recorded.
    h.server.entered().await;
    pass.abort();
    let _ = pass.await;
    h.server.release();

    let left = repo.pending_operations().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].trip_id(), Some("trip-1"));
    let cached: Vec<String> = repo.cached_trips().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(cached, vec!["trip-1"]);
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_attempt_ceiling_moves_ops_to_dead_letters() {
    let h = Harness::new();
    h.server.seed(make_trip("t1", "Rome"));
    let repo = h.repository();
    let engine = h.engine().with_max_op_attempts(Some(2));
    repo.list_trips().await.unwrap();

    h.go_offline();
    repo.delete_trip("t1").await.unwrap();
    h.go_online();
    h.server
        .fail_route(Method::Delete, "/trips/t1", Fault::Status(404));

    let first = synced(engine.sync_data().await.unwrap());
    assert_eq!(first.dead_lettered, 0);
    assert_eq!(repo.pending_operations().unwrap()[0].attempts, 1);

    let second = synced(engine.sync_data().await.unwrap());
    assert_eq!(second.dead_lettered, 1);
    assert!(repo.pending_operations().unwrap().is_empty());
    let dead = repo.dead_letters().unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].attempts, 2);
}

#[tokio::test]
async fn test_auto_sync_runs_on_reconnect() {
    let h = Harness::new();
    let repo = h.repository();
    let engine = Arc::new(h.engine());

    h.go_offline();
    repo.create_trip(&NewTrip::new("Tokyo")).await.unwrap();

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let done_tx = Mutex::new(Some(done_tx));
    let _sub = engine.subscribe(move |status| {
        if status.status == SyncPhase::Completed {
            if let Some(tx) = done_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
    });
    let handle = engine.spawn_auto_sync();

    h.go_online();
    tokio::time::timeout(Duration::from_secs(5), done_rx)
        .await
        .unwrap()
        .unwrap();
    handle.abort();

    assert!(repo.pending_operations().unwrap().is_empty());
    assert_eq!(h.server.trips().len(), 1);
}
