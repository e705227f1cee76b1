// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: an in-memory trip service behind the [`Transport`] trait.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::sync::{Notify, Semaphore};

use tripsync_core::{
    Activity, ActivityPatch, ClockSource, DurableStore, NewTrip, Trip, TripPatch,
};

use crate::api::TripApi;
use crate::net::{
    ApiClient, ConnectivitySnapshot, HttpRequest, HttpResponse, MemoryCredentials, Method,
    NetworkMonitor, RetryPolicy, Transport, TransportError, TransportResult,
};
use crate::repository::TripRepository;
use crate::sync::SyncEngine;

/// An injected failure.
#[derive(Debug, Clone)]
pub enum Fault {
    Status(u16),
    RetryAfter(u16, u64),
    Timeout,
    NoResponse,
}

impl Fault {
    fn reply(&self) -> TransportResult<HttpResponse> {
        match self {
            Fault::Status(status) => Ok(HttpResponse::new(
                *status,
                json!({ "message": format!("injected {status}") }),
            )),
            Fault::RetryAfter(status, secs) => Ok(HttpResponse::new(
                *status,
                json!({ "message": "slow down" }),
            )
            .with_header("Retry-After", secs.to_string())),
            Fault::Timeout => Err(TransportError::Timeout("injected timeout".into())),
            Fault::NoResponse => Err(TransportError::NoResponse("injected reset".into())),
        }
    }
}

#[derive(Default)]
struct ServerState {
    trips: Vec<Trip>,
    next_id: u64,
    requests: Vec<HttpRequest>,
    one_shot: VecDeque<Fault>,
    routes: Vec<(Method, String, Fault)>,
}

/// Scripted stand-in for the trip service.
///
/// Cloning yields another handle to the same server, so a test can keep one
/// while the client under test owns another.
#[derive(Clone)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    entered: Arc<Notify>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    pub fn new() -> Self {
        FakeServer {
            state: Arc::new(Mutex::new(ServerState {
                next_id: 1,
                ..Default::default()
            })),
            gate: Arc::new(Mutex::new(None)),
            entered: Arc::new(Notify::new()),
        }
    }

    /// Adds a trip to the server-side state.
    pub fn seed(&self, trip: Trip) {
        self.state.lock().unwrap().trips.push(trip);
    }

    /// Current server-side trips.
    pub fn trips(&self) -> Vec<Trip> {
        self.state.lock().unwrap().trips.clone()
    }

    /// Every request received so far, faults included.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Fails the next request, whatever it is.
    pub fn fail_next(&self, fault: Fault) {
        self.state.lock().unwrap().one_shot.push_back(fault);
    }

    /// Fails every request to `method path` until cleared.
    pub fn fail_route(&self, method: Method, path: &str, fault: Fault) {
        self.state
            .lock()
            .unwrap()
            .routes
            .push((method, path.to_string(), fault));
    }

    pub fn clear_faults(&self) {
        let mut state = self.state.lock().unwrap();
        state.one_shot.clear();
        state.routes.clear();
    }

    /// Holds every subsequent request until [`release`](Self::release).
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets held requests through and stops holding.
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Lets `n` held requests through while still holding the rest.
    pub fn admit(&self, n: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(n);
        }
    }

    /// Resolves once a request has reached the server.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    fn handle(&self, request: &HttpRequest) -> TransportResult<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(fault) = state.one_shot.pop_front() {
            return fault.reply();
        }
        if let Some((_, _, fault)) = state
            .routes
            .iter()
            .find(|(m, p, _)| *m == request.method && *p == request.path)
        {
            return fault.reply();
        }

        let segments: Vec<&str> = request
            .path
            .trim_start_matches('/')
            .split('/')
            .collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        let response = match (request.method, segments.as_slice()) {
            (Method::Get, ["trips"]) => ok(json!({ "trips": state.trips })),
            (Method::Post, ["trips"]) => {
                let new_trip: NewTrip = serde_json::from_value(body).unwrap();
                let id = format!("trip-{}", state.next_id);
                state.next_id += 1;
                let trip = new_trip.to_trip(id, chrono::Utc::now());
                state.trips.push(trip.clone());
                HttpResponse::new(201, json!({ "message": "Trip created", "trip": trip }))
            }
            (Method::Get, ["trips", id]) => match state.trips.iter().find(|t| t.id == *id) {
                Some(trip) => ok(json!({ "trip": trip })),
                None => not_found("Trip not found"),
            },
            (Method::Put, ["trips", id]) => {
                let patch: TripPatch = serde_json::from_value(body).unwrap();
                match state.trips.iter_mut().find(|t| t.id == *id) {
                    Some(trip) => {
                        patch.apply(trip);
                        ok(json!({ "message": "Trip updated", "trip": trip }))
                    }
                    None => not_found("Trip not found"),
                }
            }
            (Method::Delete, ["trips", id]) => {
                let before = state.trips.len();
                state.trips.retain(|t| t.id != *id);
                if state.trips.len() == before {
                    not_found("Trip not found")
                } else {
                    ok(json!({ "message": "Trip deleted" }))
                }
            }
            (Method::Post, ["trips", id, "optimize"]) => {
                match state.trips.iter_mut().find(|t| t.id == *id) {
                    Some(trip) => {
                        trip.activities.sort_by_key(|a| a.day.unwrap_or(u32::MAX));
                        ok(json!({ "trip": trip }))
                    }
                    None => not_found("Trip not found"),
                }
            }
            (Method::Put, ["trips", "activities", id]) => {
                let patch: ActivityPatch = serde_json::from_value(body).unwrap();
                match find_activity(&mut state.trips, id) {
                    Some(activity) => {
                        patch.apply(activity);
                        ok(json!(activity))
                    }
                    None => not_found("Activity not found"),
                }
            }
            (Method::Delete, ["trips", "activities", id]) => {
                let removed = state.trips.iter_mut().any(|t| t.remove_activity(id));
                if removed {
                    ok(json!({ "message": "Activity deleted" }))
                } else {
                    not_found("Activity not found")
                }
            }
            (Method::Post, ["trips", "activities", id, "replace"]) => {
                let next = state.next_id;
                state.next_id += 1;
                match find_activity(&mut state.trips, id) {
                    Some(activity) => {
                        *activity = Activity {
                            id: format!("act-{next}"),
                            name: format!("Alternative to {}", activity.name),
                            ..activity.clone()
                        };
                        ok(json!(activity))
                    }
                    None => not_found("Activity not found"),
                }
            }
            _ => not_found("No such route"),
        };
        Ok(response)
    }
}

impl Transport for FakeServer {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            self.entered.notify_one();
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                let _permit = gate.acquire().await;
            }
            self.handle(&request)
        })
    }
}

fn ok(body: Value) -> HttpResponse {
    HttpResponse::new(200, body)
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::new(404, json!({ "message": message }))
}

fn find_activity<'a>(trips: &'a mut [Trip], id: &str) -> Option<&'a mut Activity> {
    trips
        .iter_mut()
        .flat_map(|t| t.activities.iter_mut())
        .find(|a| a.id == id)
}

/// A server-side trip with the given id and destination.
pub fn make_trip(id: &str, destination: &str) -> Trip {
    NewTrip::new(destination).to_trip(id.to_string(), chrono::Utc::now())
}

/// A trip holding a single activity.
pub fn make_trip_with_activity(id: &str, activity_id: &str, name: &str) -> Trip {
    let mut trip = make_trip(id, "Kyoto");
    trip.activities.push(Activity {
        id: activity_id.to_string(),
        trip_id: Some(id.to_string()),
        name: name.to_string(),
        day: Some(1),
        location: None,
        start_time: None,
        notes: None,
        cost: None,
    });
    trip
}

/// Settable clock for deterministic ids and timestamps.
#[derive(Debug)]
pub struct TestClock(AtomicU64);

impl TestClock {
    pub fn new(ms: u64) -> Arc<Self> {
        Arc::new(TestClock(AtomicU64::new(ms)))
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockSource for TestClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a repository or engine test needs, wired to one fake server
/// and one in-memory store.
pub struct Harness {
    pub server: FakeServer,
    pub store: Arc<DurableStore>,
    pub monitor: Arc<NetworkMonitor>,
    pub clock: Arc<TestClock>,
    pub api: Arc<TripApi<FakeServer>>,
}

impl Harness {
    /// Starts online, clock at 1_700_000_000_000 ms.
    pub fn new() -> Self {
        let server = FakeServer::new();
        let api = TripApi::new(
            ApiClient::new(server.clone(), Arc::new(MemoryCredentials::with_token("test")))
                .with_retry(RetryPolicy::immediate(3)),
        );
        Harness {
            server,
            store: Arc::new(DurableStore::open_in_memory().unwrap()),
            monitor: Arc::new(NetworkMonitor::new(ConnectivitySnapshot::online())),
            clock: TestClock::new(1_700_000_000_000),
            api: Arc::new(api),
        }
    }

    pub fn repository(&self) -> TripRepository<FakeServer> {
        TripRepository::new(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            Arc::clone(&self.monitor),
        )
        .with_clock(self.clock.clone())
    }

    pub fn engine(&self) -> SyncEngine<FakeServer> {
        SyncEngine::new(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            Arc::clone(&self.monitor),
        )
        .with_clock(self.clock.clone())
    }

    pub fn go_offline(&self) {
        self.monitor.update(ConnectivitySnapshot::offline());
    }

    pub fn go_online(&self) {
        self.monitor.update(ConnectivitySnapshot::online());
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
