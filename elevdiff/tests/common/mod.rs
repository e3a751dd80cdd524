//! Local stand-in for the elevation service.
//!
//! The stub runs on its own thread with its own tokio runtime, so tests can
//! drive the blocking sequential fetcher from a plain `#[test]`.
//!
//! Test points put their index in the latitude (`lat = index * 0.001`), which
//! lets the stub tell chunks apart by the first location it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use elevdiff::Point;
use serde_json::json;
use tokio::sync::oneshot;

pub const STUB_KEY: &str = "test-key";

/// How the stub answers a chunk.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Ok,
    Delayed(Duration),
    Status(u16),
    Malformed,
    Denied,
}

/// Elevation values returned for each location.
#[derive(Debug, Clone, Copy)]
pub enum Elevations {
    /// Return the location's latitude.
    Echo,
    /// Return the same value everywhere.
    Constant(f64),
}

type Behavior = dyn Fn(usize) -> Reply + Send + Sync;

struct StubState {
    elevations: Elevations,
    behavior: Box<Behavior>,
    hits: AtomicUsize,
    served_ok: AtomicUsize,
    received: Mutex<Vec<usize>>,
}

/// A running stub service. Shuts down when dropped.
pub struct StubService {
    pub addr: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubService {
    /// Start a stub. `behavior` receives the index of the first point of
    /// each chunk.
    pub fn start(
        elevations: Elevations,
        behavior: impl Fn(usize) -> Reply + Send + Sync + 'static,
    ) -> Self {
        let state = Arc::new(StubState {
            elevations,
            behavior: Box::new(behavior),
            hits: AtomicUsize::new(0),
            served_ok: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        });

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_state = Arc::clone(&state);

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();

                let app = Router::new()
                    .route("/elevation/json", get(elevation))
                    .with_state(server_state);

                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/elevation/json", self.addr)
    }

    /// Number of requests received.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Number of requests answered with elevations.
    pub fn served_ok(&self) -> usize {
        self.state.served_ok.load(Ordering::SeqCst)
    }

    /// First point index of each request, in arrival order.
    pub fn received(&self) -> Vec<usize> {
        self.state.received.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Points whose latitude encodes their index.
pub fn indexed_points(n: usize, reference_elevation: f64) -> Vec<Point> {
    (0..n)
        .map(|i| Point::new(i as f64 * 0.001, -49.0, reference_elevation))
        .collect()
}

async fn elevation(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let Some(locations) = params.get("locations") else {
        return (StatusCode::BAD_REQUEST, "missing locations").into_response();
    };
    let lats: Vec<f64> = locations
        .split('|')
        .filter_map(|pair| pair.split(',').next())
        .filter_map(|lat| lat.parse().ok())
        .collect();
    let first = lats.first().map(|lat| (lat * 1000.0).round() as usize).unwrap_or(0);
    state.received.lock().unwrap().push(first);

    if params.get("key").map(String::as_str) != Some(STUB_KEY) {
        return Json(json!({
            "error_message": "The provided API key is invalid.",
            "results": [],
            "status": "REQUEST_DENIED"
        }))
        .into_response();
    }

    match (state.behavior)(first) {
        Reply::Ok => {}
        Reply::Delayed(delay) => tokio::time::sleep(delay).await,
        Reply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, "stub failure").into_response();
        }
        Reply::Malformed => {
            return Json(json!({"unexpected": true})).into_response();
        }
        Reply::Denied => {
            return Json(json!({
                "error_message": "You have exceeded your daily request quota for this API.",
                "results": [],
                "status": "OVER_QUERY_LIMIT"
            }))
            .into_response();
        }
    }

    let results: Vec<_> = lats
        .iter()
        .map(|&lat| {
            let elevation = match state.elevations {
                Elevations::Echo => lat,
                Elevations::Constant(value) => value,
            };
            json!({"elevation": elevation, "location": {"lat": lat, "lng": -49.0}, "resolution": 9.5})
        })
        .collect();

    state.served_ok.fetch_add(1, Ordering::SeqCst);
    Json(json!({"results": results, "status": "OK"})).into_response()
}
