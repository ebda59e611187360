use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use hyper::StatusCode;
use player::{
    AppState, create_router,
    models::{PlayerSnapshot, PlayerStatus, RouteResponse},
    route::{RouteFormat, route_from_bytes},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

const SAMPLE_ROUTE: &str = include_str!("../data/sample_route.json");

fn ready_state() -> AppState {
    let route = route_from_bytes(SAMPLE_ROUTE.as_bytes(), RouteFormat::Json).expect("route");
    let state = AppState::loading();
    state.install(route, 1.0).expect("install");
    state
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder().method("POST").uri(uri);
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send<T: DeserializeOwned>(app: &axum::Router, request: Request<Body>) -> (StatusCode, T) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn state_reports_loading_before_route_arrives() {
    let app = create_router(AppState::loading());

    let (status, body): (_, serde_json::Value) = send(&app, get("/api/state")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "loading");

    let (status, body): (_, serde_json::Value) = send(&app, post("/api/play", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "route is still loading");
}

#[tokio::test]
async fn failed_load_is_reported() {
    let state = AppState::loading();
    state.fail("route source contains no waypoints".into());
    let app = create_router(state);

    let (_, body): (_, PlayerStatus) = send(&app, get("/api/state")).await;
    match body {
        PlayerStatus::Failed { message } => assert!(message.contains("no waypoints")),
        other => panic!("expected failed status, got {other:?}"),
    }

    let response = app.oneshot(get("/api/route")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn route_endpoint_returns_closed_loop() {
    let app = create_router(ready_state());

    let (status, body): (_, RouteResponse) = send(&app, get("/api/route")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.path.len(), 7);
    assert_eq!(body.path.first(), body.path.last());
    assert!(body.distance_km > 1.0);
    assert!(!body.gpx_base64.is_empty());
    let metadata = body.metadata.expect("metadata");
    assert_eq!(metadata.segment_count, 6);
    assert_eq!(metadata.start, body.path[0]);
}

#[tokio::test]
async fn initial_state_is_stopped_at_start() {
    let app = create_router(ready_state());

    let (_, body): (_, PlayerStatus) = send(&app, get("/api/state")).await;
    let PlayerStatus::Ready { snapshot } = body else {
        panic!("route should be ready");
    };
    assert!(!snapshot.playback.is_playing);
    assert_eq!(snapshot.playback.segment_index, 0);
    assert_eq!(snapshot.visited_path, vec![snapshot.position]);
    assert_eq!(snapshot.stats.progress_percent, 0.0);
    assert_eq!(snapshot.stats.display_speed_kmh, 40.0);
}

#[tokio::test]
async fn play_pause_and_reset_commands() {
    let app = create_router(ready_state());

    let (status, snapshot): (_, PlayerSnapshot) = send(&app, post("/api/play", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot.playback.is_playing);

    let (_, snapshot): (_, PlayerSnapshot) = send(&app, post("/api/pause", None)).await;
    assert!(!snapshot.playback.is_playing);

    let (_, snapshot): (_, PlayerSnapshot) = send(&app, post("/api/reset", None)).await;
    assert!(!snapshot.playback.is_playing);
    assert_eq!(snapshot.visited_path.len(), 1);
    assert_eq!(snapshot.heading_deg, 0.0);
}

#[tokio::test]
async fn speed_changes_are_validated() {
    let app = create_router(ready_state());

    let (status, snapshot): (_, PlayerSnapshot) =
        send(&app, post("/api/speed", Some(json!({ "value": 2.0 })))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot.playback.speed_multiplier, 2.0);
    assert_eq!(snapshot.stats.display_speed_kmh, 80.0);

    let (status, body): (_, serde_json::Value) =
        send(&app, post("/api/speed", Some(json!({ "value": -1.0 })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("positive"));

    let response = app
        .clone()
        .oneshot(post("/api/speed", Some(json!({ "value": "fast" }))))
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let (_, body): (_, PlayerStatus) = send(&app, get("/api/state")).await;
    let PlayerStatus::Ready { snapshot } = body else {
        panic!("route should be ready");
    };
    assert_eq!(snapshot.playback.speed_multiplier, 2.0);
}
