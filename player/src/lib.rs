pub mod config;
pub mod driver;
pub mod error;
pub mod geo;
pub mod gpx_export;
pub mod models;
pub mod playback;
pub mod route;
pub mod stats;

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::driver::{DriverError, PlayerHandle};
use crate::error::PlayerError;
use crate::gpx_export::encode_route_base64;
use crate::models::{ApiError, PlayerSnapshot, PlayerStatus, RouteResponse, SpeedRequest};
use crate::playback::{PlaybackEngine, PlaybackError};
use crate::route::{Route, RouteSource, load_route};

/// Route availability as seen by the HTTP layer.
pub enum RouteState {
    Loading,
    Failed(String),
    Ready {
        player: PlayerHandle,
        route: Arc<RouteResponse>,
    },
}

#[derive(Clone)]
pub struct AppState {
    route: Arc<RwLock<RouteState>>,
}

impl AppState {
    pub fn loading() -> Self {
        Self {
            route: Arc::new(RwLock::new(RouteState::Loading)),
        }
    }

    /// Spawn the playback task for `route` and mark the state ready.
    pub fn install(&self, route: Route, speed_multiplier: f64) -> Result<(), PlayerError> {
        let response = route_response(&route)?;
        let engine = PlaybackEngine::new(Arc::new(route), speed_multiplier)?;
        let player = PlayerHandle::spawn(engine);
        self.set(RouteState::Ready {
            player,
            route: Arc::new(response),
        });
        Ok(())
    }

    pub fn fail(&self, message: String) {
        self.set(RouteState::Failed(message));
    }

    fn set(&self, next: RouteState) {
        let mut guard = self.route.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }

    fn player(&self) -> Result<PlayerHandle, PlayerError> {
        let guard = self.route.read().unwrap_or_else(|e| e.into_inner());
        match &*guard {
            RouteState::Loading => Err(PlayerError::NotLoaded),
            RouteState::Failed(message) => Err(PlayerError::Unavailable(message.clone())),
            RouteState::Ready { player, .. } => Ok(player.clone()),
        }
    }

    fn route_response(&self) -> Result<Arc<RouteResponse>, PlayerError> {
        let guard = self.route.read().unwrap_or_else(|e| e.into_inner());
        match &*guard {
            RouteState::Loading => Err(PlayerError::NotLoaded),
            RouteState::Failed(message) => Err(PlayerError::Unavailable(message.clone())),
            RouteState::Ready { route, .. } => Ok(route.clone()),
        }
    }
}

/// Load the route once and hand it to `state`; failures stay visible as
/// [`RouteState::Failed`] with no retry.
pub async fn load_into(state: AppState, source: RouteSource, speed_multiplier: f64) {
    let outcome = match load_route(&source).await {
        Ok(route) => state.install(route, speed_multiplier),
        Err(err) => Err(err.into()),
    };
    if let Err(err) = outcome {
        tracing::error!("route unavailable: {err}");
        state.fail(err.to_string());
    }
}

pub fn route_response(route: &Route) -> Result<RouteResponse, PlayerError> {
    Ok(RouteResponse {
        path: route.points().to_vec(),
        distance_km: route.total_distance_km(),
        gpx_base64: encode_route_base64(route)?,
        metadata: Some(route.metadata()),
    })
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/route", get(route_handler))
        .route("/api/state", get(state_handler))
        .route("/api/play", post(play_handler))
        .route("/api/pause", post(pause_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/speed", post(speed_handler))
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn route_handler(State(state): State<AppState>) -> ApiResult<RouteResponse> {
    let route = state.route_response().map_err(api_error)?;
    Ok(Json(route.as_ref().clone()))
}

async fn state_handler(State(state): State<AppState>) -> ApiResult<PlayerStatus> {
    let player = match state.player() {
        Ok(player) => player,
        Err(PlayerError::NotLoaded) => return Ok(Json(PlayerStatus::Loading)),
        Err(PlayerError::Unavailable(message)) => {
            return Ok(Json(PlayerStatus::Failed { message }));
        }
        Err(err) => return Err(api_error(err)),
    };
    let snapshot = player.snapshot().await.map_err(driver_error)?;
    Ok(Json(PlayerStatus::Ready { snapshot }))
}

async fn play_handler(State(state): State<AppState>) -> ApiResult<PlayerSnapshot> {
    let player = state.player().map_err(api_error)?;
    player.play().await.map(Json).map_err(driver_error)
}

async fn pause_handler(State(state): State<AppState>) -> ApiResult<PlayerSnapshot> {
    let player = state.player().map_err(api_error)?;
    player.pause().await.map(Json).map_err(driver_error)
}

async fn reset_handler(State(state): State<AppState>) -> ApiResult<PlayerSnapshot> {
    let player = state.player().map_err(api_error)?;
    player.reset().await.map(Json).map_err(driver_error)
}

async fn speed_handler(
    State(state): State<AppState>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<PlayerSnapshot> {
    let player = state.player().map_err(api_error)?;
    player
        .set_speed(req.value)
        .await
        .map(Json)
        .map_err(driver_error)
}

fn driver_error(err: DriverError) -> (StatusCode, Json<ApiError>) {
    api_error(err.into())
}

fn api_error(err: PlayerError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        PlayerError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
        PlayerError::Unavailable(_) | PlayerError::RouteLoad(_) => StatusCode::BAD_GATEWAY,
        PlayerError::Playback(PlaybackError::InvalidSpeed(_))
        | PlayerError::Driver(DriverError::Playback(_)) => StatusCode::BAD_REQUEST,
        PlayerError::Driver(DriverError::Closed) | PlayerError::Gpx(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::warn!("request failed: {err}");
    }

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
