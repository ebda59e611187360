use thiserror::Error;

use crate::{driver::DriverError, playback::PlaybackError, route::LoadError};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to load route: {0}")]
    RouteLoad(#[from] LoadError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("route is still loading")]
    NotLoaded,
    #[error("route could not be loaded: {0}")]
    Unavailable(String),
}
