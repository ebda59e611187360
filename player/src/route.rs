use std::{
    fmt,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    geo::path_distance_km,
    models::{Coordinate, RouteBounds, RouteMetadata, WaypointRecord},
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read route file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to fetch route: {0}")]
    Http(#[from] reqwest::Error),
    #[error("route source answered with HTTP {0}")]
    Status(u16),
    #[error("invalid waypoint list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("route source contains no waypoints")]
    Empty,
    #[error("waypoint {index} is not a valid coordinate")]
    InvalidCoordinate { index: usize },
}

/// Where the waypoint list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    File(PathBuf),
    Http(String),
}

impl FromStr for RouteSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(RouteSource::Http(trimmed.to_string()))
        } else {
            Ok(RouteSource::File(PathBuf::from(trimmed)))
        }
    }
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSource::File(path) => write!(f, "{}", path.display()),
            RouteSource::Http(url) => f.write_str(url),
        }
    }
}

impl RouteSource {
    fn format_hint(&self) -> Option<RouteFormat> {
        let name = match self {
            RouteSource::File(path) => path.to_string_lossy().to_ascii_lowercase(),
            RouteSource::Http(url) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase(),
        };
        if name.ends_with(".gpx") {
            Some(RouteFormat::Gpx)
        } else if name.ends_with(".json") {
            Some(RouteFormat::Json)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFormat {
    /// Array of `{ "latitude": .., "longitude": .. }` records.
    Json,
    Gpx,
}

impl RouteFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'<') => RouteFormat::Gpx,
            _ => RouteFormat::Json,
        }
    }
}

/// Closed-loop route: the last point repeats the first one.
///
/// Built once by [`Route::closed_loop`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
    total_km: f64,
}

impl Route {
    pub fn closed_loop(waypoints: Vec<Coordinate>) -> Result<Self, LoadError> {
        let Some(&start) = waypoints.first() else {
            return Err(LoadError::Empty);
        };
        if let Some(index) = waypoints.iter().position(|c| !c.is_valid()) {
            return Err(LoadError::InvalidCoordinate { index });
        }

        let mut points = waypoints;
        points.push(start);
        let total_km = path_distance_km(&points);

        Ok(Self { points, total_km })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Coordinate {
        self.points[0]
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Endpoints of segment `index`, or `None` once past the last segment.
    pub fn segment(&self, index: usize) -> Option<(Coordinate, Coordinate)> {
        let start = *self.points.get(index)?;
        let end = *self.points.get(index + 1)?;
        Some((start, end))
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_km
    }

    pub fn bounds(&self) -> RouteBounds {
        let init = RouteBounds {
            min_lat: f64::MAX,
            max_lat: f64::MIN,
            min_lon: f64::MAX,
            max_lon: f64::MIN,
        };
        self.points.iter().fold(init, |b, c| RouteBounds {
            min_lat: b.min_lat.min(c.lat),
            max_lat: b.max_lat.max(c.lat),
            min_lon: b.min_lon.min(c.lon),
            max_lon: b.max_lon.max(c.lon),
        })
    }

    pub fn metadata(&self) -> RouteMetadata {
        RouteMetadata {
            point_count: self.len(),
            segment_count: self.segment_count(),
            bounds: self.bounds(),
            start: self.start(),
        }
    }
}

pub fn parse_waypoints(bytes: &[u8], format: RouteFormat) -> Result<Vec<Coordinate>, LoadError> {
    match format {
        RouteFormat::Json => {
            let records: Vec<WaypointRecord> = serde_json::from_slice(bytes)?;
            Ok(records.into_iter().map(Coordinate::from).collect())
        }
        RouteFormat::Gpx => read_gpx_waypoints(bytes),
    }
}

/// Track points win over route points, which win over bare waypoints.
fn read_gpx_waypoints(reader: impl Read) -> Result<Vec<Coordinate>, LoadError> {
    let document = gpx::read(reader)?;

    let to_coord = |wpt: &gpx::Waypoint| {
        let point = wpt.point();
        Coordinate {
            lat: point.y(),
            lon: point.x(),
        }
    };

    let track: Vec<Coordinate> = document
        .tracks
        .iter()
        .flat_map(|t| t.segments.iter())
        .flat_map(|s| s.points.iter())
        .map(to_coord)
        .collect();
    if !track.is_empty() {
        return Ok(track);
    }

    let route: Vec<Coordinate> = document
        .routes
        .iter()
        .flat_map(|r| r.points.iter())
        .map(to_coord)
        .collect();
    if !route.is_empty() {
        return Ok(route);
    }

    Ok(document.waypoints.iter().map(to_coord).collect())
}

pub fn route_from_bytes(bytes: &[u8], format: RouteFormat) -> Result<Route, LoadError> {
    Route::closed_loop(parse_waypoints(bytes, format)?)
}

/// Fetch the waypoint list once and close it into a round trip.
///
/// No timeout applies: a source that never answers keeps the caller waiting.
pub async fn load_route(source: &RouteSource) -> Result<Route, LoadError> {
    tracing::debug!("loading route from {source}");
    let bytes = match source {
        RouteSource::File(path) => read_file(path).await?,
        RouteSource::Http(url) => fetch(url).await?,
    };
    let format = source
        .format_hint()
        .unwrap_or_else(|| RouteFormat::sniff(&bytes));

    let route = route_from_bytes(&bytes, format)?;
    tracing::info!(
        "loaded route from {source}: {} points, {:.2} km",
        route.len(),
        route.total_distance_km()
    );
    Ok(route)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn fetch(url: &str) -> Result<Vec<u8>, LoadError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    Ok(response.bytes().await?.to_vec())
}
