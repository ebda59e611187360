use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Raw waypoint record as served by a route source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<WaypointRecord> for Coordinate {
    fn from(record: WaypointRecord) -> Self {
        Coordinate {
            lat: record.latitude,
            lon: record.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub point_count: usize,
    pub segment_count: usize,
    pub bounds: RouteBounds,
    pub start: Coordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub path: Vec<Coordinate>,
    pub distance_km: f64,
    pub gpx_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RouteMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub distance_covered_m: f64,
    pub distance_covered_km: f64,
    pub total_route_distance_km: f64,
    pub progress_percent: f64,
    pub display_speed_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackView {
    pub is_playing: bool,
    pub speed_multiplier: f64,
    pub segment_index: usize,
    pub progress_fraction: f64,
}

/// Everything the map layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Coordinate,
    pub heading_deg: f64,
    pub visited_path: Vec<Coordinate>,
    pub playback: PlaybackView,
    pub stats: DerivedStats,
    pub round_trip_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlayerStatus {
    Loading,
    Failed { message: String },
    Ready { snapshot: PlayerSnapshot },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedRequest {
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
