pub use shared::{
    ApiError, Coordinate, DerivedStats, PlaybackView, PlayerSnapshot, PlayerStatus, RouteBounds,
    RouteMetadata, RouteResponse, SpeedRequest, WaypointRecord,
};
