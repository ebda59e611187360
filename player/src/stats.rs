use crate::{models::DerivedStats, playback::PlaybackState, route::Route};

/// Nominal km/h shown for a speed multiplier of 1.
///
/// Display only: it has no link to how far a tick actually moves.
pub const DISPLAY_KMH_PER_MULTIPLIER: f64 = 40.0;

/// Derive the panel figures from the route and the current playback state.
///
/// Progress counts finished segments only, so it moves in steps of
/// `100 / segment_count` and reads 100 once the round trip is done.
pub fn compute(route: &Route, state: &PlaybackState) -> DerivedStats {
    let segments = route.segment_count().max(1) as f64;
    let progress = (state.segment_index as f64 / segments * 100.0).min(100.0);

    DerivedStats {
        distance_covered_m: state.distance_covered_m,
        distance_covered_km: round_to(state.distance_covered_m / 1000.0, 2),
        total_route_distance_km: round_to(route.total_distance_km(), 2),
        progress_percent: round_to(progress, 1),
        display_speed_kmh: round_to(state.speed_multiplier * DISPLAY_KMH_PER_MULTIPLIER, 1),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
