use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Waypoint};

use crate::error::PlayerError;
use crate::route::Route;

pub const CREATOR: &str = "route_player";

/// The closed loop as a GPX 1.1 `<rte>`, one `<rtept>` per route point.
///
/// Points are named by their index; the repeated start point is `finish`.
pub fn route_as_gpx(route: &Route) -> Gpx {
    let last = route.len() - 1;
    let points = route
        .points()
        .iter()
        .enumerate()
        .map(|(idx, coord)| {
            let mut waypoint = Waypoint::new(Point::new(coord.lon, coord.lat));
            waypoint.name = Some(match idx {
                0 => "start".to_string(),
                i if i == last => "finish".to_string(),
                i => format!("wp{i}"),
            });
            waypoint
        })
        .collect();

    let gpx_route = gpx::Route {
        name: Some("round trip".into()),
        description: Some(format!(
            "{} segments, {:.2} km",
            route.segment_count(),
            route.total_distance_km()
        )),
        points,
        ..Default::default()
    };

    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        routes: vec![gpx_route],
        ..Default::default()
    }
}

pub fn encode_route_base64(route: &Route) -> Result<String, PlayerError> {
    let mut buffer = Vec::new();
    gpx::write(&route_as_gpx(route), &mut buffer)?;
    Ok(BASE64.encode(buffer))
}
