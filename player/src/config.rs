use std::net::SocketAddr;

use clap::Parser;

use crate::{playback::validate_speed, route::RouteSource};

pub const SAMPLE_ROUTE_PATH: &str = "player/data/sample_route.json";

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Replay a vehicle driving a closed-loop route and serve its state over HTTP"
)]
pub struct Args {
    /// Route file (JSON waypoint records or GPX) or http(s) URL
    #[arg(long, env = "ROUTE_SOURCE", default_value = SAMPLE_ROUTE_PATH)]
    pub route: RouteSource,

    /// Address the HTTP API listens on
    #[arg(long, env = "PLAYER_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Initial speed multiplier (ticks every 50 ms / speed)
    #[arg(long, env = "PLAYER_SPEED", default_value_t = 1.0, value_parser = parse_speed)]
    pub speed: f64,
}

fn parse_speed(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|_| format!("`{raw}` is not a number"))?;
    validate_speed(value).map_err(|err| err.to_string())
}
