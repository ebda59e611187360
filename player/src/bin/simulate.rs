use std::{sync::Arc, time::Duration};

use clap::Parser;
use player::{
    config::SAMPLE_ROUTE_PATH,
    playback::{PlaybackEngine, TickOutcome, tick_interval},
    route::{RouteSource, load_route},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Play a route to completion without waiting on the clock"
)]
struct Args {
    /// Route file (JSON waypoint records or GPX) or http(s) URL
    #[arg(long, default_value = SAMPLE_ROUTE_PATH)]
    route: RouteSource,

    /// Speed multiplier used to compute the simulated wall-clock time
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let route = Arc::new(load_route(&args.route).await?);
    let mut engine = PlaybackEngine::new(route.clone(), args.speed)?;
    engine.play();

    let interval = tick_interval(args.speed);
    let mut ticks: u32 = 0;
    let mut segment = engine.state().segment_index;

    loop {
        let outcome = engine.tick();
        ticks += 1;
        if outcome == TickOutcome::RouteCompleted {
            break;
        }
        if engine.state().segment_index != segment {
            segment = engine.state().segment_index;
            let stats = engine.stats();
            tracing::info!(
                "segment {}/{} done: {:.2} km covered, {:.1}%, heading {:.0}°",
                segment,
                route.segment_count(),
                stats.distance_covered_km,
                stats.progress_percent,
                engine.heading_deg()
            );
        }
    }

    let stats = engine.stats();
    let elapsed: Duration = interval * ticks;
    tracing::info!(
        "round trip of {:.2} km finished after {} ticks ({:.1?} at {} km/h displayed)",
        stats.total_route_distance_km,
        ticks,
        elapsed,
        stats.display_speed_kmh
    );
    Ok(())
}
