use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use player::{
    models::Coordinate,
    playback::{PlaybackEngine, TickOutcome},
    route::Route,
};

fn circular_route(waypoints: usize) -> Arc<Route> {
    let points = (0..waypoints)
        .map(|i| {
            let angle = i as f64 / waypoints as f64 * std::f64::consts::TAU;
            Coordinate {
                lat: 45.93 + 0.05 * angle.sin(),
                lon: 4.57 + 0.05 * angle.cos(),
            }
        })
        .collect();
    Arc::new(Route::closed_loop(points).expect("valid route"))
}

fn benchmark_full_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_round_trip");

    for waypoints in [10, 100, 1_000] {
        let route = circular_route(waypoints);
        group.bench_with_input(BenchmarkId::from_parameter(waypoints), &route, |b, route| {
            b.iter(|| {
                let mut engine = PlaybackEngine::new(route.clone(), 1.0).expect("speed");
                engine.play();
                while engine.tick() != TickOutcome::RouteCompleted {}
                black_box(engine.stats())
            });
        });
    }

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    let route = circular_route(100);
    let mut engine = PlaybackEngine::new(route, 1.0).expect("speed");
    engine.play();
    for _ in 0..2_500 {
        engine.tick();
    }

    c.bench_function("snapshot_mid_route", |b| b.iter(|| black_box(engine.snapshot())));
}

criterion_group!(benches, benchmark_full_round_trip, benchmark_snapshot);
criterion_main!(benches);
