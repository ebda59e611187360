use std::{sync::Arc, time::Duration};

use player::{
    driver::PlayerHandle,
    models::Coordinate,
    playback::PlaybackEngine,
    route::Route,
};
use tokio::time::sleep;

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate { lat, lon }
}

/// Route long enough that none of the timing windows below reach its end.
fn long_loop() -> Arc<Route> {
    let waypoints = (0..10).map(|i| coord(45.0 + f64::from(i) * 0.01, 5.0)).collect();
    Arc::new(Route::closed_loop(waypoints).unwrap())
}

fn spawn(route: Arc<Route>, speed: f64) -> PlayerHandle {
    PlayerHandle::spawn(PlaybackEngine::new(route, speed).unwrap())
}

async fn ticks_so_far(player: &PlayerHandle) -> usize {
    player.snapshot().await.unwrap().visited_path.len() - 1
}

#[tokio::test(start_paused = true)]
async fn ticks_every_fifty_milliseconds_at_normal_speed() {
    let player = spawn(long_loop(), 1.0);
    player.play().await.unwrap();

    sleep(Duration::from_millis(1_010)).await;
    assert_eq!(ticks_so_far(&player).await, 20);
}

#[tokio::test(start_paused = true)]
async fn doubling_speed_doubles_tick_rate() {
    let player = spawn(long_loop(), 1.0);
    player.play().await.unwrap();

    sleep(Duration::from_millis(1_010)).await;
    let at_normal_speed = ticks_so_far(&player).await;

    player.set_speed(2.0).await.unwrap();
    sleep(Duration::from_millis(1_010)).await;
    let at_double_speed = ticks_so_far(&player).await - at_normal_speed;

    assert_eq!(at_normal_speed, 20);
    assert_eq!(at_double_speed, 40);
}

#[tokio::test(start_paused = true)]
async fn repeated_play_keeps_the_running_schedule() {
    let player = spawn(long_loop(), 1.0);
    player.play().await.unwrap();

    for _ in 0..25 {
        sleep(Duration::from_millis(40)).await;
        player.play().await.unwrap();
    }
    sleep(Duration::from_millis(10)).await;
    assert_eq!(ticks_so_far(&player).await, 20);
}

#[tokio::test(start_paused = true)]
async fn unchanged_speed_keeps_the_running_schedule() {
    let player = spawn(long_loop(), 2.0);
    player.play().await.unwrap();

    // Re-sent faster than the 25 ms interval.
    for _ in 0..50 {
        sleep(Duration::from_millis(20)).await;
        player.set_speed(2.0).await.unwrap();
    }
    sleep(Duration::from_millis(10)).await;
    assert_eq!(ticks_so_far(&player).await, 40);
}

#[tokio::test(start_paused = true)]
async fn pause_cancels_pending_tick_and_play_resumes() {
    let player = spawn(long_loop(), 1.0);
    player.play().await.unwrap();

    sleep(Duration::from_millis(60)).await;
    let paused = player.pause().await.unwrap();
    assert_eq!(paused.visited_path.len(), 2);

    sleep(Duration::from_secs(5)).await;
    let still = player.snapshot().await.unwrap();
    assert_eq!(still, paused);

    let resumed = player.play().await.unwrap();
    assert_eq!(resumed.playback.segment_index, paused.playback.segment_index);
    assert_eq!(
        resumed.playback.progress_fraction,
        paused.playback.progress_fraction
    );

    sleep(Duration::from_millis(60)).await;
    assert_eq!(ticks_so_far(&player).await, 2);
}

#[tokio::test(start_paused = true)]
async fn reset_while_playing_stops_the_schedule() {
    let player = spawn(long_loop(), 1.0);
    player.play().await.unwrap();
    sleep(Duration::from_millis(520)).await;

    let reset = player.reset().await.unwrap();
    assert!(!reset.playback.is_playing);
    assert_eq!(reset.visited_path.len(), 1);
    assert_eq!(reset.stats.distance_covered_m, 0.0);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(player.snapshot().await.unwrap(), reset);
}

#[tokio::test(start_paused = true)]
async fn finishing_the_loop_stops_playback() {
    let route = Arc::new(Route::closed_loop(vec![coord(0.0, 0.0), coord(0.0, 1.0)]).unwrap());
    let player = spawn(route, 10.0);
    player.play().await.unwrap();

    sleep(Duration::from_secs(2)).await;
    let done = player.snapshot().await.unwrap();
    assert!(done.round_trip_completed);
    assert!(!done.playback.is_playing);
    assert_eq!(done.playback.segment_index, 2);
    assert_eq!(done.stats.progress_percent, 100.0);
    assert_eq!(done.stats.distance_covered_km, 222.39);

    let again = player.play().await.unwrap();
    assert!(!again.playback.is_playing);

    let reset = player.reset().await.unwrap();
    assert!(!reset.round_trip_completed);
    assert!(player.play().await.unwrap().playback.is_playing);
}
