use std::{sync::Arc, time::Duration};

use crate::{
    geo::{bearing_deg, haversine_km},
    models::{Coordinate, DerivedStats, PlaybackView, PlayerSnapshot},
    route::Route,
    stats,
};

/// Sub-steps per segment; each tick moves `1 / STEPS_PER_SEGMENT` of a segment.
pub const STEPS_PER_SEGMENT: u32 = 50;
pub const BASE_TICK: Duration = Duration::from_millis(50);
const MIN_TICK: Duration = Duration::from_millis(1);
/// Above 50 the tick interval is already at its 1 ms floor.
pub const MAX_SPEED_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("speed multiplier must be a positive number up to {MAX_SPEED_MULTIPLIER}, got {0}")]
    InvalidSpeed(f64),
}

pub fn validate_speed(multiplier: f64) -> Result<f64, PlaybackError> {
    if multiplier > 0.0 && multiplier <= MAX_SPEED_MULTIPLIER {
        Ok(multiplier)
    } else {
        Err(PlaybackError::InvalidSpeed(multiplier))
    }
}

/// Time between two ticks at the given speed: `50 ms / speed`.
///
/// Doubling the speed halves the interval while the per-tick step stays fixed.
/// Never shorter than one millisecond.
pub fn tick_interval(speed_multiplier: f64) -> Duration {
    let nanos = (BASE_TICK.as_nanos() as f64 / speed_multiplier).round();
    Duration::from_nanos(nanos as u64).max(MIN_TICK)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub segment_index: usize,
    /// Sub-step inside the current segment, in `0..STEPS_PER_SEGMENT`.
    pub step: u32,
    pub is_playing: bool,
    pub speed_multiplier: f64,
    pub distance_covered_m: f64,
    pub heading_deg: f64,
    pub position: Coordinate,
}

impl PlaybackState {
    pub fn initial(route: &Route, speed_multiplier: f64) -> Self {
        Self {
            segment_index: 0,
            step: 0,
            is_playing: false,
            speed_multiplier,
            distance_covered_m: 0.0,
            heading_deg: 0.0,
            position: route.start(),
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        f64::from(self.step) / f64::from(STEPS_PER_SEGMENT)
    }

    pub fn at_end(&self, route: &Route) -> bool {
        self.segment_index + 1 >= route.len()
    }
}

/// Result of one pure tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Not playing; nothing changed.
    Idle,
    /// The vehicle moved to `position`, which joins the visited path.
    Moved { state: PlaybackState, position: Coordinate },
    /// No segment left: playback stopped and the round trip is done.
    Completed { state: PlaybackState },
}

/// One tick as a pure function of the route and the current state.
pub fn advance(route: &Route, state: &PlaybackState) -> Advance {
    if !state.is_playing {
        return Advance::Idle;
    }

    let Some((start, end)) = route.segment(state.segment_index) else {
        return Advance::Completed {
            state: PlaybackState {
                is_playing: false,
                ..*state
            },
        };
    };

    let position = start.interpolate(end, state.progress_fraction());
    let mut next = PlaybackState {
        position,
        heading_deg: bearing_deg(start, end),
        step: state.step + 1,
        ..*state
    };

    // Distance is credited in one piece when a segment finishes.
    if next.step >= STEPS_PER_SEGMENT {
        next.step = 0;
        next.segment_index += 1;
        next.distance_covered_m += haversine_km(start, end) * 1000.0;
    }

    Advance::Moved {
        state: next,
        position,
    }
}

/// What a single [`PlaybackEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    RouteCompleted,
}

/// Owns the animation state of one vehicle on one route.
///
/// The engine never schedules anything itself; a driver calls [`tick`](Self::tick).
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    route: Arc<Route>,
    state: PlaybackState,
    visited: Vec<Coordinate>,
    round_trip_completed: bool,
}

impl PlaybackEngine {
    pub fn new(route: Arc<Route>, speed_multiplier: f64) -> Result<Self, PlaybackError> {
        let speed_multiplier = validate_speed(speed_multiplier)?;
        let state = PlaybackState::initial(&route, speed_multiplier);
        let visited = vec![route.start()];
        Ok(Self {
            route,
            state,
            visited,
            round_trip_completed: false,
        })
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn position(&self) -> Coordinate {
        self.state.position
    }

    pub fn heading_deg(&self) -> f64 {
        self.state.heading_deg
    }

    pub fn visited_path(&self) -> &[Coordinate] {
        &self.visited
    }

    pub fn round_trip_completed(&self) -> bool {
        self.round_trip_completed
    }

    /// Start or resume playback. Returns whether the engine is now playing;
    /// a finished route stays stopped until [`reset`](Self::reset).
    pub fn play(&mut self) -> bool {
        if self.state.at_end(&self.route) {
            return false;
        }
        self.state.is_playing = true;
        true
    }

    pub fn pause(&mut self) {
        self.state.is_playing = false;
    }

    pub fn reset(&mut self) {
        self.state = PlaybackState::initial(&self.route, self.state.speed_multiplier);
        self.visited.clear();
        self.visited.push(self.route.start());
        self.round_trip_completed = false;
    }

    /// Invalid multipliers are rejected and the previous one is kept.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<(), PlaybackError> {
        self.state.speed_multiplier = validate_speed(multiplier)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.state.speed_multiplier)
    }

    pub fn tick(&mut self) -> TickOutcome {
        match advance(&self.route, &self.state) {
            Advance::Idle => TickOutcome::Idle,
            Advance::Moved { state, position } => {
                let finished_segment = state.segment_index != self.state.segment_index;
                self.state = state;
                self.visited.push(position);
                if finished_segment {
                    tracing::trace!(
                        segment = state.segment_index,
                        distance_m = state.distance_covered_m,
                        "segment completed"
                    );
                }
                TickOutcome::Moved
            }
            Advance::Completed { state } => {
                self.state = state;
                self.round_trip_completed = true;
                TickOutcome::RouteCompleted
            }
        }
    }

    pub fn stats(&self) -> DerivedStats {
        stats::compute(&self.route, &self.state)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.state.position,
            heading_deg: self.state.heading_deg,
            visited_path: self.visited.clone(),
            playback: PlaybackView {
                is_playing: self.state.is_playing,
                speed_multiplier: self.state.speed_multiplier,
                segment_index: self.state.segment_index,
                progress_fraction: self.state.progress_fraction(),
            },
            stats: self.stats(),
            round_trip_completed: self.round_trip_completed,
        }
    }
}
