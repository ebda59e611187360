use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use crate::{
    models::PlayerSnapshot,
    playback::{PlaybackEngine, PlaybackError, TickOutcome},
};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error("playback task is no longer running")]
    Closed,
}

enum Command {
    Play(oneshot::Sender<PlayerSnapshot>),
    Pause(oneshot::Sender<PlayerSnapshot>),
    Reset(oneshot::Sender<PlayerSnapshot>),
    SetSpeed(f64, oneshot::Sender<Result<PlayerSnapshot, PlaybackError>>),
    Snapshot(oneshot::Sender<PlayerSnapshot>),
}

/// Cloneable handle to the task that owns a [`PlaybackEngine`].
///
/// Every call waits until the task has applied the command, so a command
/// returning means any tick scheduled before it has been dropped.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
}

impl PlayerHandle {
    /// Spawn the playback task on the current tokio runtime.
    pub fn spawn(engine: PlaybackEngine) -> Self {
        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run(engine, rx));
        Self { commands }
    }

    pub async fn play(&self) -> Result<PlayerSnapshot, DriverError> {
        self.request(Command::Play).await
    }

    pub async fn pause(&self) -> Result<PlayerSnapshot, DriverError> {
        self.request(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<PlayerSnapshot, DriverError> {
        self.request(Command::Reset).await
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot, DriverError> {
        self.request(Command::Snapshot).await
    }

    pub async fn set_speed(&self, multiplier: f64) -> Result<PlayerSnapshot, DriverError> {
        let result = self
            .request(|reply| Command::SetSpeed(multiplier, reply))
            .await?;
        Ok(result?)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DriverError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| DriverError::Closed)?;
        response.await.map_err(|_| DriverError::Closed)
    }
}

async fn run(mut engine: PlaybackEngine, mut commands: mpsc::Receiver<Command>) {
    let mut next_tick: Option<Instant> = None;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("all player handles dropped, stopping playback task");
                    break;
                };
                // The sleep for the old deadline was dropped when this branch
                // won, so no stale tick can land after the command.
                if apply(&mut engine, command) {
                    next_tick = engine
                        .is_playing()
                        .then(|| Instant::now() + engine.tick_interval());
                }
            }
            _ = sleep_until(next_tick.unwrap_or_else(Instant::now)), if next_tick.is_some() => {
                match engine.tick() {
                    TickOutcome::Moved => {
                        next_tick = Some(Instant::now() + engine.tick_interval());
                    }
                    TickOutcome::RouteCompleted => {
                        let stats = engine.stats();
                        tracing::info!(
                            "round trip completed: {:.2} km in {} segments",
                            stats.distance_covered_km,
                            engine.route().segment_count()
                        );
                        next_tick = None;
                    }
                    TickOutcome::Idle => next_tick = None,
                }
            }
        }
    }
}

/// Returns whether the tick schedule has to restart.
///
/// Commands that leave the play state and the speed as they were keep the
/// pending deadline, so repeating them cannot hold the vehicle in place.
fn apply(engine: &mut PlaybackEngine, command: Command) -> bool {
    match command {
        Command::Play(reply) => {
            let was_playing = engine.is_playing();
            if !engine.play() {
                tracing::debug!("play ignored: route already finished");
            }
            let _ = reply.send(engine.snapshot());
            !was_playing
        }
        Command::Pause(reply) => {
            engine.pause();
            let _ = reply.send(engine.snapshot());
            true
        }
        Command::Reset(reply) => {
            engine.reset();
            tracing::debug!("playback reset");
            let _ = reply.send(engine.snapshot());
            true
        }
        Command::SetSpeed(multiplier, reply) => {
            let previous = engine.state().speed_multiplier;
            match engine.set_speed(multiplier) {
                Ok(()) => {
                    tracing::debug!("speed multiplier set to {multiplier}");
                    let _ = reply.send(Ok(engine.snapshot()));
                    previous != multiplier
                }
                Err(err) => {
                    tracing::warn!("rejected speed change: {err}");
                    let _ = reply.send(Err(err));
                    false
                }
            }
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
            false
        }
    }
}
