//! Game loop thread: runs the simulation engine at 30Hz and publishes snapshots.
//!
//! The engine is created before the thread starts, so a bad configuration is
//! reported to the caller, and then moved into the thread, which owns it
//! from then on. Other threads talk to it through an `EngineHandle`: work,
//! delayed work and player commands arrive via an `mpsc` channel and are
//! queued at the next tick boundary. The latest snapshot is stored in
//! shared state for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use anuto_core::commands::PlayerCommand;
use anuto_core::constants::TICK_RATE;
use anuto_core::error::{CommandError, LoopError};
use anuto_core::settings::GameConfig;
use anuto_core::state::GameStateSnapshot;

use crate::engine::{SimConfig, SimulationEngine};
use crate::scheduler::Work;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Messages accepted by the loop thread.
pub enum LoopMessage {
    Post(Work),
    PostDelayed { delay_secs: f32, work: Work },
    Command(PlayerCommand),
    Shutdown,
}

/// Cloneable, thread-safe access to a running loop.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<LoopMessage>,
    thread: ThreadId,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
}

impl EngineHandle {
    /// Run `work` on the simulation thread at its next tick boundary.
    pub fn post(
        &self,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) -> Result<(), LoopError> {
        self.send(LoopMessage::Post(Box::new(work)))
    }

    /// Run `work` once `delay_secs` of simulated time have passed after the
    /// loop receives it.
    pub fn post_delayed(
        &self,
        delay_secs: f32,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) -> Result<(), LoopError> {
        self.send(LoopMessage::PostDelayed {
            delay_secs,
            work: Box::new(work),
        })
    }

    pub fn send_command(&self, command: PlayerCommand) -> Result<(), LoopError> {
        self.send(LoopMessage::Command(command))
    }

    pub fn start_next_wave(&self) -> Result<(), LoopError> {
        self.send_command(PlayerCommand::StartNextWave)
    }

    /// True unless called on the simulation thread.
    pub fn is_thread_change_needed(&self) -> bool {
        thread::current().id() != self.thread
    }

    /// The most recently published snapshot. May be one tick stale.
    pub fn latest_snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|lock| lock.clone())
    }

    fn send(&self, message: LoopMessage) -> Result<(), LoopError> {
        self.tx.send(message).map_err(|_| LoopError::Disconnected)
    }
}

/// A running loop thread.
pub struct GameLoop {
    handle: EngineHandle,
    join: Option<JoinHandle<()>>,
}

impl GameLoop {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.handle.tx.send(LoopMessage::Shutdown);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("game loop thread panicked");
            }
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(config: GameConfig, sim: SimConfig) -> Result<GameLoop, LoopError> {
    let engine = SimulationEngine::new(config, sim)?;
    let (tx, rx) = mpsc::channel::<LoopMessage>();
    let latest_snapshot = Arc::new(Mutex::new(None));

    let shared = Arc::clone(&latest_snapshot);
    let join = thread::Builder::new()
        .name("anuto-game-loop".into())
        .spawn(move || run_game_loop(engine, rx, &shared))?;

    let handle = EngineHandle {
        tx,
        thread: join.thread().id(),
        latest_snapshot,
    };
    Ok(GameLoop {
        handle,
        join: Some(join),
    })
}

/// The game loop. Runs until Shutdown or until every handle is dropped.
fn run_game_loop(
    mut engine: SimulationEngine,
    rx: mpsc::Receiver<LoopMessage>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    info!(time_scale = engine.time_scale(), "game loop started");
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending messages
        loop {
            match rx.try_recv() {
                Ok(LoopMessage::Post(work)) => engine.post_boxed(work),
                Ok(LoopMessage::PostDelayed { delay_secs, work }) => {
                    engine.post_delayed_boxed(delay_secs, work)
                }
                Ok(LoopMessage::Command(command)) => engine.queue_command(command),
                Ok(LoopMessage::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!(tick = engine.time().tick, "game loop stopped");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until next tick, adjusting for time_scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind, reset to avoid a catch-up spiral
            debug!("game loop behind schedule, resetting tick clock");
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_loop() -> GameLoop {
        spawn_game_loop(
            GameConfig::default(),
            SimConfig {
                seed: 7,
                time_scale: 4.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_post_runs_on_loop_thread() {
        let game_loop = fast_loop();
        let handle = game_loop.handle();
        assert!(handle.is_thread_change_needed());

        let (tx, rx) = mpsc::channel();
        let inner = handle.clone();
        handle
            .post(move |_engine| {
                let _ = tx.send(inner.is_thread_change_needed());
                Ok(())
            })
            .unwrap();

        let on_other_thread = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!on_other_thread);
        game_loop.shutdown();
    }

    #[test]
    fn test_posts_from_many_threads_all_run() {
        let game_loop = fast_loop();
        let (tx, rx) = mpsc::channel();

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let handle = game_loop.handle();
                let tx = tx.clone();
                thread::spawn(move || {
                    handle
                        .post(move |_engine| {
                            let _ = tx.send(i);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut seen: Vec<i32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        game_loop.shutdown();
    }

    #[test]
    fn test_snapshot_published() {
        let game_loop = fast_loop();
        let handle = game_loop.handle();
        handle.start_next_wave().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut started = false;
        while Instant::now() < deadline {
            if handle
                .latest_snapshot()
                .is_some_and(|snapshot| snapshot.game_started)
            {
                started = true;
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(started);
        game_loop.shutdown();
    }

    #[test]
    fn test_handle_fails_after_shutdown() {
        let game_loop = fast_loop();
        let handle = game_loop.handle();
        game_loop.shutdown();
        assert!(matches!(
            handle.send_command(PlayerCommand::Pause),
            Err(LoopError::Disconnected)
        ));
    }

    #[test]
    fn test_failing_work_does_not_stop_loop() {
        let game_loop = fast_loop();
        let handle = game_loop.handle();
        handle
            .post(|_engine| Err(CommandError::UnknownEntity(99)))
            .unwrap();
        handle.post(|_engine| panic!("boom")).unwrap();

        let (tx, rx) = mpsc::channel();
        handle
            .post(move |engine| {
                let _ = tx.send(engine.time().tick);
                Ok(())
            })
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        game_loop.shutdown();
    }

    #[test]
    fn test_invalid_config_reported_before_spawn() {
        let mut config = GameConfig::default();
        config.waves.clear();
        let result = spawn_game_loop(config, SimConfig::default());
        assert!(matches!(result, Err(LoopError::Config(_))));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 30Hz = 33.333ms per tick
        let expected_nanos = 1_000_000_000u64 / 30;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
