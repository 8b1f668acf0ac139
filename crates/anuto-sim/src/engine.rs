//! Simulation engine, the core of the game.
//!
//! `SimulationEngine` owns every piece of mutable session state: the entity
//! registry, the score board, the wave manager and the work scheduler. It
//! runs on exactly one thread. Completely headless, enabling deterministic
//! testing.
//!
//! One `tick` does, in order:
//! 1. drain posted work (immediate first, then due delayed work),
//! 2. unless paused, let running waves spawn, then tick every committed
//!    entity in registration order,
//! 3. commit buffered adds (`init`) and removals (`clean`),
//! 4. unless paused, advance simulated time,
//! 5. build the snapshot.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use anuto_core::commands::PlayerCommand;
use anuto_core::components::Tower;
use anuto_core::constants::{MAX_TIME_SCALE, MIN_TIME_SCALE};
use anuto_core::enums::EntityKind;
use anuto_core::error::{CommandError, ConfigError};
use anuto_core::events::GameEvent;
use anuto_core::game_state::GameState;
use anuto_core::score::ScoreBoard;
use anuto_core::settings::GameConfig;
use anuto_core::state::{GameStateSnapshot, SessionState};
use anuto_core::types::{EntityId, SimTime};

use crate::registry::Registry;
use crate::scheduler::{Scheduler, Work};
use crate::static_data::StaticDataCache;
use crate::systems::snapshot::SnapshotInput;
use crate::systems::{self, TickContext};
use crate::wave_manager::WaveManager;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
        }
    }
}

/// The simulation engine. Owns the registry and all session state.
pub struct SimulationEngine {
    config: GameConfig,
    seed: u64,
    registry: Registry,
    score: ScoreBoard,
    game_state: GameState,
    waves: WaveManager,
    static_data: StaticDataCache,
    scheduler: Scheduler,
    time: SimTime,
    paused: bool,
    time_scale: f64,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl SimulationEngine {
    /// Create an engine for a new session. Fails if `config` is inconsistent.
    pub fn new(config: GameConfig, sim: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let settings = config.game_settings();
        let score = ScoreBoard::new(settings.credits, settings.lives);
        Ok(Self {
            config,
            seed: sim.seed,
            registry: Registry::new(),
            score,
            game_state: GameState::new(),
            waves: WaveManager::new(),
            static_data: StaticDataCache::new(),
            scheduler: Scheduler::new(),
            time: SimTime::default(),
            paused: false,
            time_scale: clamp_time_scale(sim.time_scale),
            rng: ChaCha8Rng::seed_from_u64(sim.seed),
            events: Vec::new(),
        })
    }

    /// Queue work for the next drain point.
    pub fn post(
        &mut self,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) {
        self.scheduler.post(work);
    }

    /// Queue work to run after `delay_secs` of simulated time.
    pub fn post_delayed(
        &mut self,
        delay_secs: f32,
        work: impl FnOnce(&mut SimulationEngine) -> Result<(), CommandError> + Send + 'static,
    ) {
        self.scheduler.post_delayed(delay_secs, work);
    }

    pub(crate) fn post_boxed(&mut self, work: Work) {
        self.scheduler.post_boxed(work);
    }

    pub(crate) fn post_delayed_boxed(&mut self, delay_secs: f32, work: Work) {
        self.scheduler.post_delayed_boxed(delay_secs, work);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.scheduler.post(move |engine| engine.handle_command(command));
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        for command in commands {
            self.queue_command(command);
        }
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.drain_work();

        if !self.paused {
            let (mut ctx, waves) = self.split();
            waves.tick(&mut ctx);
            systems::tick_all(&mut ctx);
        }
        self.commit();

        if !self.paused {
            self.time.advance();
            self.scheduler.set_now(self.time.tick);
        }

        self.snapshot()
    }

    /// Apply one player command immediately.
    pub fn handle_command(&mut self, command: PlayerCommand) -> Result<(), CommandError> {
        match command {
            PlayerCommand::StartNextWave => self.start_next_wave(),
            PlayerCommand::BuildTower { tower, position } => {
                self.build_tower(&tower, position)?;
                Ok(())
            }
            PlayerCommand::SellTower { entity_id } => self.sell_tower(EntityId(entity_id)),
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = clamp_time_scale(scale);
                Ok(())
            }
            PlayerCommand::Pause => {
                self.paused = true;
                Ok(())
            }
            PlayerCommand::Resume => {
                self.paused = false;
                Ok(())
            }
            PlayerCommand::Restart => {
                self.restart();
                Ok(())
            }
        }
    }

    /// Call the next wave if it is ready.
    pub fn start_next_wave(&mut self) -> Result<(), CommandError> {
        let (mut ctx, waves) = self.split();
        waves.start_next_wave(&mut ctx)?;
        Ok(())
    }

    /// Buy a tower and place it. It joins the sweep at the next commit.
    pub fn build_tower(&mut self, name: &str, position: Vec2) -> Result<EntityId, CommandError> {
        if self.game_state.is_over() {
            return Err(CommandError::GameOver);
        }
        let config = self
            .config
            .tower_config(name)
            .ok_or_else(|| CommandError::UnknownTower(name.to_string()))?;
        self.score.take_credits(config.value)?;

        let entity = world_setup::spawn_tower(&mut self.registry, config, position);
        let entity_id = self.registry.entity_id(entity).unwrap_or_default();
        self.events.push(GameEvent::TowerBuilt {
            entity_id: entity_id.0,
            tower: name.to_string(),
        });
        debug!(tower = name, entity_id = entity_id.0, "tower built");
        Ok(entity_id)
    }

    /// Sell a tower for its current value.
    pub fn sell_tower(&mut self, id: EntityId) -> Result<(), CommandError> {
        let entity = self
            .registry
            .lookup(id)
            .filter(|e| self.registry.kind(*e) == Some(EntityKind::Tower))
            .ok_or(CommandError::UnknownEntity(id.0))?;
        let value = self
            .registry
            .world()
            .get::<&Tower>(entity)
            .map(|tower| tower.value)
            .map_err(|_| CommandError::UnknownEntity(id.0))?;

        self.registry.remove(entity);
        self.score.give_credits(value, false);
        self.events.push(GameEvent::TowerSold {
            entity_id: id.0,
            value,
        });
        Ok(())
    }

    /// Throw away the session and start over with the same settings.
    /// Pending work, including delayed work, is discarded.
    pub fn restart(&mut self) {
        info!(session = self.game_state.session() + 1, "restarting game");
        self.scheduler.clear();
        self.registry.clear();
        self.static_data.clear();

        let settings = self.config.game_settings();
        self.score.reset(settings.credits, settings.lives);
        self.game_state.restart();
        self.waves.game_restart();

        self.time = SimTime::default();
        self.scheduler.set_now(0);
        self.paused = false;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.events.push(GameEvent::GameRestarted);
    }

    /// Plain values needed to resume this session.
    pub fn session_state(&self) -> SessionState {
        SessionState {
            tick_count: self.time.tick,
            next_entity_id: self.registry.next_entity_id(),
            wave_number: self.waves.wave_number(),
            credits: self.score.credits(),
            credits_earned: self.score.credits_earned(),
            lives: self.score.lives(),
        }
    }

    /// Resume from persisted values. Entities are not persisted; the map
    /// starts empty with no wave running. A finished game becomes playable
    /// again and work queued by the old session is dropped.
    pub fn load_session(&mut self, state: &SessionState) {
        self.scheduler.clear();
        self.registry.clear();
        self.static_data.clear();
        self.game_state.restart();
        self.paused = false;
        self.registry.set_next_entity_id(state.next_entity_id);
        self.time = SimTime::at_tick(state.tick_count);
        self.scheduler.set_now(state.tick_count);
        self.score.restore(state.credits, state.credits_earned, state.lives);
        self.waves.load_wave_number(state.wave_number);
        if state.wave_number > 0 {
            self.game_state.set_game_started();
        }
        info!(tick = state.tick_count, wave = state.wave_number, "session loaded");
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut ScoreBoard {
        &mut self.score
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn waves(&self) -> &WaveManager {
        &self.waves
    }

    pub fn waves_mut(&mut self) -> &mut WaveManager {
        &mut self.waves
    }

    pub fn static_data(&self) -> &StaticDataCache {
        &self.static_data
    }

    /// Build a snapshot of the current state, handing over pending events.
    pub fn snapshot(&mut self) -> GameStateSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            SnapshotInput {
                registry: &self.registry,
                score: &self.score,
                game_state: &self.game_state,
                waves: &self.waves,
                time: self.time,
                paused: self.paused,
            },
            events,
        )
    }

    /// Spawn an enemy outside of any wave (for tests).
    #[cfg(test)]
    pub(crate) fn spawn_test_enemy(&mut self, name: &str, offset: f32) -> hecs::Entity {
        let config = self.config.enemy_config(name).expect("known enemy");
        let path = self.config.path(0).expect("path 0");
        world_setup::spawn_enemy(
            &mut self.registry,
            path,
            world_setup::EnemySpawn {
                config,
                wave: anuto_core::types::WaveId(u32::MAX),
                health_modifier: 1.0,
                reward_modifier: 1.0,
                path_index: 0,
                offset,
            },
        )
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Run `f` against the same context systems get during a tick.
    #[cfg(test)]
    pub(crate) fn with_tick_context<R>(&mut self, f: impl FnOnce(&mut TickContext) -> R) -> R {
        let (mut ctx, _) = self.split();
        f(&mut ctx)
    }

    fn split(&mut self) -> (TickContext<'_>, &mut WaveManager) {
        (
            TickContext {
                registry: &mut self.registry,
                score: &mut self.score,
                game_state: &mut self.game_state,
                static_data: &mut self.static_data,
                config: &self.config,
                rng: &mut self.rng,
                events: &mut self.events,
                scheduler: &mut self.scheduler,
                tick: self.time.tick,
            },
            &mut self.waves,
        )
    }

    /// Run every due work item. Failures are logged and never stop the loop.
    /// A restart discards the rest of the batch.
    fn drain_work(&mut self) {
        let session = self.game_state.session();
        for work in self.scheduler.take_due() {
            if self.game_state.session() != session {
                debug!("dropping work queued before restart");
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| work(self))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(tick = self.time.tick, error = %err, "work item failed"),
                Err(payload) => {
                    let err = CommandError::Panicked(panic_message(payload.as_ref()));
                    error!(tick = self.time.tick, error = %err, "work item panicked");
                }
            }
        }
    }

    /// Commit buffered adds and removals until none are left. `init` and
    /// `clean` may queue more of both.
    fn commit(&mut self) {
        while self.registry.has_pending() {
            let (mut ctx, waves) = self.split();

            for entity in ctx.registry.commit_adds() {
                systems::init(&mut ctx, entity);
            }

            for entity in ctx.registry.take_removals() {
                if let Some(departure) = systems::clean(&mut ctx, entity) {
                    waves.enemy_removed(departure.wave, departure.entity, &mut ctx);
                }
                ctx.registry.despawn(entity);
            }
        }
    }
}

fn clamp_time_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
