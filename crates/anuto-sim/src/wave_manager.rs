//! Wave progression, the next-wave gate and the wave bonuses.
//!
//! A new wave can be called once `MIN_WAVE_DELAY` simulated seconds have
//! passed since the previous call and fewer than `MAX_WAVES_IN_GAME` waves
//! are running. Calling a wave while others are still running pays the
//! current wave's reward plus an early bonus. Published values notify their
//! listeners only when they change.

use hecs::Entity;
use tracing::{debug, info};

use anuto_core::constants::{MAX_WAVES_IN_GAME, MIN_WAVE_DELAY};
use anuto_core::error::ConfigError;
use anuto_core::events::GameEvent;
use anuto_core::observable::Observable;
use anuto_core::types::WaveId;

use crate::difficulty;
use crate::systems::{tower, TickContext};
use crate::wave_attender::WaveAttender;

#[derive(Debug)]
pub struct WaveManager {
    /// Waves started so far; also the index of the next descriptor pass.
    next_wave_index: Observable<u32>,
    remaining_enemies_count: Observable<u32>,
    next_wave_ready: Observable<bool>,
    min_wave_delay_timeout: bool,
    active_waves: Vec<WaveAttender>,
    next_wave_id: u32,
}

impl Default for WaveManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveManager {
    pub fn new() -> Self {
        Self {
            next_wave_index: Observable::new(0),
            remaining_enemies_count: Observable::new(0),
            next_wave_ready: Observable::new(true),
            min_wave_delay_timeout: true,
            active_waves: Vec::new(),
            next_wave_id: 0,
        }
    }

    pub fn wave_number(&self) -> u32 {
        self.next_wave_index.value()
    }

    pub fn remaining_enemies_count(&self) -> u32 {
        self.remaining_enemies_count.value()
    }

    pub fn is_next_wave_ready(&self) -> bool {
        self.next_wave_ready.value()
    }

    pub fn active_wave_count(&self) -> usize {
        self.active_waves.len()
    }

    pub fn active_waves(&self) -> &[WaveAttender] {
        &self.active_waves
    }

    pub fn on_wave_number_changed(&mut self, listener: impl FnMut(&u32) + Send + 'static) {
        self.next_wave_index.subscribe(listener);
    }

    pub fn on_remaining_enemies_changed(&mut self, listener: impl FnMut(&u32) + Send + 'static) {
        self.remaining_enemies_count.subscribe(listener);
    }

    pub fn on_next_wave_ready_changed(&mut self, listener: impl FnMut(&bool) + Send + 'static) {
        self.next_wave_ready.subscribe(listener);
    }

    /// Call the next wave. Does nothing unless the next wave is ready and
    /// the game is still running.
    pub fn start_next_wave(&mut self, ctx: &mut TickContext) -> Result<(), ConfigError> {
        if !self.next_wave_ready.value() {
            debug!(wave = self.wave_number(), "next wave not ready");
            return Ok(());
        }
        if ctx.game_state.is_over() {
            return Ok(());
        }

        ctx.game_state.set_game_started();
        self.give_wave_reward_and_early_bonus(ctx);
        self.create_and_start_wave_attender(ctx)?;
        self.update_bonus_on_score_board(ctx);
        self.update_remaining_enemies_count();

        self.next_wave_index.update(|index| index + 1);
        self.next_wave_ready.set(false);
        self.trigger_min_wave_delay(ctx);
        Ok(())
    }

    /// Release due enemies of every running wave.
    pub fn tick(&mut self, ctx: &mut TickContext) {
        for wave in &mut self.active_waves {
            wave.tick(ctx);
        }
    }

    /// An enemy of wave `wave` left the game.
    pub fn enemy_removed(&mut self, wave: WaveId, enemy: Entity, ctx: &mut TickContext) {
        let Some(index) = self.active_waves.iter().position(|w| w.id() == wave) else {
            return;
        };
        if self.active_waves[index].enemy_removed(enemy) {
            let mut finished = self.active_waves.remove(index);
            finished.give_wave_reward(ctx.score);
            self.wave_finished(&finished, ctx);
        }
        self.update_bonus_on_score_board(ctx);
        self.update_remaining_enemies_count();
    }

    /// The min-delay timer fired.
    pub fn min_wave_delay_elapsed(&mut self) {
        debug!("minimum wave delay elapsed");
        self.min_wave_delay_timeout = true;
        self.update_next_wave_ready();
    }

    pub fn game_restart(&mut self) {
        self.active_waves.clear();
        self.next_wave_index.set(0);
        self.min_wave_delay_timeout = true;
        self.next_wave_ready.set(true);
        self.update_remaining_enemies_count();
    }

    /// Resume at a persisted wave number with no wave running.
    pub fn load_wave_number(&mut self, wave_number: u32) {
        self.active_waves.clear();
        self.next_wave_index.set(wave_number);
        self.min_wave_delay_timeout = true;
        self.next_wave_ready.set(true);
        self.update_remaining_enemies_count();
    }

    fn give_wave_reward_and_early_bonus(&mut self, ctx: &mut TickContext) {
        let early_bonus = self.early_bonus(ctx);
        let Some(current) = self.active_waves.last_mut() else {
            return;
        };
        let wave_reward = current.give_wave_reward(ctx.score);
        ctx.score.give_credits(early_bonus, false);
        ctx.events.push(GameEvent::EarlyBonus {
            wave_reward,
            bonus: early_bonus,
        });
    }

    fn create_and_start_wave_attender(&mut self, ctx: &mut TickContext) -> Result<(), ConfigError> {
        let waves = ctx.config.waves();
        let wave_index = self.next_wave_index.value();
        let iteration = difficulty::iteration_number(wave_index, waves.len())?;
        let descriptor_index = wave_index as usize % waves.len();
        let descriptor = waves[descriptor_index].clone();

        let id = WaveId(self.next_wave_id);
        self.next_wave_id += 1;
        let mut wave = WaveAttender::new(id, wave_index + 1, descriptor_index, descriptor);

        let extend = difficulty::wave_extend(iteration, &waves[descriptor_index]);
        wave.set_extend(extend);

        let settings = ctx.config.game_settings();
        let credits_earned = ctx.score.credits_earned();
        let wave_health = difficulty::wave_health(ctx.config, descriptor_index, extend)?;
        let modifiers = difficulty::wave_modifiers(settings, credits_earned, wave_health);
        wave.modify_enemy_health(modifiers.health);
        wave.modify_enemy_reward(modifiers.reward);
        wave.modify_wave_reward(iteration);

        info!(
            wave_number = wave.wave_number(),
            iteration,
            extend,
            wave_health,
            credits_earned,
            damage_possible = modifiers.damage_possible,
            health_modifier = wave.enemy_health_modifier(),
            reward_modifier = wave.enemy_reward_modifier(),
            "wave started"
        );

        wave.start(ctx.tick, ctx.config)?;
        ctx.events.push(GameEvent::WaveStarted {
            wave_number: wave.wave_number(),
            extend,
            health_modifier: wave.enemy_health_modifier(),
            reward_modifier: wave.enemy_reward_modifier(),
        });
        self.active_waves.push(wave);
        Ok(())
    }

    fn wave_finished(&mut self, wave: &WaveAttender, ctx: &mut TickContext) {
        info!(wave_number = wave.wave_number(), "wave finished");
        ctx.events.push(GameEvent::WaveFinished {
            wave_number: wave.wave_number(),
        });
        tower::age_towers(ctx.registry, ctx.config.game_settings().age_modifier);
        self.update_next_wave_ready();
    }

    fn trigger_min_wave_delay(&mut self, ctx: &mut TickContext) {
        self.min_wave_delay_timeout = false;
        ctx.scheduler.post_delayed(MIN_WAVE_DELAY, |engine| {
            engine.waves_mut().min_wave_delay_elapsed();
            Ok(())
        });
    }

    fn update_next_wave_ready(&mut self) {
        if self.next_wave_ready.value()
            || !self.min_wave_delay_timeout
            || self.active_waves.len() >= MAX_WAVES_IN_GAME
        {
            return;
        }
        self.next_wave_ready.set(true);
    }

    fn early_bonus(&self, ctx: &TickContext) -> u32 {
        let remaining: f32 = self
            .active_waves
            .iter()
            .map(WaveAttender::remaining_enemies_reward)
            .sum();
        difficulty::early_bonus(ctx.config.game_settings(), remaining)
    }

    fn update_bonus_on_score_board(&mut self, ctx: &mut TickContext) {
        let wave_bonus = self.active_waves.last().map_or(0, WaveAttender::wave_reward);
        let early_bonus = self.early_bonus(ctx);
        ctx.score.set_wave_bonus(wave_bonus);
        ctx.score.set_early_bonus(early_bonus);
    }

    fn update_remaining_enemies_count(&mut self) {
        let count = self
            .active_waves
            .iter()
            .map(WaveAttender::remaining_enemies_count)
            .sum();
        self.remaining_enemies_count.set(count);
    }
}
