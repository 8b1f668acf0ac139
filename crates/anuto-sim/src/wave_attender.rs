//! One running wave: releases its enemies on schedule and tracks what is
//! left of them.
//!
//! The enemy list of the descriptor is repeated `extend + 1` times. Each
//! entry is due at the wave's start tick plus the running sum of entry
//! delays. Health and reward modifiers are fixed before `start` and hold
//! for the whole wave.

use std::collections::VecDeque;

use hecs::Entity;

use anuto_core::error::ConfigError;
use anuto_core::score::ScoreBoard;
use anuto_core::settings::{GameConfig, WaveDescriptor};
use anuto_core::types::{secs_to_ticks, WaveId};

use crate::systems::TickContext;
use crate::world_setup::{self, EnemySpawn};

#[derive(Debug, Clone, PartialEq)]
struct ScheduledEnemy {
    name: String,
    due_tick: u64,
    path_index: usize,
    offset: f32,
    /// Reward with the wave modifier applied.
    reward: f32,
}

#[derive(Debug)]
pub struct WaveAttender {
    id: WaveId,
    /// 1-based number of this wave within the session.
    wave_number: u32,
    descriptor_index: usize,
    descriptor: WaveDescriptor,
    extend: u32,
    health_modifier: f32,
    reward_modifier: f32,
    wave_reward: u32,
    schedule: VecDeque<ScheduledEnemy>,
    /// Spawned enemies still in play, with their reward.
    alive: Vec<(Entity, f32)>,
    finished: bool,
}

impl WaveAttender {
    pub fn new(id: WaveId, wave_number: u32, descriptor_index: usize, descriptor: WaveDescriptor) -> Self {
        let wave_reward = descriptor.wave_reward;
        Self {
            id,
            wave_number,
            descriptor_index,
            descriptor,
            extend: 0,
            health_modifier: 1.0,
            reward_modifier: 1.0,
            wave_reward,
            schedule: VecDeque::new(),
            alive: Vec::new(),
            finished: false,
        }
    }

    pub fn id(&self) -> WaveId {
        self.id
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    pub fn extend(&self) -> u32 {
        self.extend
    }

    pub fn set_extend(&mut self, extend: u32) {
        self.extend = extend;
    }

    pub fn enemy_health_modifier(&self) -> f32 {
        self.health_modifier
    }

    pub fn enemy_reward_modifier(&self) -> f32 {
        self.reward_modifier
    }

    pub fn modify_enemy_health(&mut self, modifier: f32) {
        self.health_modifier *= modifier;
    }

    pub fn modify_enemy_reward(&mut self, modifier: f32) {
        self.reward_modifier *= modifier;
    }

    pub fn modify_wave_reward(&mut self, modifier: u32) {
        self.wave_reward = self.wave_reward.saturating_mul(modifier);
    }

    pub fn wave_reward(&self) -> u32 {
        self.wave_reward
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Enemies not yet spawned plus enemies alive.
    pub fn remaining_enemies_count(&self) -> u32 {
        (self.schedule.len() + self.alive.len()) as u32
    }

    pub fn remaining_enemies_reward(&self) -> f32 {
        self.schedule.iter().map(|e| e.reward).sum::<f32>()
            + self.alive.iter().map(|(_, reward)| reward).sum::<f32>()
    }

    /// Build the spawn schedule starting at tick `now`.
    pub fn start(&mut self, now: u64, config: &GameConfig) -> Result<(), ConfigError> {
        let mut offset_secs = 0.0;
        self.schedule.clear();
        for _ in 0..=self.extend {
            for entry in &self.descriptor.enemies {
                let enemy = config
                    .enemy_config(&entry.name)
                    .ok_or_else(|| ConfigError::UnknownEnemy {
                        wave: self.descriptor_index,
                        name: entry.name.clone(),
                    })?;
                offset_secs += entry.delay;
                self.schedule.push_back(ScheduledEnemy {
                    name: entry.name.clone(),
                    due_tick: now + secs_to_ticks(offset_secs),
                    path_index: entry.path_index,
                    offset: entry.offset,
                    reward: enemy.reward * self.reward_modifier,
                });
            }
        }
        Ok(())
    }

    /// Spawn every enemy that is due.
    pub fn tick(&mut self, ctx: &mut TickContext) {
        while self
            .schedule
            .front()
            .is_some_and(|next| next.due_tick <= ctx.tick)
        {
            let Some(next) = self.schedule.pop_front() else {
                break;
            };
            let (Some(config), Some(path)) = (
                ctx.config.enemy_config(&next.name),
                ctx.config.path(next.path_index),
            ) else {
                continue;
            };
            let entity = world_setup::spawn_enemy(
                ctx.registry,
                path,
                EnemySpawn {
                    config,
                    wave: self.id,
                    health_modifier: self.health_modifier,
                    reward_modifier: self.reward_modifier,
                    path_index: next.path_index,
                    offset: next.offset,
                },
            );
            self.alive.push((entity, next.reward));
        }
    }

    /// Forget a removed enemy. Returns true exactly once: when the last
    /// enemy of a fully spawned wave is gone.
    pub fn enemy_removed(&mut self, entity: Entity) -> bool {
        self.alive.retain(|(e, _)| *e != entity);
        if self.finished || !self.schedule.is_empty() || !self.alive.is_empty() {
            return false;
        }
        self.finished = true;
        true
    }

    /// Credit the wave reward as earned and zero it. Returns the amount paid.
    pub fn give_wave_reward(&mut self, score: &mut ScoreBoard) -> u32 {
        let reward = std::mem::take(&mut self.wave_reward);
        score.give_credits(reward, true);
        reward
    }
}
