//! ECS components for registry entities.
//!
//! Components are plain data structs with few methods.
//! Game logic lives in the engine's systems, not here. Components that hold
//! engine handles (targets, animation templates) live in the sim crate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{ProjectileKind, WeaponKind};
use crate::types::{TickTimer, WaveId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage; returns true if this hit was lethal.
    pub fn damage(&mut self, amount: f32) -> bool {
        let was_alive = self.current > 0.0;
        self.current -= amount;
        was_alive && self.current <= 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// An enemy spawned by a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    /// Base speed in tiles per second.
    pub speed: f32,
    /// Factor on `speed`; lowered by slowing effects.
    pub speed_modifier: f32,
    /// Credits granted on death, wave reward modifier already applied.
    pub reward: f32,
    pub wave: WaveId,
    pub weak_against: Vec<WeaponKind>,
    pub strong_against: Vec<WeaponKind>,
}

impl Enemy {
    /// Tiles per second after slowing effects.
    pub fn current_speed(&self) -> f32 {
        self.speed * self.speed_modifier
    }

    /// Scale the speed modifier by `factor`, never going below `min`.
    pub fn modify_speed(&mut self, factor: f32, min: f32) {
        self.speed_modifier = (self.speed_modifier * factor).max(min);
    }

    /// Damage factor for a hit by `weapon`.
    pub fn weapon_modifier(&self, weapon: WeaponKind, weak: f32, strong: f32) -> f32 {
        let mut modifier = 1.0;
        if self.weak_against.contains(&weapon) {
            modifier *= weak;
        }
        if self.strong_against.contains(&weapon) {
            modifier *= strong;
        }
        modifier
    }
}

/// Progress along a configured path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFollower {
    pub path: usize,
    /// Index of the waypoint currently walked towards.
    pub next_waypoint: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    pub name: String,
    pub weapon: WeaponKind,
    /// Current sell value; depreciates as waves finish.
    pub value: u32,
    pub damage: f32,
    pub range: f32,
    pub shot_speed: f32,
    pub explosion_radius: f32,
    /// Aim angle in degrees.
    pub angle: f32,
    /// Total damage dealt by this tower's projectiles and explosions.
    pub damage_inflicted: f32,
}

/// Fire cadence of a tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reload {
    pub timer: TickTimer,
    pub reloaded: bool,
}

impl Reload {
    pub fn new(secs: f32) -> Self {
        Self {
            timer: TickTimer::create_interval(secs),
            reloaded: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub damage: f32,
    /// Tiles per second.
    pub speed: f32,
    /// Unit direction of travel.
    pub direction: Vec2,
    pub traveled: f32,
    /// Straight shots expire after this distance.
    pub max_travel: f32,
    pub explosion_radius: f32,
    /// False while a rocket sits loaded on its launcher.
    pub launched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub weapon: WeaponKind,
    pub damage: f32,
    pub radius: f32,
    pub lifetime: TickTimer,
}
