//! Game settings, enemy/tower configs and wave descriptors.
//!
//! `GameConfig` is the settings provider consumed by the engine. It is
//! loaded once per session (JSON via serde) and must pass `validate` before
//! a session starts; afterwards the engine treats it as immutable.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AGE_MODIFIER, DEFAULT_ANIMATION_FRAMES, DEFAULT_ANIMATION_FREQUENCY,
    DEFAULT_MIN_SPEED_MODIFIER, DEFAULT_STRONG_AGAINST_MODIFIER, DEFAULT_WEAK_AGAINST_MODIFIER,
};
use crate::enums::WeaponKind;
use crate::error::ConfigError;

/// Economy and difficulty parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Starting credits.
    pub credits: u32,
    /// Starting lives.
    pub lives: u32,
    pub difficulty_linear: f32,
    pub difficulty_modifier: f32,
    pub difficulty_exponent: f32,
    pub min_health_modifier: f32,
    pub reward_modifier: f32,
    pub reward_exponent: f32,
    pub min_reward_modifier: f32,
    pub early_modifier: f32,
    pub early_exponent: f32,
    /// Factor applied to every tower's value when a wave finishes.
    #[serde(default = "default_age_modifier")]
    pub age_modifier: f32,
    /// Lower bound of an enemy's speed modifier when it is slowed down.
    #[serde(default = "default_min_speed_modifier")]
    pub min_speed_modifier: f32,
    /// Damage factor against enemies weak against the attacking weapon.
    #[serde(default = "default_weak_against_modifier")]
    pub weak_against_modifier: f32,
    /// Damage factor against enemies strong against the attacking weapon.
    #[serde(default = "default_strong_against_modifier")]
    pub strong_against_modifier: f32,
}

fn default_age_modifier() -> f32 {
    DEFAULT_AGE_MODIFIER
}

fn default_min_speed_modifier() -> f32 {
    DEFAULT_MIN_SPEED_MODIFIER
}

fn default_weak_against_modifier() -> f32 {
    DEFAULT_WEAK_AGAINST_MODIFIER
}

fn default_strong_against_modifier() -> f32 {
    DEFAULT_STRONG_AGAINST_MODIFIER
}

/// Sprite template parameters shared by all instances of a type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub frames: u32,
    /// Full sequence cycles per second.
    pub frequency: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_ANIMATION_FRAMES,
            frequency: DEFAULT_ANIMATION_FREQUENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub name: String,
    /// Base health before the wave health modifier.
    pub health: f32,
    /// Tiles per second.
    pub speed: f32,
    /// Base reward before the wave reward modifier.
    pub reward: f32,
    /// Weapons dealing extra damage to this enemy.
    #[serde(default)]
    pub weak_against: Vec<WeaponKind>,
    /// Weapons dealing reduced damage to this enemy.
    #[serde(default)]
    pub strong_against: Vec<WeaponKind>,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    pub name: String,
    #[serde(default)]
    pub weapon: WeaponKind,
    /// Purchase price and initial sell value.
    pub value: u32,
    pub damage: f32,
    pub range: f32,
    /// Seconds between shots.
    pub reload: f32,
    /// Projectile speed in tiles per second.
    pub shot_speed: f32,
    #[serde(default)]
    pub explosion_radius: f32,
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// One enemy entry of a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    pub name: String,
    /// Seconds after the previous entry of the wave.
    #[serde(default)]
    pub delay: f32,
    /// Distance behind the path start at which the enemy appears.
    #[serde(default)]
    pub offset: f32,
    #[serde(default)]
    pub path_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDescriptor {
    pub enemies: Vec<EnemyDescriptor>,
    /// Extra repetitions of the enemy list per completed iteration.
    #[serde(default)]
    pub extend: u32,
    #[serde(default)]
    pub max_extend: u32,
    /// Credits granted when the wave is over (or skipped early).
    #[serde(default)]
    pub wave_reward: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub waypoints: Vec<Vec2>,
}

/// Everything a session needs from the data loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub settings: GameSettings,
    pub enemies: Vec<EnemyConfig>,
    #[serde(default)]
    pub towers: Vec<TowerConfig>,
    pub waves: Vec<WaveDescriptor>,
    pub paths: Vec<PathDescriptor>,
}

impl GameConfig {
    /// Parse and validate a JSON settings document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn game_settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn enemy_config(&self, name: &str) -> Option<&EnemyConfig> {
        self.enemies.iter().find(|e| e.name == name)
    }

    pub fn tower_config(&self, name: &str) -> Option<&TowerConfig> {
        self.towers.iter().find(|t| t.name == name)
    }

    pub fn waves(&self) -> &[WaveDescriptor] {
        &self.waves
    }

    pub fn path(&self, index: usize) -> Option<&PathDescriptor> {
        self.paths.get(index)
    }

    /// Check every cross reference the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.settings;
        for (name, value) in [
            ("difficulty_linear", s.difficulty_linear),
            ("difficulty_modifier", s.difficulty_modifier),
            ("difficulty_exponent", s.difficulty_exponent),
            ("min_health_modifier", s.min_health_modifier),
            ("reward_modifier", s.reward_modifier),
            ("reward_exponent", s.reward_exponent),
            ("min_reward_modifier", s.min_reward_modifier),
            ("early_modifier", s.early_modifier),
            ("early_exponent", s.early_exponent),
            ("age_modifier", s.age_modifier),
            ("min_speed_modifier", s.min_speed_modifier),
            ("weak_against_modifier", s.weak_against_modifier),
            ("strong_against_modifier", s.strong_against_modifier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(name, "must be a finite, non-negative number"));
            }
        }

        let mut names = HashSet::new();
        for enemy in &self.enemies {
            if !names.insert(enemy.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    what: "enemy",
                    name: enemy.name.clone(),
                });
            }
            if !is_positive(enemy.health) {
                return Err(ConfigError::invalid(
                    format!("{}.health", enemy.name),
                    "must be positive",
                ));
            }
            if !enemy.speed.is_finite() || enemy.speed < 0.0 {
                return Err(ConfigError::invalid(
                    format!("{}.speed", enemy.name),
                    "must be a finite, non-negative number",
                ));
            }
        }

        let mut names = HashSet::new();
        for tower in &self.towers {
            if !names.insert(tower.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    what: "tower",
                    name: tower.name.clone(),
                });
            }
            if !is_positive(tower.range) || !is_positive(tower.reload) || !is_positive(tower.shot_speed) {
                return Err(ConfigError::invalid(
                    tower.name.clone(),
                    "range, reload and shot_speed must be positive",
                ));
            }
        }

        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        if let Some(index) = self.paths.iter().position(|p| p.waypoints.len() < 2) {
            return Err(ConfigError::ShortPath { index });
        }

        if self.waves.is_empty() {
            return Err(ConfigError::EmptyWaves);
        }
        for (wave, descriptor) in self.waves.iter().enumerate() {
            if descriptor.enemies.is_empty() {
                return Err(ConfigError::EmptyWave { wave });
            }
            for enemy in &descriptor.enemies {
                if self.enemy_config(&enemy.name).is_none() {
                    return Err(ConfigError::UnknownEnemy {
                        wave,
                        name: enemy.name.clone(),
                    });
                }
                if enemy.path_index >= self.paths.len() {
                    return Err(ConfigError::BadPathIndex {
                        wave,
                        name: enemy.name.clone(),
                        path: enemy.path_index,
                        available: self.paths.len(),
                    });
                }
                if !enemy.delay.is_finite() || enemy.delay < 0.0 {
                    return Err(ConfigError::invalid(
                        format!("waves[{wave}].{}.delay", enemy.name),
                        "must be a finite, non-negative number",
                    ));
                }
            }
        }

        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for GameConfig {
    /// Built-in single-path map with three enemy types, two towers and four waves.
    fn default() -> Self {
        let enemy = |name: &str, health, speed, reward, frames| EnemyConfig {
            name: name.into(),
            health,
            speed,
            reward,
            weak_against: Vec::new(),
            strong_against: Vec::new(),
            animation: AnimationConfig {
                frames,
                frequency: 1.5,
            },
        };
        let entry = |name: &str, delay| EnemyDescriptor {
            name: name.into(),
            delay,
            offset: 0.0,
            path_index: 0,
        };

        Self {
            settings: GameSettings {
                credits: 500,
                lives: 20,
                difficulty_linear: 2.0,
                difficulty_modifier: 8.0,
                difficulty_exponent: 0.5,
                min_health_modifier: 0.5,
                reward_modifier: 0.4,
                reward_exponent: 0.5,
                min_reward_modifier: 0.5,
                early_modifier: 1.0,
                early_exponent: 0.5,
                age_modifier: DEFAULT_AGE_MODIFIER,
                min_speed_modifier: DEFAULT_MIN_SPEED_MODIFIER,
                weak_against_modifier: DEFAULT_WEAK_AGAINST_MODIFIER,
                strong_against_modifier: DEFAULT_STRONG_AGAINST_MODIFIER,
            },
            enemies: vec![
                enemy("soldier", 300.0, 1.0, 10.0, 12),
                EnemyConfig {
                    weak_against: vec![WeaponKind::Rocket],
                    ..enemy("blob", 600.0, 0.5, 15.0, 9)
                },
                EnemyConfig {
                    strong_against: vec![WeaponKind::Canon],
                    ..enemy("sprinter", 200.0, 2.0, 12.0, 6)
                },
            ],
            towers: vec![
                TowerConfig {
                    name: "canon".into(),
                    weapon: WeaponKind::Canon,
                    value: 200,
                    damage: 120.0,
                    range: 3.5,
                    reload: 0.8,
                    shot_speed: 6.0,
                    explosion_radius: 0.0,
                    animation: AnimationConfig {
                        frames: 5,
                        frequency: 2.0,
                    },
                },
                TowerConfig {
                    name: "rocket_launcher".into(),
                    weapon: WeaponKind::Rocket,
                    value: 800,
                    damage: 500.0,
                    range: 5.0,
                    reload: 2.5,
                    shot_speed: 2.5,
                    explosion_radius: 1.2,
                    animation: AnimationConfig::default(),
                },
            ],
            waves: vec![
                WaveDescriptor {
                    enemies: vec![
                        entry("soldier", 0.0),
                        entry("soldier", 1.0),
                        entry("soldier", 1.0),
                    ],
                    extend: 1,
                    max_extend: 4,
                    wave_reward: 50,
                },
                WaveDescriptor {
                    enemies: vec![
                        entry("blob", 0.0),
                        entry("soldier", 0.5),
                        entry("blob", 1.5),
                    ],
                    extend: 1,
                    max_extend: 4,
                    wave_reward: 60,
                },
                WaveDescriptor {
                    enemies: vec![
                        entry("sprinter", 0.0),
                        entry("sprinter", 0.5),
                        entry("sprinter", 0.5),
                        entry("sprinter", 0.5),
                    ],
                    extend: 2,
                    max_extend: 6,
                    wave_reward: 70,
                },
                WaveDescriptor {
                    enemies: vec![
                        entry("blob", 0.0),
                        entry("sprinter", 1.0),
                        entry("soldier", 0.5),
                        entry("blob", 1.0),
                    ],
                    extend: 1,
                    max_extend: 5,
                    wave_reward: 100,
                },
            ],
            paths: vec![PathDescriptor {
                waypoints: vec![
                    Vec2::new(-1.0, 2.0),
                    Vec2::new(6.0, 2.0),
                    Vec2::new(6.0, 8.0),
                    Vec2::new(12.0, 8.0),
                ],
            }],
        }
    }
}
