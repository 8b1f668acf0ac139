//! Game state snapshot (the complete visible state sent to observers each
//! tick) and the plain-value session state used by persistence.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::ProjectileKind;
use crate::events::GameEvent;
use crate::types::SimTime;

/// Complete game state published after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub game_started: bool,
    pub game_over: bool,
    pub economy: EconomyView,
    pub waves: WaveView,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
    pub effects: Vec<EffectView>,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomyView {
    pub credits: u32,
    pub credits_earned: u32,
    pub lives: u32,
    pub early_bonus: u32,
    pub wave_bonus: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveView {
    /// Index of the next wave to start (waves started so far).
    pub wave_number: u32,
    pub next_wave_ready: bool,
    pub remaining_enemies: u32,
    pub active_waves: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub entity_id: u32,
    pub name: String,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub frame: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerView {
    pub entity_id: u32,
    pub name: String,
    pub position: Vec2,
    pub angle: f32,
    pub value: u32,
    pub target: Option<u32>,
    pub damage_inflicted: f32,
    /// Sprite variant picked at build time.
    pub variant: u32,
    pub frame: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub entity_id: u32,
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub angle: f32,
    /// False for a rocket still loaded on its launcher.
    pub launched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    pub entity_id: u32,
    pub position: Vec2,
    pub radius: f32,
}

/// Session-resumable values. The file format belongs to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub tick_count: u64,
    pub next_entity_id: u32,
    pub wave_number: u32,
    pub credits: u32,
    pub credits_earned: u32,
    pub lives: u32,
}
