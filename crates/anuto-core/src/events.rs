//! Events emitted by the simulation for UI feedback.

use serde::{Deserialize, Serialize};

/// Things that happened during one tick, in order of occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    WaveStarted {
        wave_number: u32,
        extend: u32,
        health_modifier: f32,
        reward_modifier: f32,
    },
    WaveFinished { wave_number: u32 },
    /// Wave reward and early bonus credited when a wave was called early.
    EarlyBonus { wave_reward: u32, bonus: u32 },
    EnemyKilled { entity_id: u32, reward: u32 },
    /// An enemy reached the end of its path.
    EnemyEscaped { entity_id: u32 },
    TowerBuilt { entity_id: u32, tower: String },
    TowerSold { entity_id: u32, value: u32 },
    TowerFired { entity_id: u32 },
    GameOver,
    GameRestarted,
}
