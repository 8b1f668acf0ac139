//! Player commands sent from the UI thread to the simulation.
//!
//! Commands are queued as work items and processed at the next tick boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Call the next wave (ignored unless it is ready).
    StartNextWave,

    // --- Towers ---
    /// Buy a tower of the named type and place it.
    BuildTower { tower: String, position: Vec2 },
    /// Sell a tower for its current value.
    SellTower { entity_id: u32 },

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 2.0 = double). Clamped to
    /// `MIN_TIME_SCALE..=MAX_TIME_SCALE`, so 0.0 means the slowest speed
    /// rather than a stop; use `Pause` for that.
    SetTimeScale { scale: f64 },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Throw away the session and start over with the same settings.
    Restart,
}
