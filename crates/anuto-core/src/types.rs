//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::TICK_RATE;

/// Stable, session-unique entity id. Persisted and shown to observers;
/// the engine maps it to its own generation-checked handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Identifies one started wave instance within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveId(pub u32);

/// World position of an entity (tile units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        self.0.distance(other.0)
    }

    /// Unit vector pointing at `other`, or zero when both coincide.
    pub fn direction_to(&self, other: &Position) -> Vec2 {
        (other.0 - self.0).normalize_or_zero()
    }

    /// Angle to `other` in degrees, counter-clockwise from +x.
    pub fn angle_to(&self, other: &Position) -> f32 {
        let d = other.0 - self.0;
        d.y.atan2(d.x).to_degrees()
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each unpaused tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Resume at a persisted tick count.
    pub fn at_tick(tick: u64) -> Self {
        Self {
            tick,
            elapsed_secs: tick as f64 / TICK_RATE as f64,
        }
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 / TICK_RATE as f64;
    }
}

/// Number of ticks covering at least `secs` of simulated time.
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs.max(0.0) * TICK_RATE as f32).ceil() as u64
}

/// Repeating countdown measured in simulation ticks.
///
/// `tick` returns true once per interval, then starts over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickTimer {
    interval: u64,
    remaining: u64,
}

impl TickTimer {
    /// Timer firing every `secs` simulated seconds (at least every tick).
    pub fn create_interval(secs: f32) -> Self {
        let interval = secs_to_ticks(secs).max(1);
        Self {
            interval,
            remaining: interval,
        }
    }

    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.interval;
            true
        } else {
            false
        }
    }
}
