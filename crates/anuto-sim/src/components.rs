//! Components that hold engine handles and so cannot live in the core crate.

use hecs::Entity;

use anuto_core::constants::ROCKET_LOAD_TIME;
use anuto_core::types::TickTimer;

/// Weak reference to the entity being aimed at. Never keeps it alive;
/// validity is checked against the registry every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target(pub Option<Entity>);

impl Target {
    pub fn get(&self) -> Option<Entity> {
        self.0
    }

    pub fn set(&mut self, target: Option<Entity>) {
        self.0 = target;
    }
}

/// Tower that launched a projectile or caused an explosion. Used to
/// attribute inflicted damage; the tower may already be gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin(pub Entity);

/// Rocket launcher magazine: loads one rocket at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketRack {
    pub load_timer: TickTimer,
    /// Loaded rocket waiting for launch.
    pub loaded: Option<Entity>,
}

impl RocketRack {
    pub fn new() -> Self {
        Self {
            load_timer: TickTimer::create_interval(ROCKET_LOAD_TIME),
            loaded: None,
        }
    }
}

impl Default for RocketRack {
    fn default() -> Self {
        Self::new()
    }
}
