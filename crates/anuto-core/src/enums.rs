//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Capability class of an entity; decides which lifecycle handlers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy,
    Tower,
    Projectile,
    Effect,
}

/// What a tower launches when it fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Straight shot along the direction to the target.
    #[default]
    Canon,
    /// Homing rocket that explodes on arrival.
    Rocket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Shot,
    Rocket,
}

impl ProjectileKind {
    /// Weapon that fires this kind of projectile.
    pub fn weapon(self) -> WeaponKind {
        match self {
            ProjectileKind::Shot => WeaponKind::Canon,
            ProjectileKind::Rocket => WeaponKind::Rocket,
        }
    }
}

impl From<WeaponKind> for ProjectileKind {
    fn from(weapon: WeaponKind) -> Self {
        match weapon {
            WeaponKind::Canon => ProjectileKind::Shot,
            WeaponKind::Rocket => ProjectileKind::Rocket,
        }
    }
}
