//! Entity spawn factories.
//!
//! Build the component bundle for each entity kind and hand it to the
//! registry. The entity joins the tick sweep once the engine commits it;
//! per-type static data is attached by the kind's `init` handler.

use glam::Vec2;
use hecs::{Entity, EntityBuilder};

use anuto_core::components::*;
use anuto_core::constants::*;
use anuto_core::enums::{EntityKind, ProjectileKind, WeaponKind};
use anuto_core::settings::{EnemyConfig, PathDescriptor, TowerConfig};
use anuto_core::types::{Position, TickTimer, WaveId};

use crate::components::{Origin, RocketRack, Target};
use crate::registry::Registry;

/// Wave-specific parameters of one enemy about to enter the map.
#[derive(Debug, Clone)]
pub struct EnemySpawn<'a> {
    pub config: &'a EnemyConfig,
    pub wave: WaveId,
    pub health_modifier: f32,
    pub reward_modifier: f32,
    pub path_index: usize,
    /// Distance behind the first waypoint.
    pub offset: f32,
}

/// Spawn an enemy at the start of its path, already scaled by its wave's modifiers.
pub fn spawn_enemy(registry: &mut Registry, path: &PathDescriptor, spawn: EnemySpawn) -> Entity {
    let start = path.waypoints.first().copied().unwrap_or(Vec2::ZERO);
    let heading = path
        .waypoints
        .get(1)
        .map(|next| (*next - start).normalize_or_zero())
        .unwrap_or(Vec2::ZERO);

    let mut builder = EntityBuilder::new();
    builder
        .add(Position(start - heading * spawn.offset))
        .add(Health::new(spawn.config.health * spawn.health_modifier))
        .add(Enemy {
            name: spawn.config.name.clone(),
            speed: spawn.config.speed,
            speed_modifier: 1.0,
            reward: spawn.config.reward * spawn.reward_modifier,
            wave: spawn.wave,
            weak_against: spawn.config.weak_against.clone(),
            strong_against: spawn.config.strong_against.clone(),
        })
        .add(PathFollower {
            path: spawn.path_index,
            next_waypoint: 1,
        });
    registry.spawn(EntityKind::Enemy, builder)
}

pub fn spawn_tower(registry: &mut Registry, config: &TowerConfig, position: Vec2) -> Entity {
    let mut builder = EntityBuilder::new();
    builder
        .add(Position(position))
        .add(Tower {
            name: config.name.clone(),
            weapon: config.weapon,
            value: config.value,
            damage: config.damage,
            range: config.range,
            shot_speed: config.shot_speed,
            explosion_radius: config.explosion_radius,
            angle: 0.0,
            damage_inflicted: 0.0,
        })
        .add(Reload::new(config.reload))
        .add(Target::default());
    if config.weapon == WeaponKind::Rocket {
        builder.add(RocketRack::new());
    }
    registry.spawn(EntityKind::Tower, builder)
}

/// Fire a straight shot from `from` towards `target_pos`.
pub fn spawn_shot(
    registry: &mut Registry,
    origin: Entity,
    tower: &Tower,
    from: &Position,
    target_pos: &Position,
) -> Entity {
    let direction = from.direction_to(target_pos);

    let mut builder = EntityBuilder::new();
    builder
        .add(Position(from.0 + direction * SHOT_SPAWN_OFFSET))
        .add(Projectile {
            kind: ProjectileKind::Shot,
            damage: tower.damage,
            speed: tower.shot_speed,
            direction,
            traveled: 0.0,
            max_travel: tower.range * SHOT_RANGE_FACTOR,
            explosion_radius: 0.0,
            launched: true,
        })
        .add(Origin(origin));
    registry.spawn(EntityKind::Projectile, builder)
}

/// Load a rocket onto the launcher `origin`. It stays in place until
/// `projectile::launch` gives it a target.
pub fn spawn_rocket(registry: &mut Registry, origin: Entity, tower: &Tower, at: &Position) -> Entity {
    let angle = tower.angle.to_radians();

    let mut builder = EntityBuilder::new();
    builder
        .add(*at)
        .add(Projectile {
            kind: ProjectileKind::Rocket,
            damage: tower.damage,
            speed: tower.shot_speed,
            direction: Vec2::new(angle.cos(), angle.sin()),
            traveled: 0.0,
            max_travel: f32::INFINITY,
            explosion_radius: tower.explosion_radius,
            launched: false,
        })
        .add(Target::default())
        .add(Origin(origin));
    registry.spawn(EntityKind::Projectile, builder)
}

/// Explosion of a rocket at `position`.
pub fn spawn_explosion(
    registry: &mut Registry,
    origin: Option<Entity>,
    position: Position,
    damage: f32,
    radius: f32,
) -> Entity {
    let mut builder = EntityBuilder::new();
    builder.add(position).add(Explosion {
        weapon: WeaponKind::Rocket,
        damage,
        radius,
        lifetime: TickTimer::create_interval(EXPLOSION_LIFETIME),
    });
    if let Some(origin) = origin {
        builder.add(Origin(origin));
    }
    registry.spawn(EntityKind::Effect, builder)
}
