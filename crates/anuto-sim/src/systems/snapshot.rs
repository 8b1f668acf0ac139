//! Snapshot system: reads the registry and builds the draw-interface view.
//!
//! This system is read-only. Views are emitted in registration order so
//! identical sessions serialize identically.

use anuto_core::components::{Enemy, Explosion, Health, Projectile, Tower};
use anuto_core::enums::EntityKind;
use anuto_core::events::GameEvent;
use anuto_core::game_state::GameState;
use anuto_core::score::ScoreBoard;
use anuto_core::state::*;
use anuto_core::types::{Position, SimTime};

use crate::components::Target;
use crate::registry::Registry;
use crate::static_data::Animation;
use crate::wave_manager::WaveManager;

pub struct SnapshotInput<'a> {
    pub registry: &'a Registry,
    pub score: &'a ScoreBoard,
    pub game_state: &'a GameState,
    pub waves: &'a WaveManager,
    pub time: SimTime,
    pub paused: bool,
}

pub fn build_snapshot(input: SnapshotInput, events: Vec<GameEvent>) -> GameStateSnapshot {
    let registry = input.registry;
    GameStateSnapshot {
        time: input.time,
        paused: input.paused,
        game_started: input.game_state.is_started(),
        game_over: input.game_state.is_over(),
        economy: EconomyView {
            credits: input.score.credits(),
            credits_earned: input.score.credits_earned(),
            lives: input.score.lives(),
            early_bonus: input.score.early_bonus(),
            wave_bonus: input.score.wave_bonus(),
        },
        waves: WaveView {
            wave_number: input.waves.wave_number(),
            next_wave_ready: input.waves.is_next_wave_ready(),
            remaining_enemies: input.waves.remaining_enemies_count(),
            active_waves: input.waves.active_wave_count() as u32,
        },
        enemies: build_enemies(registry),
        towers: build_towers(registry),
        projectiles: build_projectiles(registry),
        effects: build_effects(registry),
        events,
    }
}

fn entity_id(registry: &Registry, entity: hecs::Entity) -> u32 {
    registry.entity_id(entity).map_or(0, |id| id.0)
}

fn frame(registry: &Registry, entity: hecs::Entity) -> u32 {
    registry
        .world()
        .get::<&Animation>(entity)
        .map_or(0, |animation| animation.frame())
}

fn build_enemies(registry: &Registry) -> Vec<EnemyView> {
    registry
        .active(EntityKind::Enemy)
        .filter_map(|entity| {
            let world = registry.world();
            let mut query = world.query_one::<(&Position, &Health, &Enemy)>(entity).ok()?;
            let (pos, health, enemy) = query.get()?;
            Some(EnemyView {
                entity_id: entity_id(registry, entity),
                name: enemy.name.clone(),
                position: pos.0,
                health: health.current,
                max_health: health.max,
                frame: frame(registry, entity),
            })
        })
        .collect()
}

fn build_towers(registry: &Registry) -> Vec<TowerView> {
    registry
        .active(EntityKind::Tower)
        .filter_map(|entity| {
            let world = registry.world();
            let mut query = world.query_one::<(&Position, &Tower, &Target)>(entity).ok()?;
            let (pos, tower, target) = query.get()?;
            let variant = world
                .get::<&Animation>(entity)
                .map_or(0, |animation| animation.variant);
            Some(TowerView {
                entity_id: entity_id(registry, entity),
                name: tower.name.clone(),
                position: pos.0,
                angle: tower.angle,
                value: tower.value,
                target: target.get().and_then(|t| registry.entity_id(t)).map(|id| id.0),
                damage_inflicted: tower.damage_inflicted,
                variant,
                frame: frame(registry, entity),
            })
        })
        .collect()
}

fn build_projectiles(registry: &Registry) -> Vec<ProjectileView> {
    registry
        .active(EntityKind::Projectile)
        .filter_map(|entity| {
            let world = registry.world();
            let mut query = world.query_one::<(&Position, &Projectile)>(entity).ok()?;
            let (pos, projectile) = query.get()?;
            Some(ProjectileView {
                entity_id: entity_id(registry, entity),
                kind: projectile.kind,
                position: pos.0,
                angle: projectile.direction.y.atan2(projectile.direction.x).to_degrees(),
                launched: projectile.launched,
            })
        })
        .collect()
}

fn build_effects(registry: &Registry) -> Vec<EffectView> {
    registry
        .active(EntityKind::Effect)
        .filter_map(|entity| {
            let world = registry.world();
            let mut query = world.query_one::<(&Position, &Explosion)>(entity).ok()?;
            let (pos, explosion) = query.get()?;
            Some(EffectView {
                entity_id: entity_id(registry, entity),
                position: pos.0,
                radius: explosion.radius,
            })
        })
        .collect()
}
