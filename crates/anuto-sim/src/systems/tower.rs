//! Tower targeting, reload and firing.
//!
//! A tower holds at most one weak target handle. A held target that was
//! removed, is being removed or walked out of range is dropped, and the
//! tower holds fire for that tick. A tower without a target picks the
//! nearest enemy in range. Firing needs both a target and a completed
//! reload. Rocket launchers also need a loaded rocket: one is loaded on
//! its own timer whenever the rack is empty.

use hecs::Entity;
use rand::Rng;

use anuto_core::components::{Reload, Tower};
use anuto_core::constants::DT;
use anuto_core::enums::{EntityKind, WeaponKind};
use anuto_core::events::GameEvent;
use anuto_core::types::Position;

use super::{projectile, TickContext};
use crate::components::{RocketRack, Target};
use crate::registry::Registry;
use crate::static_data::{tower_key, Animation, SpriteTemplate};
use crate::world_setup;

/// Number of sprite variants a tower picks from when built.
const SPRITE_VARIANTS: u32 = 4;

pub fn init(ctx: &mut TickContext, entity: Entity) {
    let Some(name) = ctx
        .registry
        .world()
        .get::<&Tower>(entity)
        .ok()
        .map(|tower| tower.name.clone())
    else {
        return;
    };
    let animation = ctx
        .config
        .tower_config(&name)
        .map(|config| config.animation)
        .unwrap_or_default();
    let template = ctx
        .static_data
        .get_or_build(&tower_key(&name), || SpriteTemplate::from(animation));
    let variant = ctx.rng.gen_range(0..SPRITE_VARIANTS);
    let _ = ctx
        .registry
        .world_mut()
        .insert_one(entity, Animation::new(template, variant));
}

/// Outcome of one targeting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aim {
    /// Keep (or newly hold) this target; firing is allowed.
    Hold(Entity),
    /// The held target became invalid and was dropped.
    Lost,
    Idle,
}

/// Validate the held target or acquire a new one.
pub fn aim(registry: &Registry, from: &Position, range: f32, held: Option<Entity>) -> Aim {
    match held {
        Some(target) => {
            let in_range = registry
                .position(target)
                .is_some_and(|pos| from.distance_to(&pos) <= range);
            if registry.is_alive(target) && in_range {
                Aim::Hold(target)
            } else {
                Aim::Lost
            }
        }
        None => registry
            .nearest(EntityKind::Enemy, from, Some(range))
            .map_or(Aim::Idle, Aim::Hold),
    }
}

pub fn tick(ctx: &mut TickContext, entity: Entity) {
    let (from, range, held) = {
        let world = ctx.registry.world();
        let Ok(mut query) = world.query_one::<(&Position, &Tower, &Target)>(entity) else {
            return;
        };
        let Some((pos, tower, target)) = query.get() else {
            return;
        };
        (*pos, tower.range, target.get())
    };

    let aim = aim(ctx.registry, &from, range, held);
    let target = match aim {
        Aim::Hold(target) => Some(target),
        Aim::Lost | Aim::Idle => None,
    };
    let target_pos = target.and_then(|t| ctx.registry.position(t));

    let fire = {
        let world = ctx.registry.world_mut();
        let Ok(mut query) = world.query_one::<(
            &mut Tower,
            &mut Reload,
            &mut Target,
            Option<&mut Animation>,
        )>(entity) else {
            return;
        };
        let Some((tower, reload, held, animation)) = query.get() else {
            return;
        };
        held.set(target);
        if let Some(animation) = animation {
            animation.tick(DT);
        }
        if let Some(target_pos) = &target_pos {
            tower.angle = from.angle_to(target_pos);
        }
        if !reload.reloaded && reload.timer.tick() {
            reload.reloaded = true;
        }
        (reload.reloaded && target.is_some()).then(|| tower.clone())
    };

    if tower_weapon(ctx, entity) == Some(WeaponKind::Rocket) {
        load_rocket(ctx, entity, &from);
    }

    let fired = match (fire, target, target_pos) {
        (Some(tower), Some(target), Some(target_pos)) => match tower.weapon {
            WeaponKind::Canon => {
                world_setup::spawn_shot(ctx.registry, entity, &tower, &from, &target_pos);
                true
            }
            WeaponKind::Rocket => launch_loaded_rocket(ctx, entity, target),
        },
        _ => false,
    };

    if fired {
        if let Ok(mut reload) = ctx.registry.world_mut().get::<&mut Reload>(entity) {
            reload.reloaded = false;
        }
        let entity_id = ctx.registry.entity_id(entity).map_or(0, |id| id.0);
        ctx.events.push(GameEvent::TowerFired { entity_id });
    }
}

/// The launcher's loaded rocket, if it is still in play.
fn loaded_rocket(ctx: &TickContext, launcher: Entity) -> Option<Entity> {
    let rack = ctx.registry.world().get::<&RocketRack>(launcher).ok().map(|r| *r)?;
    rack.loaded.filter(|rocket| ctx.registry.is_alive(*rocket))
}

fn launch_loaded_rocket(ctx: &mut TickContext, launcher: Entity, target: Entity) -> bool {
    let Some(rocket) = loaded_rocket(ctx, launcher) else {
        return false;
    };
    if !projectile::launch(ctx.registry, rocket, target) {
        return false;
    }
    if let Ok(mut rack) = ctx.registry.world_mut().get::<&mut RocketRack>(launcher) {
        rack.loaded = None;
    }
    true
}

/// Run the load timer while the rack is empty; load a rocket when it fires.
fn load_rocket(ctx: &mut TickContext, launcher: Entity, at: &Position) {
    if loaded_rocket(ctx, launcher).is_some() {
        return;
    }
    let due = ctx
        .registry
        .world_mut()
        .get::<&mut RocketRack>(launcher)
        .map(|mut rack| {
            rack.loaded = None;
            rack.load_timer.tick()
        })
        .unwrap_or(false);
    if !due {
        return;
    }
    let Some(tower) = ctx.registry.world().get::<&Tower>(launcher).ok().map(|t| (*t).clone()) else {
        return;
    };
    let rocket = world_setup::spawn_rocket(ctx.registry, launcher, &tower, at);
    if let Ok(mut rack) = ctx.registry.world_mut().get::<&mut RocketRack>(launcher) {
        rack.loaded = Some(rocket);
    }
}

fn tower_weapon(ctx: &TickContext, entity: Entity) -> Option<WeaponKind> {
    ctx.registry.world().get::<&Tower>(entity).ok().map(|t| t.weapon)
}

/// A sold or removed launcher takes its loaded rocket with it.
pub fn clean(ctx: &mut TickContext, entity: Entity) {
    if let Some(rocket) = loaded_rocket(ctx, entity) {
        ctx.registry.remove(rocket);
    }
}

/// Depreciate every tower's sell value.
pub fn age_towers(registry: &mut Registry, age_modifier: f32) {
    for (_entity, tower) in registry.world_mut().query_mut::<&mut Tower>() {
        tower.value = (tower.value as f32 * age_modifier) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anuto_core::components::Enemy;
    use anuto_core::types::WaveId;
    use hecs::EntityBuilder;

    fn enemy_at(registry: &mut Registry, x: f32, y: f32) -> Entity {
        let mut builder = EntityBuilder::new();
        builder.add(Position::new(x, y)).add(Enemy {
            name: "soldier".into(),
            speed: 1.0,
            speed_modifier: 1.0,
            reward: 10.0,
            wave: WaveId(0),
            weak_against: vec![],
            strong_against: vec![],
        });
        registry.spawn(EntityKind::Enemy, builder)
    }

    #[test]
    fn test_acquires_nearest_in_range() {
        let mut registry = Registry::new();
        let far = enemy_at(&mut registry, 3.0, 0.0);
        let near = enemy_at(&mut registry, 1.0, 0.0);
        let _outside = enemy_at(&mut registry, 0.5, 9.0);
        registry.commit_adds();

        let aim = aim(&registry, &Position::new(0.0, 0.0), 3.5, None);
        assert_eq!(aim, Aim::Hold(near));
        assert_ne!(aim, Aim::Hold(far));
    }

    #[test]
    fn test_equal_distance_prefers_registration_order() {
        let mut registry = Registry::new();
        let first = enemy_at(&mut registry, 2.0, 0.0);
        let _second = enemy_at(&mut registry, -2.0, 0.0);
        registry.commit_adds();

        assert_eq!(
            aim(&registry, &Position::new(0.0, 0.0), 5.0, None),
            Aim::Hold(first)
        );
    }

    #[test]
    fn test_stale_target_dropped_not_replaced() {
        let mut registry = Registry::new();
        let doomed = enemy_at(&mut registry, 1.0, 0.0);
        let _other = enemy_at(&mut registry, 2.0, 0.0);
        registry.commit_adds();

        let from = Position::new(0.0, 0.0);
        assert_eq!(aim(&registry, &from, 5.0, Some(doomed)), Aim::Hold(doomed));

        // pending removal counts as gone
        registry.remove(doomed);
        assert_eq!(aim(&registry, &from, 5.0, Some(doomed)), Aim::Lost);

        // fully despawned handles stay invalid
        for entity in registry.take_removals() {
            registry.despawn(entity);
        }
        assert_eq!(aim(&registry, &from, 5.0, Some(doomed)), Aim::Lost);
    }

    #[test]
    fn test_target_out_of_range_is_lost() {
        let mut registry = Registry::new();
        let enemy = enemy_at(&mut registry, 4.0, 0.0);
        registry.commit_adds();
        assert_eq!(
            aim(&registry, &Position::new(0.0, 0.0), 3.0, Some(enemy)),
            Aim::Lost
        );
    }

    #[test]
    fn test_age_towers_truncates_value() {
        let mut registry = Registry::new();
        let config = anuto_core::settings::GameConfig::default();
        let canon = config.tower_config("canon").unwrap();
        let tower = world_setup::spawn_tower(&mut registry, canon, glam::Vec2::ZERO);
        age_towers(&mut registry, 0.97);
        let value = registry.world().get::<&Tower>(tower).unwrap().value;
        assert_eq!(value, 194);
    }
}
