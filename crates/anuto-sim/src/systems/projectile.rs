//! Projectile flight: straight shots and homing rockets.
//!
//! A rocket is loaded onto its launcher first and only flies once
//! `launch` hands it a target.

use hecs::Entity;

use anuto_core::components::Projectile;
use anuto_core::constants::{DT, SHOT_HIT_RADIUS};
use anuto_core::enums::{EntityKind, ProjectileKind};
use anuto_core::types::Position;

use super::{enemy, TickContext};
use crate::components::{Origin, Target};
use crate::registry::Registry;
use crate::static_data::{Animation, SpriteTemplate, ROCKET_KEY, SHOT_KEY};
use crate::world_setup;

pub fn init(ctx: &mut TickContext, entity: Entity) {
    let Some(kind) = ctx
        .registry
        .world()
        .get::<&Projectile>(entity)
        .ok()
        .map(|p| p.kind)
    else {
        return;
    };
    let key = match kind {
        ProjectileKind::Shot => SHOT_KEY,
        ProjectileKind::Rocket => ROCKET_KEY,
    };
    let template = ctx.static_data.get_or_build(key, || SpriteTemplate {
        frames: 1,
        frequency: 0.0,
    });
    let _ = ctx
        .registry
        .world_mut()
        .insert_one(entity, Animation::new(template, 0));
}

/// Send a loaded rocket after `target`. Returns false if `rocket` is not a
/// loaded rocket.
pub fn launch(registry: &mut Registry, rocket: Entity, target: Entity) -> bool {
    let Some(target_pos) = registry.position(target) else {
        return false;
    };
    let world = registry.world_mut();
    let Ok(mut query) = world.query_one::<(&Position, &mut Projectile, &mut Target)>(rocket) else {
        return false;
    };
    let Some((pos, projectile, held)) = query.get() else {
        return false;
    };
    if projectile.kind != ProjectileKind::Rocket || projectile.launched {
        return false;
    }
    projectile.launched = true;
    projectile.direction = pos.direction_to(&target_pos);
    held.set(Some(target));
    true
}

pub fn tick(ctx: &mut TickContext, entity: Entity) {
    let Some(projectile) = ctx.registry.world().get::<&Projectile>(entity).ok().map(|p| *p) else {
        return;
    };
    if !projectile.launched {
        return;
    }
    let origin = ctx.registry.world().get::<&Origin>(entity).ok().map(|o| o.0);
    match projectile.kind {
        ProjectileKind::Shot => tick_shot(ctx, entity, projectile, origin),
        ProjectileKind::Rocket => tick_rocket(ctx, entity, projectile, origin),
    }
}

fn tick_shot(ctx: &mut TickContext, entity: Entity, projectile: Projectile, origin: Option<Entity>) {
    let step = projectile.speed * DT;
    let pos = {
        let world = ctx.registry.world_mut();
        let Ok(mut query) = world.query_one::<(&mut Position, &mut Projectile)>(entity) else {
            return;
        };
        let Some((pos, shot)) = query.get() else {
            return;
        };
        pos.0 += shot.direction * step;
        shot.traveled += step;
        *pos
    };

    if let Some(hit) = ctx
        .registry
        .nearest(EntityKind::Enemy, &pos, Some(SHOT_HIT_RADIUS))
    {
        enemy::damage(ctx, hit, projectile.damage, projectile.kind.weapon(), origin);
        ctx.registry.remove(entity);
    } else if projectile.traveled + step >= projectile.max_travel {
        ctx.registry.remove(entity);
    }
}

/// Rockets chase their target. A lost target is replaced by the nearest
/// enemy on the same tick; with no enemy left the rocket vanishes.
fn tick_rocket(ctx: &mut TickContext, entity: Entity, projectile: Projectile, origin: Option<Entity>) {
    let Some(pos) = ctx.registry.position(entity) else {
        return;
    };
    let held = ctx
        .registry
        .world()
        .get::<&Target>(entity)
        .ok()
        .and_then(|t| t.get());

    let target = match held.filter(|t| ctx.registry.is_alive(*t)) {
        Some(target) => target,
        None => match ctx.registry.nearest(EntityKind::Enemy, &pos, None) {
            Some(target) => target,
            None => {
                ctx.registry.remove(entity);
                return;
            }
        },
    };
    let Some(target_pos) = ctx.registry.position(target) else {
        return;
    };

    let step = projectile.speed * DT;
    let arrived = pos.distance_to(&target_pos) <= step;
    let new_pos = if arrived {
        target_pos
    } else {
        Position(pos.0 + pos.direction_to(&target_pos) * step)
    };

    {
        let world = ctx.registry.world_mut();
        if let Ok(mut query) = world.query_one::<(&mut Position, &mut Projectile, &mut Target)>(entity) {
            if let Some((p, rocket, held)) = query.get() {
                *p = new_pos;
                rocket.direction = pos.direction_to(&target_pos);
                rocket.traveled += step;
                held.set(Some(target));
            }
        }
    }

    if arrived {
        world_setup::spawn_explosion(
            ctx.registry,
            origin,
            target_pos,
            projectile.damage,
            projectile.explosion_radius,
        );
        ctx.registry.remove(entity);
    }
}
