//! Enemy lifecycle: path following, damage, death and escape.

use hecs::Entity;
use tracing::info;

use anuto_core::components::{Enemy, Health, PathFollower, Tower};
use anuto_core::constants::DT;
use anuto_core::enums::WeaponKind;
use anuto_core::events::GameEvent;
use anuto_core::types::Position;

use super::{Departure, TickContext};
use crate::static_data::{enemy_key, Animation, SpriteTemplate};

pub fn init(ctx: &mut TickContext, entity: Entity) {
    let Some(name) = ctx
        .registry
        .world()
        .get::<&Enemy>(entity)
        .ok()
        .map(|enemy| enemy.name.clone())
    else {
        return;
    };
    let animation = ctx
        .config
        .enemy_config(&name)
        .map(|config| config.animation)
        .unwrap_or_default();
    let template = ctx
        .static_data
        .get_or_build(&enemy_key(&name), || SpriteTemplate::from(animation));
    let _ = ctx
        .registry
        .world_mut()
        .insert_one(entity, Animation::new(template, 0));
}

pub fn tick(ctx: &mut TickContext, entity: Entity) {
    let escaped = {
        let world = ctx.registry.world_mut();
        let Ok(mut query) =
            world.query_one::<(&mut Position, &mut PathFollower, &Enemy, Option<&mut Animation>)>(entity)
        else {
            return;
        };
        let Some((pos, follower, enemy, animation)) = query.get() else {
            return;
        };
        if let Some(animation) = animation {
            animation.tick(DT);
        }
        let Some(path) = ctx.config.path(follower.path) else {
            return;
        };
        advance(pos, follower, &path.waypoints, enemy.current_speed() * DT)
    };

    if escaped {
        escape(ctx, entity);
    }
}

/// Move `step` tiles along the waypoints. Returns true once the last
/// waypoint has been reached.
fn advance(pos: &mut Position, follower: &mut PathFollower, waypoints: &[glam::Vec2], step: f32) -> bool {
    let mut remaining = step;
    while let Some(next) = waypoints.get(follower.next_waypoint) {
        let to_next = *next - pos.0;
        let distance = to_next.length();
        if distance > remaining {
            pos.0 += to_next / distance * remaining;
            return false;
        }
        pos.0 = *next;
        remaining -= distance;
        follower.next_waypoint += 1;
    }
    true
}

fn escape(ctx: &mut TickContext, entity: Entity) {
    if !ctx.registry.remove(entity) {
        return;
    }
    let entity_id = ctx.registry.entity_id(entity).map_or(0, |id| id.0);
    ctx.events.push(GameEvent::EnemyEscaped { entity_id });
    ctx.score.take_lives(1);

    if ctx.score.lives() == 0 && ctx.game_state.set_game_over() {
        info!(tick = ctx.tick, "game over");
        ctx.events.push(GameEvent::GameOver);
    }
}

/// Apply `amount` damage dealt by `weapon` to `enemy`, crediting it to
/// the tower `origin`. Enemies weak or strong against the weapon take
/// scaled damage. A lethal hit pays the enemy's reward and removes it.
/// Damage to an enemy that is already gone or dying is ignored.
pub fn damage(
    ctx: &mut TickContext,
    enemy: Entity,
    amount: f32,
    weapon: WeaponKind,
    origin: Option<Entity>,
) {
    if !ctx.registry.is_alive(enemy) {
        return;
    }
    let settings = ctx.config.game_settings();
    let (lethal, reward, amount) = {
        let world = ctx.registry.world_mut();
        let Ok(mut query) = world.query_one::<(&mut Health, &Enemy)>(enemy) else {
            return;
        };
        let Some((health, info)) = query.get() else {
            return;
        };
        let amount = amount
            * info.weapon_modifier(
                weapon,
                settings.weak_against_modifier,
                settings.strong_against_modifier,
            );
        (health.damage(amount), info.reward, amount)
    };

    if let Some(origin) = origin {
        report_damage(ctx, origin, amount);
    }

    if lethal {
        kill(ctx, enemy, reward);
    }
}

/// Slow `enemy` down by `factor`, bounded by the configured minimum speed
/// modifier.
pub fn slow_down(ctx: &mut TickContext, enemy: Entity, factor: f32) {
    let min = ctx.config.game_settings().min_speed_modifier;
    if let Ok(mut info) = ctx.registry.world_mut().get::<&mut Enemy>(enemy) {
        info.modify_speed(factor, min);
    }
}

fn report_damage(ctx: &mut TickContext, tower: Entity, amount: f32) {
    if let Ok(mut tower) = ctx.registry.world_mut().get::<&mut Tower>(tower) {
        tower.damage_inflicted += amount;
    }
}

fn kill(ctx: &mut TickContext, enemy: Entity, reward: f32) {
    if !ctx.registry.remove(enemy) {
        return;
    }
    let reward = reward.round().max(0.0) as u32;
    ctx.score.give_credits(reward, true);
    let entity_id = ctx.registry.entity_id(enemy).map_or(0, |id| id.0);
    ctx.events.push(GameEvent::EnemyKilled { entity_id, reward });
}

pub fn clean(ctx: &mut TickContext, entity: Entity) -> Option<Departure> {
    let wave = ctx.registry.world().get::<&Enemy>(entity).ok()?.wave;
    Some(Departure { entity, wave })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_advance_turns_corners() {
        let waypoints = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(2.0, 2.0)];
        let mut pos = Position::new(0.0, 0.0);
        let mut follower = PathFollower {
            path: 0,
            next_waypoint: 1,
        };
        assert!(!advance(&mut pos, &mut follower, &waypoints, 3.0));
        assert_eq!(follower.next_waypoint, 2);
        assert!((pos.0 - Vec2::new(2.0, 1.0)).length() < 1e-5);

        assert!(advance(&mut pos, &mut follower, &waypoints, 1.5));
        assert_eq!(pos.0, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_advance_from_offset_behind_start() {
        let waypoints = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)];
        let mut pos = Position::new(-1.0, 0.0);
        let mut follower = PathFollower {
            path: 0,
            next_waypoint: 1,
        };
        assert!(!advance(&mut pos, &mut follower, &waypoints, 2.0));
        assert!((pos.0.x - 1.0).abs() < 1e-5);
    }
}
