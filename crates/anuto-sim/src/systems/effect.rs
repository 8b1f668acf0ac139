//! Explosion effects. Damage is dealt once when the explosion is
//! committed; afterwards it only lingers for its lifetime.

use hecs::Entity;

use anuto_core::components::Explosion;
use anuto_core::enums::EntityKind;
use anuto_core::types::Position;

use super::{enemy, TickContext};
use crate::components::Origin;
use crate::static_data::{Animation, SpriteTemplate, EXPLOSION_KEY};

pub fn init(ctx: &mut TickContext, entity: Entity) {
    let (Some(pos), Ok(explosion)) = (
        ctx.registry.position(entity),
        ctx.registry.world().get::<&Explosion>(entity).map(|e| *e),
    ) else {
        return;
    };
    let origin = ctx.registry.world().get::<&Origin>(entity).ok().map(|o| o.0);

    let template = ctx.static_data.get_or_build(EXPLOSION_KEY, || SpriteTemplate {
        frames: 1,
        frequency: 0.0,
    });
    let _ = ctx
        .registry
        .world_mut()
        .insert_one(entity, Animation::new(template, 0));

    for victim in ctx.registry.within(EntityKind::Enemy, &pos, explosion.radius) {
        enemy::damage(ctx, victim, explosion.damage, explosion.weapon, origin);
    }
}

pub fn tick(ctx: &mut TickContext, entity: Entity) {
    let expired = ctx
        .registry
        .world_mut()
        .get::<&mut Explosion>(entity)
        .map(|mut explosion| explosion.lifetime.tick())
        .unwrap_or(false);
    if expired {
        ctx.registry.remove(entity);
    }
}
