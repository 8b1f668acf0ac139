//! Per-entity lifecycle handlers run by the engine each tick.
//!
//! Every registry entity goes through `init` (once, when committed), `tick`
//! (every unpaused frame while alive) and `clean` (once, when its removal is
//! committed). Dispatch is by `EntityKind`; the handlers are free functions
//! over the shared `TickContext`.

pub mod effect;
pub mod enemy;
pub mod projectile;
pub mod snapshot;
pub mod tower;

use hecs::Entity;
use rand_chacha::ChaCha8Rng;

use anuto_core::enums::EntityKind;
use anuto_core::events::GameEvent;
use anuto_core::game_state::GameState;
use anuto_core::score::ScoreBoard;
use anuto_core::settings::GameConfig;
use anuto_core::types::WaveId;

use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::static_data::StaticDataCache;

/// Mutable session state handed to systems, wave attenders and the wave
/// manager while the engine is ticking.
pub struct TickContext<'a> {
    pub registry: &'a mut Registry,
    pub score: &'a mut ScoreBoard,
    pub game_state: &'a mut GameState,
    pub static_data: &'a mut StaticDataCache,
    pub config: &'a GameConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<GameEvent>,
    pub scheduler: &'a mut Scheduler,
    pub tick: u64,
}

/// An enemy left the game; its wave attender must be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub entity: Entity,
    pub wave: WaveId,
}

/// Tick every committed entity in registration order. Entities removed
/// earlier in the same sweep are skipped.
pub fn tick_all(ctx: &mut TickContext) {
    let order = ctx.registry.order().to_vec();
    for entity in order {
        if ctx.registry.is_alive(entity) {
            tick(ctx, entity);
        }
    }
}

pub fn tick(ctx: &mut TickContext, entity: Entity) {
    match ctx.registry.kind(entity) {
        Some(EntityKind::Enemy) => enemy::tick(ctx, entity),
        Some(EntityKind::Tower) => tower::tick(ctx, entity),
        Some(EntityKind::Projectile) => projectile::tick(ctx, entity),
        Some(EntityKind::Effect) => effect::tick(ctx, entity),
        None => {}
    }
}

pub fn init(ctx: &mut TickContext, entity: Entity) {
    match ctx.registry.kind(entity) {
        Some(EntityKind::Enemy) => enemy::init(ctx, entity),
        Some(EntityKind::Tower) => tower::init(ctx, entity),
        Some(EntityKind::Projectile) => projectile::init(ctx, entity),
        Some(EntityKind::Effect) => effect::init(ctx, entity),
        None => {}
    }
}

/// Run the removal hook. Returns the departure of an enemy so the engine
/// can notify its wave.
pub fn clean(ctx: &mut TickContext, entity: Entity) -> Option<Departure> {
    match ctx.registry.kind(entity) {
        Some(EntityKind::Enemy) => enemy::clean(ctx, entity),
        Some(EntityKind::Tower) => {
            tower::clean(ctx, entity);
            None
        }
        _ => None,
    }
}
