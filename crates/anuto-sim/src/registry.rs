//! Active-entity registry.
//!
//! Wraps the hecs world and owns entity lifetime between `init` and
//! `clean`. Adds and removals requested while a tick sweep is running are
//! buffered; the engine commits them after the sweep, so iteration is never
//! invalidated and a removed entity is skipped for the rest of its frame.
//!
//! `hecs::Entity` handles are generation-checked, so a stale target handle
//! is detected by `is_alive` instead of dangling.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, EntityBuilder, World};

use anuto_core::enums::EntityKind;
use anuto_core::types::{EntityId, Position};

#[derive(Default)]
pub struct Registry {
    world: World,
    /// Committed entities in registration order.
    order: Vec<Entity>,
    pending_adds: Vec<Entity>,
    pending_removals: Vec<Entity>,
    removing: HashSet<Entity>,
    ids: HashMap<EntityId, Entity>,
    next_entity_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn next_entity_id(&self) -> u32 {
        self.next_entity_id
    }

    pub fn set_next_entity_id(&mut self, next: u32) {
        self.next_entity_id = next;
    }

    /// Create an entity from `builder`. It becomes visible to sweeps and
    /// queries once the engine commits pending adds.
    pub fn spawn(&mut self, kind: EntityKind, mut builder: EntityBuilder) -> Entity {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;

        builder.add(id).add(kind);
        let entity = self.world.spawn(builder.build());
        self.ids.insert(id, entity);
        self.pending_adds.push(entity);
        entity
    }

    /// Request removal. Returns false if the entity is already gone or
    /// already scheduled for removal.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.world.contains(entity) || !self.removing.insert(entity) {
            return false;
        }
        self.pending_removals.push(entity);
        true
    }

    /// Whether `entity` exists and is not scheduled for removal.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.contains(entity) && !self.removing.contains(&entity)
    }

    pub fn lookup(&self, id: EntityId) -> Option<Entity> {
        self.ids.get(&id).copied().filter(|e| self.is_alive(*e))
    }

    pub fn entity_id(&self, entity: Entity) -> Option<EntityId> {
        self.world.get::<&EntityId>(entity).ok().map(|id| *id)
    }

    pub fn kind(&self, entity: Entity) -> Option<EntityKind> {
        self.world.get::<&EntityKind>(entity).ok().map(|kind| *kind)
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    /// Committed entities in registration order, including ones scheduled
    /// for removal this frame.
    pub fn order(&self) -> &[Entity] {
        &self.order
    }

    /// Live committed entities of `kind` in registration order.
    pub fn active(&self, kind: EntityKind) -> impl Iterator<Item = Entity> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |&e| self.is_alive(e) && self.kind(e) == Some(kind))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.active(kind).count()
    }

    /// Nearest live entity of `kind` to `from`, optionally within
    /// `max_distance`. Ties go to the earliest registered entity.
    pub fn nearest(
        &self,
        kind: EntityKind,
        from: &Position,
        max_distance: Option<f32>,
    ) -> Option<Entity> {
        let mut best: Option<(f32, Entity)> = None;
        for entity in self.active(kind) {
            let Some(pos) = self.position(entity) else {
                continue;
            };
            let distance = from.distance_to(&pos);
            if max_distance.is_some_and(|max| distance > max) {
                continue;
            }
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, entity));
            }
        }
        best.map(|(_, entity)| entity)
    }

    /// Live committed entities of `kind` within `radius` of `from`, in
    /// registration order.
    pub fn within(&self, kind: EntityKind, from: &Position, radius: f32) -> Vec<Entity> {
        self.active(kind)
            .filter(|&e| {
                self.position(e)
                    .is_some_and(|pos| from.distance_to(&pos) <= radius)
            })
            .collect()
    }

    /// Append pending adds to the registration order and return them.
    pub fn commit_adds(&mut self) -> Vec<Entity> {
        let added = std::mem::take(&mut self.pending_adds);
        self.order.extend(added.iter().copied());
        added
    }

    /// Take the removals requested since the last call. The entities stay
    /// in the world until `despawn` so `clean` can still read them.
    pub fn take_removals(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending_removals)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_adds.is_empty() || !self.pending_removals.is_empty()
    }

    pub fn despawn(&mut self, entity: Entity) {
        if let Some(id) = self.entity_id(entity) {
            self.ids.remove(&id);
        }
        self.removing.remove(&entity);
        self.order.retain(|&e| e != entity);
        self.pending_adds.retain(|&e| e != entity);
        let _ = self.world.despawn(entity);
    }

    /// Drop every entity without running lifecycle hooks. The id counter
    /// keeps counting so ids are never reused within a process.
    pub fn clear(&mut self) {
        self.world.clear();
        self.order.clear();
        self.pending_adds.clear();
        self.pending_removals.clear();
        self.removing.clear();
        self.ids.clear();
    }
}
