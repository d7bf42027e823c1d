use glam::DVec3;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::{CoreError, CoreResult};

/// Metadata about the world itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMeta {
    /// Display name of the world (e.g. the island's name).
    pub name: String,
}

impl WorldMeta {
    /// Create metadata with the given world name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The entity table. Owns every live entity; hands out generational handles.
#[derive(Debug, Clone)]
pub struct World {
    /// Descriptive metadata.
    pub meta: WorldMeta,
    entities: SlotMap<EntityId, Entity>,
}

impl World {
    /// Create an empty world.
    pub fn new(meta: WorldMeta) -> Self {
        Self {
            meta,
            entities: SlotMap::with_key(),
        }
    }

    // -----------------------------------------------------------------------
    // Entity lifecycle
    // -----------------------------------------------------------------------

    /// Insert an entity and return its freshly assigned handle.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        self.entities.insert_with_key(|id| Entity { id, ..entity })
    }

    /// Create an entity of `kind` at `position`. Returns its handle.
    pub fn spawn(&mut self, kind: EntityKind, name: impl Into<String>, position: DVec3) -> EntityId {
        self.insert(Entity::new(kind, name, position))
    }

    /// Destroy an entity. Every outstanding handle to it becomes dead.
    pub fn despawn(&mut self, id: EntityId) -> CoreResult<Entity> {
        self.entities
            .remove(id)
            .ok_or(CoreError::EntityNotFound(id))
    }

    /// Whether `id` still refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Get a reference to an entity by handle.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Position of a live entity.
    pub fn position(&self, id: EntityId) -> Option<DVec3> {
        self.entities.get(id).map(|e| e.position)
    }

    /// Move a live entity.
    pub fn set_position(&mut self, id: EntityId, position: DVec3) -> CoreResult<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or(CoreError::EntityNotFound(id))?;
        entity.position = position;
        Ok(())
    }

    /// Name of an entity, or `"<gone>"` when the handle is dead.
    pub fn entity_name(&self, id: EntityId) -> &str {
        self.entities
            .get(id)
            .map(|e| e.name.as_str())
            .unwrap_or("<gone>")
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get all entities of a specific kind.
    pub fn entities_by_kind(&self, kind: &EntityKind) -> Vec<&Entity> {
        self.entities.values().filter(|e| &e.kind == kind).collect()
    }

    /// Get all entities.
    pub fn all_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// The live entity closest to `point` that satisfies `filter`.
    pub fn nearest(&self, point: DVec3, filter: impl Fn(&Entity) -> bool) -> Option<&Entity> {
        self.entities
            .values()
            .filter(|e| filter(e))
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        World::new(WorldMeta::new("Test Island"))
    }

    #[test]
    fn spawn_and_get_entity() {
        let mut world = test_world();
        let id = world.spawn(EntityKind::Coconut, "Coconut", DVec3::new(1.0, 0.5, 2.0));
        let entity = world.get_entity(id).unwrap();
        assert_eq!(entity.id, id);
        assert_eq!(entity.kind, EntityKind::Coconut);
        assert_eq!(world.position(id), Some(DVec3::new(1.0, 0.5, 2.0)));
    }

    #[test]
    fn despawn_kills_handle() {
        let mut world = test_world();
        let id = world.spawn(EntityKind::Coconut, "Coconut", DVec3::ZERO);
        assert!(world.is_alive(id));
        world.despawn(id).unwrap();
        assert!(!world.is_alive(id));
        assert!(world.despawn(id).is_err());
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut world = test_world();
        let old = world.spawn(EntityKind::Coconut, "Old", DVec3::ZERO);
        world.despawn(old).unwrap();
        let new = world.spawn(EntityKind::Coconut, "New", DVec3::ZERO);
        assert_ne!(old, new);
        assert!(!world.is_alive(old));
        assert_eq!(world.entity_name(new), "New");
        assert_eq!(world.entity_name(old), "<gone>");
    }

    #[test]
    fn set_position_on_dead_entity_fails() {
        let mut world = test_world();
        let id = world.spawn(EntityKind::Player, "Player", DVec3::ZERO);
        world.set_position(id, DVec3::X).unwrap();
        assert_eq!(world.position(id), Some(DVec3::X));
        world.despawn(id).unwrap();
        assert!(world.set_position(id, DVec3::ZERO).is_err());
    }

    #[test]
    fn entities_by_kind_and_counts() {
        let mut world = test_world();
        world.spawn(EntityKind::Coconut, "A", DVec3::ZERO);
        world.spawn(EntityKind::Coconut, "B", DVec3::ZERO);
        world.spawn(EntityKind::Bed, "Bed", DVec3::ZERO);

        assert_eq!(world.entities_by_kind(&EntityKind::Coconut).len(), 2);
        assert_eq!(world.entities_by_kind(&EntityKind::Bed).len(), 1);
        assert_eq!(world.entities_by_kind(&EntityKind::Guide).len(), 0);
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn nearest_respects_filter() {
        let mut world = test_world();
        world.spawn(EntityKind::Bed, "Near bed", DVec3::new(1.0, 0.0, 0.0));
        world.spawn(EntityKind::Bed, "Far bed", DVec3::new(10.0, 0.0, 0.0));
        world.spawn(EntityKind::Coconut, "Closer coconut", DVec3::new(0.5, 0.0, 0.0));

        let bed = world
            .nearest(DVec3::ZERO, |e| e.kind == EntityKind::Bed)
            .unwrap();
        assert_eq!(bed.name, "Near bed");
        assert!(world.nearest(DVec3::ZERO, |e| e.kind == EntityKind::Guide).is_none());
    }

    proptest::proptest! {
        #[test]
        fn despawned_handles_never_revive(ops in proptest::collection::vec(proptest::bool::ANY, 1..64)) {
            let mut world = test_world();
            let mut live = Vec::new();
            let mut dead = Vec::new();
            for spawn in ops {
                if spawn || live.is_empty() {
                    live.push(world.spawn(EntityKind::Coconut, "c", DVec3::ZERO));
                } else {
                    let id = live.remove(0);
                    world.despawn(id).unwrap();
                    dead.push(id);
                }
                proptest::prop_assert_eq!(world.entity_count(), live.len());
                for id in &dead {
                    proptest::prop_assert!(!world.is_alive(*id));
                }
            }
        }
    }
}
