use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use slotmap::{Key, new_key_type};

new_key_type! {
    /// Generational handle for every entity in the world.
    ///
    /// A handle stays `Copy` and comparable after its entity is despawned;
    /// the slot's version changes, so a stale handle never aliases a newer
    /// entity that reuses the slot.
    pub struct EntityId;
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?}", self.data())
    }
}

/// The kind of an entity. Extensible via `Custom(String)` for user-defined types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The controllable survivor.
    Player,
    /// A renewable food pickup.
    Coconut,
    /// A nocturnal threat, named by its template (e.g. "shade", "stalker").
    Creature(String),
    /// A sleeping spot.
    Bed,
    /// A drinkable pond or spring.
    WaterSource,
    /// A stationary guide that offers hints.
    Guide,
    /// A user-defined entity type not covered by built-in kinds.
    Custom(String),
}

impl EntityKind {
    /// Returns true for kinds that count as hostile.
    pub fn is_hostile(&self) -> bool {
        matches!(self, Self::Creature(_))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Coconut => write!(f, "coconut"),
            Self::Creature(name) => write!(f, "{name}"),
            Self::Bed => write!(f, "bed"),
            Self::WaterSource => write!(f, "water source"),
            Self::Guide => write!(f, "guide"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A single world object: what it is, what it is called, and where it stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Handle of this entity. Filled in by the world on insertion.
    pub id: EntityId,
    /// The kind (type) of this entity.
    pub kind: EntityKind,
    /// Display name of the entity.
    pub name: String,
    /// World-space position. Y is up.
    pub position: DVec3,
}

impl Entity {
    /// Create a new entity. The id is assigned by [`crate::World::insert`].
    pub fn new(kind: EntityKind, name: impl Into<String>, position: DVec3) -> Self {
        Self {
            id: EntityId::default(),
            kind,
            name: name.into(),
            position,
        }
    }
}
