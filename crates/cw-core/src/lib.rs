//! Core types for Castaway: entity handles, entity kinds, and the world table.
//!
//! Every object the survival simulation cares about (the player, spawned
//! coconuts and creatures, beds, water sources) lives in a [`World`] and is
//! addressed by a generational [`EntityId`]. A handle outlives the entity it
//! points to, so callers check [`World::is_alive`] instead of trusting it.

/// Entity kinds, identifiers, and the entity record.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The world table that owns every live entity.
pub mod world;

/// Re-export core entity types.
pub use entity::{Entity, EntityId, EntityKind};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the position type used across the workspace.
pub use glam::DVec3;
/// Re-export world model types.
pub use world::{World, WorldMeta};

/// Horizontal (XZ-plane) distance between two points, ignoring height.
pub fn horizontal_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = DVec3::new(0.0, 0.0, 0.0);
        let b = DVec3::new(3.0, 100.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < f64::EPSILON);
    }
}
