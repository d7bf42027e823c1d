use cw_core::{DVec3, EntityId, World};
use rand::rngs::StdRng;

use crate::clock::DayNightClock;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::spatial::SpatialQuery;

/// Mutable context passed to each system during a frame.
///
/// Everything a system depends on arrives here explicitly: the entity
/// table, the clock, the terrain, the player handle and the frame delta.
pub struct SimContext<'a> {
    /// The entity table.
    pub world: &'a mut World,
    /// The day/night clock, already advanced for this frame.
    pub clock: &'a DayNightClock,
    /// Shared event log.
    pub events: &'a mut EventLog,
    /// Seeded random source.
    pub rng: &'a mut StdRng,
    /// Ground and obstacle queries.
    pub terrain: &'a dyn SpatialQuery,
    /// Handle of the player entity.
    pub player: EntityId,
    /// Seconds covered by this frame.
    pub delta: f64,
    /// Frame counter, starting at 1 for the first tick.
    pub frame: u64,
}

impl SimContext<'_> {
    /// Emit a simulation event stamped with the current frame and clock time.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(
            self.frame,
            self.clock.elapsed(),
            kind,
            description,
        ));
    }

    /// Current player position, or `None` if the player entity is gone.
    pub fn player_position(&self) -> Option<DVec3> {
        self.world.position(self.player)
    }
}
