use cw_core::{EntityId, EntityKind};

use crate::gate::SleepVerdict;
use crate::vitals::VitalKind;

/// Why a spawned entity left its spawner's population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    /// Wandered (or was left) beyond the despawn distance.
    TooFar,
    /// Cleared at dawn.
    Dawn,
    /// Removed by an explicit `clear_all`.
    Cleared,
}

impl std::fmt::Display for DespawnReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFar => write!(f, "too far"),
            Self::Dawn => write!(f, "dawn"),
            Self::Cleared => write!(f, "cleared"),
        }
    }
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Clock
    /// A new day began.
    DayStarted {
        /// The day number.
        day: u32,
    },
    /// A day's one-time specific event.
    DayEvent {
        /// The day number.
        day: u32,
        /// Configured message for that day, if any.
        message: Option<String>,
    },
    /// The cycle crossed between day and night.
    PhaseChanged {
        /// The day number.
        day: u32,
        /// Whether night has fallen.
        is_night: bool,
    },
    /// All playable days survived.
    GameCompleted {
        /// Number of days survived.
        days: u32,
    },

    // Spawners
    /// A spawner created an entity.
    Spawned {
        /// Spawner name.
        spawner: String,
        /// The new entity.
        entity: EntityId,
        /// Template it was created from.
        kind: EntityKind,
    },
    /// A spawner destroyed one of its members.
    Despawned {
        /// Spawner name.
        spawner: String,
        /// The destroyed entity.
        entity: EntityId,
        /// Why it was destroyed.
        reason: DespawnReason,
    },
    /// A spawn attempt found no valid position.
    SpawnFailed {
        /// Spawner name.
        spawner: String,
    },
    /// A spawner was disabled by a configuration error.
    SpawnerDisabled {
        /// Spawner name.
        spawner: String,
        /// The configuration error.
        reason: String,
    },

    // Vitals
    /// A vital dropped to or below its warning threshold.
    VitalWarning {
        /// Which vital.
        vital: VitalKind,
    },
    /// A vital rose back above its warning threshold.
    VitalRecovered {
        /// Which vital.
        vital: VitalKind,
    },
    /// Health reached zero.
    PlayerDied,

    // Interactions
    /// The player slept in a bed.
    Slept {
        /// The bed used.
        bed: EntityId,
    },
    /// The player tried to sleep but was refused.
    SleepRefused {
        /// Why sleeping was refused.
        verdict: SleepVerdict,
    },
    /// The player drank from a water source.
    Drank {
        /// The water source used.
        source: EntityId,
        /// Thirst restored.
        amount: f64,
    },
    /// A guide spoke a line.
    GuideSpoke {
        /// The guide.
        guide: EntityId,
        /// The line spoken.
        line: String,
    },
    /// The player picked up (and ate) a coconut.
    PickedUp {
        /// The consumed entity.
        entity: EntityId,
        /// Health restored.
        healed: f64,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Spawned { entity, .. }
            | Self::Despawned { entity, .. }
            | Self::PickedUp { entity, .. } => *entity == id,
            Self::Slept { bed } => *bed == id,
            Self::Drank { source, .. } => *source == id,
            Self::GuideSpoke { guide, .. } => *guide == id,
            Self::DayStarted { .. }
            | Self::DayEvent { .. }
            | Self::PhaseChanged { .. }
            | Self::GameCompleted { .. }
            | Self::SpawnFailed { .. }
            | Self::SpawnerDisabled { .. }
            | Self::VitalWarning { .. }
            | Self::VitalRecovered { .. }
            | Self::PlayerDied
            | Self::SleepRefused { .. } => false,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The frame number when this event occurred.
    pub frame: u64,
    /// Clock time (elapsed seconds) when this event occurred.
    pub time: f64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event.
    pub fn new(frame: u64, time: f64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            frame,
            time,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events recorded during the given frame.
    pub fn events_at_frame(&self, frame: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.frame == frame).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Return all events matching a predicate on their kind.
    pub fn matching(&self, pred: impl Fn(&SimEventKind) -> bool) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| pred(&e.kind)).collect()
    }

    /// Count events matching a predicate on their kind.
    pub fn count(&self, pred: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_core::{DVec3, World, WorldMeta};

    fn ids() -> (EntityId, EntityId, EntityId) {
        let mut world = World::new(WorldMeta::new("Test"));
        (
            world.spawn(EntityKind::Coconut, "a", DVec3::ZERO),
            world.spawn(EntityKind::Bed, "b", DVec3::ZERO),
            world.spawn(EntityKind::Guide, "c", DVec3::ZERO),
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let (id, _, _) = ids();
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(
            1,
            0.5,
            SimEventKind::Spawned {
                spawner: "coconuts".into(),
                entity: id,
                kind: EntityKind::Coconut,
            },
            "test",
        ));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_frame(1).len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        for day in 0..5 {
            log.push(SimEvent::new(
                u64::from(day),
                0.0,
                SimEventKind::DayStarted { day },
                "test",
            ));
        }
        assert_eq!(log.len(), 2);
        // Oldest events were dropped, newest remain
        assert_eq!(log.events()[0].frame, 3);
        assert_eq!(log.events()[1].frame, 4);
    }

    #[test]
    fn event_kind_involves_entity() {
        let (e1, e2, e3) = ids();

        let kind = SimEventKind::Despawned {
            spawner: "creatures".into(),
            entity: e1,
            reason: DespawnReason::TooFar,
        };
        assert!(kind.involves(e1));
        assert!(!kind.involves(e2));

        let kind = SimEventKind::Slept { bed: e2 };
        assert!(kind.involves(e2));
        assert!(!kind.involves(e1));

        let kind = SimEventKind::GuideSpoke {
            guide: e3,
            line: "Find the pond.".into(),
        };
        assert!(kind.involves(e3));
        assert!(!kind.involves(e1));

        // Clock events involve nobody
        assert!(!SimEventKind::DayStarted { day: 2 }.involves(e1));
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(1, 0.0, SimEventKind::PlayerDied, "test"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn count_and_matching_filter_by_kind() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(1, 0.0, SimEventKind::DayStarted { day: 1 }, "d1"));
        log.push(SimEvent::new(
            1,
            0.0,
            SimEventKind::SpawnFailed {
                spawner: "coconuts".into(),
            },
            "fail",
        ));
        log.push(SimEvent::new(2, 1.0, SimEventKind::DayStarted { day: 2 }, "d2"));

        assert_eq!(
            log.count(|k| matches!(k, SimEventKind::DayStarted { .. })),
            2
        );
        let fails = log.matching(|k| matches!(k, SimEventKind::SpawnFailed { .. }));
        assert_eq!(fails.len(), 1);
        assert_eq!(fails[0].description, "fail");
    }
}
