//! Frame-driven survival simulation for Castaway.
//!
//! A [`Simulation`] owns the [`cw_core::World`], a day/night clock, two
//! spawners (coconuts by day, creatures by night), the player's vitals and
//! the interactive fixtures. The host calls [`Simulation::tick`] once per
//! frame with the elapsed seconds, and calls the interaction methods
//! (`try_sleep`, `try_drink`, `talk`, `try_pickup`) when the player acts.
//! Everything that happens is recorded in an [`EventLog`].

/// Day/night clock with day counting and the end-of-game transition.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to systems each frame.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Proximity and safety checks.
pub mod gate;
/// Read-only HUD snapshot.
pub mod hud;
/// Beds, water sources, guides and pickups.
pub mod interaction;
/// Random search for valid spawn points.
pub mod placement;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Ground and obstacle queries, plus a simple island terrain.
pub mod spatial;
/// Phase-gated spawn/despawn lifecycle manager.
pub mod spawner;
/// The trait that all simulation systems implement.
pub mod system;
/// Energy, thirst and health.
pub mod vitals;

/// Re-exports of the clock types.
pub use clock::{ClockConfig, ClockEvent, DayNightClock, Phase, TimeOfDay};
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the event types.
pub use event::{DespawnReason, EventLog, SimEvent, SimEventKind};
/// Re-export of the sleep verdict.
pub use gate::SleepVerdict;
/// Re-export of the HUD snapshot.
pub use hud::Hud;
/// Re-export of the interaction configuration.
pub use interaction::InteractionConfig;
/// Re-exports of [`simulation::Simulation`] and [`simulation::SpawnerRole`].
pub use simulation::{Simulation, SpawnerRole};
/// Re-exports of the terrain types.
pub use spatial::{IslandConfig, IslandTerrain, SpatialQuery};
/// Re-exports of the spawner types.
pub use spawner::{ActivePhase, Spawner, SpawnerConfig};
/// Re-export of [`system::System`].
pub use system::System;
/// Re-exports of the vitals types.
pub use vitals::{MotionTracker, VitalKind, Vitals, VitalsConfig, VitalsTransition};
