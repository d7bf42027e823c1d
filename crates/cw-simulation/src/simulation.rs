use std::fmt;

use cw_core::{DVec3, EntityId, EntityKind, World, WorldMeta};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::{ClockEvent, DayNightClock};
use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::gate::{SleepVerdict, sleep_verdict};
use crate::hud::{Hud, VitalReading};
use crate::interaction::{Fixtures, InteractionConfig, PickupConfig};
use crate::spatial::{IslandTerrain, SpatialQuery};
use crate::spawner::Spawner;
use crate::system::System;
use crate::vitals::{MotionTracker, VitalKind, Vitals, VitalsTransition};

/// Which of the two built-in spawners an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerRole {
    /// The daytime resource spawner (coconuts).
    Resources,
    /// The nighttime threat spawner (creatures).
    Threats,
}

impl fmt::Display for SpawnerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resources => write!(f, "resources"),
            Self::Threats => write!(f, "threats"),
        }
    }
}

/// Builds a [`SimContext`] from disjoint fields of the simulation so the
/// spawners (also fields) can be ticked alongside it.
macro_rules! context {
    ($sim:ident, $delta:expr) => {
        SimContext {
            world: &mut $sim.world,
            clock: &$sim.clock,
            events: &mut $sim.events,
            rng: &mut $sim.rng,
            terrain: $sim.terrain.as_ref(),
            player: $sim.player,
            delta: $delta,
            frame: $sim.frame,
        }
    };
}

/// The top-level simulation orchestrator.
///
/// Owns the world, clock, RNG, event log, both spawners, the player's
/// vitals and the interactive fixtures. Each [`tick`](Self::tick) runs,
/// in order: clock, resource spawner, threat spawner, extra systems,
/// motion sampling and vitals.
pub struct Simulation {
    world: World,
    player: EntityId,
    terrain: Box<dyn SpatialQuery>,
    clock: DayNightClock,
    rng: StdRng,
    events: EventLog,
    resources: Spawner,
    threats: Spawner,
    systems: Vec<Box<dyn System>>,
    energy: Vitals,
    thirst: Vitals,
    health: Vitals,
    motion: MotionTracker,
    fixtures: Fixtures,
    pickup: PickupConfig,
    frame: u64,
    spawners_ready: bool,
    initialized: bool,
    player_dead: bool,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("frame", &self.frame)
            .field("day", &self.clock.current_day())
            .field("systems", &self.systems.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation around an existing world and player.
    ///
    /// Fixtures from `config.interactions` are spawned into `world`. An
    /// invalid clock, vital or interaction configuration is an error; an
    /// invalid spawner configuration (or a dead `player` handle) only
    /// disables the spawner concerned once the simulation starts.
    pub fn new(
        mut world: World,
        player: EntityId,
        terrain: Box<dyn SpatialQuery>,
        config: SimConfig,
    ) -> SimResult<Self> {
        let clock = DayNightClock::new(config.clock)?;
        let energy = Vitals::new(VitalKind::Energy, config.energy)?;
        let thirst = Vitals::new(VitalKind::Thirst, config.thirst)?;
        let health = Vitals::new(VitalKind::Health, config.health)?;
        config.interactions.validate()?;
        let fixtures = Fixtures::place(&mut world, &config.interactions);

        Ok(Self {
            world,
            player,
            terrain,
            clock,
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            resources: Spawner::new(config.resources),
            threats: Spawner::new(config.threats),
            systems: Vec::new(),
            energy,
            thirst,
            health,
            motion: MotionTracker::new(),
            fixtures,
            pickup: config.interactions.pickup,
            frame: 0,
            spawners_ready: false,
            initialized: false,
            player_dead: false,
        })
    }

    /// Build a fresh island from `config.island`: the player and every
    /// fixture are dropped onto the ground.
    pub fn on_island(mut config: SimConfig) -> SimResult<Self> {
        config.island.validate()?;
        let terrain = IslandTerrain::new(config.island.clone());
        let mut world = World::new(WorldMeta::new(config.island.name.clone()));

        let snap = |p: DVec3| DVec3::new(p.x, terrain.height_at(p.x, p.z).unwrap_or(p.y), p.z);
        let interactions: &mut InteractionConfig = &mut config.interactions;
        for bed in &mut interactions.beds {
            bed.position = snap(bed.position);
        }
        for source in &mut interactions.water_sources {
            source.position = snap(source.position);
        }
        for guide in &mut interactions.guides {
            guide.position = snap(guide.position);
        }
        let start = snap(interactions.player_start);

        let player = world.spawn(EntityKind::Player, "Survivor", start);
        Self::new(world, player, Box::new(terrain), config)
    }

    /// Register an extra system. Extra systems tick after both spawners,
    /// in registration order.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Announce day 1 and initialize the spawners and every registered
    /// system. Called automatically by the first [`tick`](Self::tick).
    pub fn init(&mut self) -> SimResult<()> {
        if self.initialized {
            return Ok(());
        }
        if !self.spawners_ready {
            let events = self.clock.begin();
            self.log_clock_events(&events);
            self.resources.init(&mut context!(self, 0.0))?;
            self.threats.init(&mut context!(self, 0.0))?;
            self.spawners_ready = true;
        }
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let result = system.init(&mut context!(self, 0.0));
            self.systems[i] = system;
            result?;
        }
        if let Some(position) = self.world.position(self.player) {
            self.motion.sample(position);
        }
        self.initialized = true;
        tracing::info!(world = %self.world.meta.name, "simulation started");
        Ok(())
    }

    /// Advance the simulation by `delta` seconds.
    ///
    /// Non-positive or non-finite deltas are ignored. Nothing advances once
    /// the clock has ended or the player has died.
    pub fn tick(&mut self, delta: f64) -> SimResult<()> {
        if !self.initialized {
            self.init()?;
        }
        if self.is_over() || !delta.is_finite() || delta <= 0.0 {
            return Ok(());
        }

        self.frame += 1;
        let events = self.clock.tick(delta);
        self.log_clock_events(&events);
        if self.clock.is_ended() {
            return Ok(());
        }

        self.resources.tick(&mut context!(self, delta))?;
        self.threats.tick(&mut context!(self, delta))?;
        for i in 0..self.systems.len() {
            let mut system = std::mem::replace(&mut self.systems[i], Box::new(NoopSystem));
            let result = system.tick(&mut context!(self, delta));
            self.systems[i] = system;
            result?;
        }

        let moving = self
            .world
            .position(self.player)
            .is_some_and(|p| self.motion.sample(p));
        let transition = self.energy.tick(delta, moving);
        self.log_transition(VitalKind::Energy, transition);
        let transition = self.thirst.tick(delta, moving);
        self.log_transition(VitalKind::Thirst, transition);
        let transition = self.health.tick(delta, moving);
        self.log_transition(VitalKind::Health, transition);
        Ok(())
    }

    /// Advance `frames` frames of `delta` seconds each, stopping early once
    /// the game is over.
    pub fn run(&mut self, frames: u64, delta: f64) -> SimResult<()> {
        for _ in 0..frames {
            if self.is_over() {
                break;
            }
            self.tick(delta)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Event plumbing
    // -----------------------------------------------------------------------

    fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        self.events.push(SimEvent::new(
            self.frame,
            self.clock.elapsed(),
            kind,
            description,
        ));
    }

    fn log_clock_events(&mut self, events: &[ClockEvent]) {
        for event in events {
            match *event {
                ClockEvent::DayStarted(day) => {
                    self.emit(SimEventKind::DayStarted { day }, format!("Day {day} begins"));
                }
                ClockEvent::DaySpecific(day) => {
                    let message = self.clock.day_message(day).map(String::from);
                    let description = match &message {
                        Some(text) => format!("Day {day}: {text}"),
                        None => format!("Day {day} event"),
                    };
                    self.emit(SimEventKind::DayEvent { day, message }, description);
                }
                ClockEvent::PhaseChanged { day, is_night } => {
                    let description = if is_night {
                        format!("Night falls on day {day}")
                    } else {
                        format!("Dawn breaks on day {day}")
                    };
                    self.emit(SimEventKind::PhaseChanged { day, is_night }, description);
                }
                ClockEvent::GameComplete { days } => {
                    self.emit(
                        SimEventKind::GameCompleted { days },
                        format!("Survived all {days} days"),
                    );
                }
            }
        }
    }

    fn log_transition(&mut self, vital: VitalKind, transition: Option<VitalsTransition>) {
        match transition {
            Some(VitalsTransition::WarningRaised) => {
                self.emit(SimEventKind::VitalWarning { vital }, format!("{vital} is low"));
            }
            Some(VitalsTransition::WarningCleared) => {
                self.emit(
                    SimEventKind::VitalRecovered { vital },
                    format!("{vital} recovered"),
                );
            }
            None => {}
        }
        if vital == VitalKind::Health && self.health.is_depleted() && !self.player_dead {
            self.player_dead = true;
            tracing::warn!(frame = self.frame, "player died");
            self.emit(SimEventKind::PlayerDied, "The survivor has died");
        }
    }

    fn player_position(&self) -> SimResult<DVec3> {
        self.world
            .position(self.player)
            .ok_or(SimError::EntityNotFound(self.player))
    }

    // -----------------------------------------------------------------------
    // Interactions
    // -----------------------------------------------------------------------

    /// Try to sleep at the nearest bed. When allowed, energy is set to the
    /// bed's restore value and thirst is optionally refilled.
    pub fn try_sleep(&mut self) -> SimResult<SleepVerdict> {
        let player = self.player_position()?;
        let Some((bed, config)) = self.fixtures.nearest_bed(player).cloned() else {
            return Ok(SleepVerdict::OutOfRange);
        };
        let threats: Vec<DVec3> = self
            .world
            .all_entities()
            .filter(|e| e.kind.is_hostile())
            .map(|e| e.position)
            .collect();
        let verdict = sleep_verdict(
            config.position,
            player,
            config.sleep_range,
            &threats,
            config.enemy_check_radius,
        );

        if verdict.is_allowed() {
            let transition = self.energy.set(config.energy_restore);
            self.log_transition(VitalKind::Energy, transition);
            if config.restore_thirst {
                let transition = self.thirst.fill();
                self.log_transition(VitalKind::Thirst, transition);
            }
            tracing::info!(bed = %bed, "slept");
            self.emit(SimEventKind::Slept { bed }, "The survivor slept");
        } else {
            tracing::debug!(%verdict, "sleep refused");
            self.emit(SimEventKind::SleepRefused { verdict }, verdict.to_string());
        }
        Ok(verdict)
    }

    /// Drink from a water source in reach. Returns the thirst restored, or
    /// `None` when no water is close enough.
    pub fn try_drink(&mut self) -> SimResult<Option<f64>> {
        let player = self.player_position()?;
        let Some((source, config)) = self.fixtures.water_in_reach(player).cloned() else {
            return Ok(None);
        };
        let before = self.thirst.current();
        let transition = self.thirst.restore(config.restore_amount);
        self.log_transition(VitalKind::Thirst, transition);
        let amount = self.thirst.current() - before;
        self.emit(
            SimEventKind::Drank { source, amount },
            format!("Drank from {}", self.world.entity_name(source)),
        );
        Ok(Some(amount))
    }

    /// Ask a guide in reach for advice. Returns the next line in its cycle.
    pub fn talk(&mut self) -> SimResult<Option<String>> {
        let player = self.player_position()?;
        let Some(guide) = self.fixtures.guide_in_reach(player) else {
            return Ok(None);
        };
        let id = guide.id;
        let Some(line) = guide.next_line().map(String::from) else {
            return Ok(None);
        };
        self.emit(
            SimEventKind::GuideSpoke {
                guide: id,
                line: line.clone(),
            },
            format!("{} says: {line}", self.world.entity_name(id)),
        );
        Ok(Some(line))
    }

    /// Eat the nearest coconut within reach, if the player is hurt.
    /// Returns the health restored. The coconut is destroyed; its spawner
    /// prunes the dead handle on its next tick.
    pub fn try_pickup(&mut self) -> SimResult<Option<f64>> {
        let player = self.player_position()?;
        let radius = self.pickup.pickup_radius;
        let Some(coconut) = self
            .world
            .nearest(player, |e| {
                e.kind == EntityKind::Coconut && e.position.distance(player) <= radius
            })
            .map(|e| e.id)
        else {
            return Ok(None);
        };
        if self.health.current() >= self.health.max() {
            return Ok(None);
        }

        let before = self.health.current();
        let transition = self.health.restore(self.pickup.heal_amount);
        self.log_transition(VitalKind::Health, transition);
        let healed = self.health.current() - before;
        self.world.despawn(coconut)?;
        tracing::debug!(entity = %coconut, healed, "coconut eaten");
        self.emit(
            SimEventKind::PickedUp {
                entity: coconut,
                healed,
            },
            format!("Ate a coconut (+{healed:.0} health)"),
        );
        Ok(Some(healed))
    }

    /// Hurt the player. Logs a death the first time health reaches zero.
    pub fn damage_player(&mut self, amount: f64) {
        let transition = self.health.damage(amount);
        self.log_transition(VitalKind::Health, transition);
    }

    /// Move the player (the physics layer owns actual movement).
    pub fn move_player(&mut self, position: DVec3) -> SimResult<()> {
        self.world.set_position(self.player, position)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Administrative overrides
    // -----------------------------------------------------------------------

    /// Jump to the start of `day`.
    pub fn set_day(&mut self, day: u32) -> SimResult<()> {
        let events = self.clock.set_day(day)?;
        self.log_clock_events(&events);
        Ok(())
    }

    /// Move within the current day's cycle (`0.0` dawn, `0.5` dusk).
    pub fn set_time_of_day(&mut self, normalized: f64) {
        let events = self.clock.set_time_of_day(normalized);
        self.log_clock_events(&events);
    }

    /// Spawn one entity now from the given spawner.
    pub fn spawn_now(&mut self, role: SpawnerRole) -> SimResult<Option<EntityId>> {
        if !self.initialized {
            self.init()?;
        }
        match role {
            SpawnerRole::Resources => self.resources.spawn_now(&mut context!(self, 0.0)),
            SpawnerRole::Threats => self.threats.spawn_now(&mut context!(self, 0.0)),
        }
    }

    /// Despawn every member of the given spawner.
    pub fn clear_spawner(&mut self, role: SpawnerRole) -> usize {
        match role {
            SpawnerRole::Resources => self.resources.clear_all(&mut context!(self, 0.0)),
            SpawnerRole::Threats => self.threats.clear_all(&mut context!(self, 0.0)),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Snapshot for the HUD.
    pub fn hud(&self) -> Hud {
        Hud {
            day: self.clock.current_day(),
            max_days: self.clock.max_days(),
            time_of_day: self.clock.time_of_day(),
            is_night: self.clock.is_night(),
            cycle_progress: self.clock.cycle_progress(),
            ended: self.clock.is_ended(),
            player_dead: self.player_dead,
            energy: VitalReading::from(&self.energy),
            thirst: VitalReading::from(&self.thirst),
            health: VitalReading::from(&self.health),
            resources: self.resources.member_positions(&self.world).len(),
            threats: self.threats.member_positions(&self.world).len(),
        }
    }

    /// Whether the game has finished, by survival or death.
    pub fn is_over(&self) -> bool {
        self.clock.is_ended() || self.player_dead
    }

    /// Whether the player's health ran out.
    pub fn is_player_dead(&self) -> bool {
        self.player_dead
    }

    /// The entity table.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the entity table.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player handle.
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// The day/night clock.
    pub fn clock(&self) -> &DayNightClock {
        &self.clock
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// One of the two built-in spawners.
    pub fn spawner(&self, role: SpawnerRole) -> &Spawner {
        match role {
            SpawnerRole::Resources => &self.resources,
            SpawnerRole::Threats => &self.threats,
        }
    }

    /// One of the player's vitals.
    pub fn vitals(&self, kind: VitalKind) -> &Vitals {
        match kind {
            VitalKind::Energy => &self.energy,
            VitalKind::Thirst => &self.thirst,
            VitalKind::Health => &self.health,
        }
    }

    /// Placed beds, ponds and guides.
    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Access a registered system by downcasting to a concrete type.
    pub fn get_system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<T>())
    }

    /// Access a registered system mutably by downcasting to a concrete type.
    pub fn get_system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<T>())
    }

    /// Extract the world, consuming the simulation.
    pub fn into_world(self) -> World {
        self.world
    }
}

/// Placeholder system used during the swap-and-tick pattern.
#[derive(Debug)]
struct NoopSystem;

impl System for NoopSystem {
    fn name(&self) -> &str {
        "noop"
    }
    fn tick(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
