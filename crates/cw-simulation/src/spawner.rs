use std::fmt;

use cw_core::{DVec3, EntityId, EntityKind, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::Phase;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{DespawnReason, SimEventKind};
use crate::placement::{Placement, find_valid_position};
use crate::system::System;

/// Which part of the cycle a spawner is allowed to spawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePhase {
    /// Only while the sun is up.
    Day,
    /// Only at night.
    Night,
    /// Regardless of the phase.
    Always,
}

impl ActivePhase {
    /// Whether spawning is allowed during `phase`.
    pub fn includes(self, phase: Phase) -> bool {
        match self {
            Self::Day => phase == Phase::Day,
            Self::Night => phase == Phase::Night,
            Self::Always => true,
        }
    }
}

impl fmt::Display for ActivePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Night => write!(f, "night"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Tuning for one [`Spawner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Name used in logs and events.
    pub name: String,
    /// When spawning is allowed.
    pub active_phase: ActivePhase,
    /// Kinds to spawn; one is picked at random per spawn.
    pub templates: Vec<EntityKind>,
    /// Maximum live population.
    pub capacity: usize,
    /// Maximum spawns per active phase. `None` is unlimited.
    pub per_phase_cap: Option<u32>,
    /// Seconds between spawn attempts.
    pub spawn_interval: f64,
    /// Outer radius of the spawn ring around the player.
    pub spawn_radius: f64,
    /// Inner radius of the spawn ring around the player.
    pub min_distance_from_player: f64,
    /// Minimum distance between members. 0 disables the check.
    pub min_separation: f64,
    /// Members farther than this from the player are despawned.
    pub despawn_distance: Option<f64>,
    /// Despawn the whole population when day breaks.
    pub clear_at_dawn: bool,
    /// Zero the spawn timer when the active phase begins.
    pub reset_timer_on_activation: bool,
    /// Height above the player the ground probe starts at.
    pub ground_probe_distance: f64,
    /// Lift above the ground contact point.
    pub surface_offset: f64,
    /// Height of the clearance check above the spawn point.
    pub clearance_height: f64,
    /// Radius of the clearance check.
    pub clearance_radius: f64,
    /// Placement candidates per spawn attempt.
    pub attempt_budget: u32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self::coconuts()
    }
}

impl SpawnerConfig {
    /// Renewable coconuts by day.
    pub fn coconuts() -> Self {
        Self {
            name: "coconuts".to_string(),
            active_phase: ActivePhase::Day,
            templates: vec![EntityKind::Coconut],
            capacity: 5,
            per_phase_cap: None,
            spawn_interval: 60.0,
            spawn_radius: 30.0,
            min_distance_from_player: 15.0,
            min_separation: 5.0,
            despawn_distance: None,
            clear_at_dawn: true,
            reset_timer_on_activation: false,
            ground_probe_distance: 20.0,
            surface_offset: 0.5,
            clearance_height: 1.0,
            clearance_radius: 0.5,
            attempt_budget: 30,
        }
    }

    /// Creatures that roam at night.
    pub fn night_creatures() -> Self {
        Self {
            name: "night_creatures".to_string(),
            active_phase: ActivePhase::Night,
            templates: vec![
                EntityKind::Creature("shade".to_string()),
                EntityKind::Creature("stalker".to_string()),
            ],
            capacity: 5,
            per_phase_cap: Some(5),
            spawn_interval: 8.0,
            spawn_radius: 30.0,
            min_distance_from_player: 10.0,
            min_separation: 0.0,
            despawn_distance: Some(50.0),
            clear_at_dawn: true,
            reset_timer_on_activation: true,
            ground_probe_distance: 10.0,
            surface_offset: 0.5,
            clearance_height: 2.0,
            clearance_radius: 1.0,
            attempt_budget: 20,
        }
    }

    /// Rename the spawner.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the spawn templates.
    pub fn with_templates(mut self, templates: Vec<EntityKind>) -> Self {
        self.templates = templates;
        self
    }

    /// Set the maximum live population.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the per-phase spawn cap.
    pub fn with_per_phase_cap(mut self, cap: Option<u32>) -> Self {
        self.per_phase_cap = cap;
        self
    }

    /// Set the seconds between spawn attempts.
    pub fn with_interval(mut self, seconds: f64) -> Self {
        self.spawn_interval = seconds;
        self
    }

    /// Set the spawn ring around the player.
    pub fn with_ring(mut self, min_distance: f64, radius: f64) -> Self {
        self.min_distance_from_player = min_distance;
        self.spawn_radius = radius;
        self
    }

    /// Set the active phase.
    pub fn with_active_phase(mut self, phase: ActivePhase) -> Self {
        self.active_phase = phase;
        self
    }

    /// Placement parameters for the spawn search.
    pub fn placement(&self) -> Placement {
        Placement {
            radius: self.spawn_radius,
            min_distance: self.min_distance_from_player,
            min_separation: self.min_separation,
            ground_probe_distance: self.ground_probe_distance,
            surface_offset: self.surface_offset,
            clearance_height: self.clearance_height,
            clearance_radius: self.clearance_radius,
            attempt_budget: self.attempt_budget,
        }
    }

    /// Check every value a spawner relies on.
    pub fn validate(&self) -> SimResult<()> {
        let component = format!("spawner '{}'", self.name);
        let invalid = |reason: String| -> SimResult<()> {
            Err(SimError::invalid_config(component.clone(), reason))
        };

        if self.templates.is_empty() {
            return Err(SimError::NoTemplates {
                spawner: self.name.clone(),
            });
        }
        if self.capacity == 0 {
            return invalid("capacity must be at least 1".into());
        }
        if !(self.spawn_interval.is_finite() && self.spawn_interval > 0.0) {
            return invalid(format!(
                "spawn_interval must be positive, got {}",
                self.spawn_interval
            ));
        }
        if !(self.spawn_radius.is_finite() && self.spawn_radius > 0.0) {
            return invalid(format!("spawn_radius must be positive, got {}", self.spawn_radius));
        }
        if !(0.0..=self.spawn_radius).contains(&self.min_distance_from_player) {
            return invalid(format!(
                "min_distance_from_player must be within 0..={}, got {}",
                self.spawn_radius, self.min_distance_from_player
            ));
        }
        if let Some(d) = self.despawn_distance {
            if !(d.is_finite() && d > 0.0) {
                return invalid(format!("despawn_distance must be positive, got {d}"));
            }
        }
        if !(self.ground_probe_distance.is_finite() && self.ground_probe_distance > 0.0) {
            return invalid("ground_probe_distance must be positive".into());
        }
        let non_negative = [
            self.min_separation,
            self.surface_offset,
            self.clearance_height,
            self.clearance_radius,
        ];
        if non_negative.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return invalid("separation, offset and clearance values must be non-negative".into());
        }
        if self.attempt_budget == 0 {
            return invalid("attempt_budget must be at least 1".into());
        }
        Ok(())
    }
}

/// Keeps a bounded population of entities alive around the player during
/// one phase of the day/night cycle.
///
/// The spawner owns only handles. Entities destroyed by someone else (a
/// pickup, a kill) are pruned on the next tick.
#[derive(Debug)]
pub struct Spawner {
    config: SpawnerConfig,
    members: Vec<EntityId>,
    spawn_timer: f64,
    spawned_this_phase: u32,
    spawned_total: u64,
    failed_attempts: u64,
    last_phase: Option<Phase>,
    last_day: u32,
    disabled: Option<String>,
}

impl Spawner {
    /// Create a spawner. Configuration is checked in [`System::init`].
    pub fn new(config: SpawnerConfig) -> Self {
        Self {
            config,
            members: Vec::new(),
            spawn_timer: 0.0,
            spawned_this_phase: 0,
            spawned_total: 0,
            failed_attempts: 0,
            last_phase: None,
            last_day: 1,
            disabled: None,
        }
    }

    /// Number of tracked members. May include entities destroyed since the
    /// last tick.
    pub fn population(&self) -> usize {
        self.members.len()
    }

    /// Tracked member handles, oldest first.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Positions of the members that are still alive.
    pub fn member_positions(&self, world: &World) -> Vec<DVec3> {
        self.members
            .iter()
            .filter_map(|id| world.position(*id))
            .collect()
    }

    /// The configuration in use.
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Seconds accumulated towards the next attempt.
    pub fn spawn_timer(&self) -> f64 {
        self.spawn_timer
    }

    /// Spawns during the current (or most recent) active phase.
    pub fn spawned_this_phase(&self) -> u32 {
        self.spawned_this_phase
    }

    /// Spawns over the whole session.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Attempts whose placement search came up empty.
    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts
    }

    /// Whether a configuration error switched this spawner off.
    pub fn is_disabled(&self) -> bool {
        self.disabled.is_some()
    }

    /// The configuration error that disabled this spawner, if any.
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled.as_deref()
    }

    /// Spawn one entity immediately, ignoring the phase and the timer but
    /// honouring the capacity and the per-phase cap.
    pub fn spawn_now(&mut self, ctx: &mut SimContext<'_>) -> SimResult<Option<EntityId>> {
        if self.disabled.is_some() {
            return Ok(None);
        }
        self.prune_dead(ctx.world);
        if !self.has_room() {
            return Ok(None);
        }
        self.attempt_spawn(ctx)
    }

    /// Despawn every member. Returns how many entities were destroyed.
    pub fn clear_all(&mut self, ctx: &mut SimContext<'_>) -> usize {
        self.despawn_all(ctx, DespawnReason::Cleared)
    }

    fn has_room(&self) -> bool {
        self.members.len() < self.config.capacity
            && self
                .config
                .per_phase_cap
                .is_none_or(|cap| self.spawned_this_phase < cap)
    }

    fn disable(&mut self, ctx: &mut SimContext<'_>, err: &SimError) {
        let reason = err.to_string();
        tracing::error!(spawner = %self.config.name, error = %reason, "spawner disabled");
        ctx.emit(
            SimEventKind::SpawnerDisabled {
                spawner: self.config.name.clone(),
                reason: reason.clone(),
            },
            format!("{} disabled: {reason}", self.config.name),
        );
        self.disabled = Some(reason);
    }

    fn prune_dead(&mut self, world: &World) {
        self.members.retain(|id| world.is_alive(*id));
    }

    fn despawn_all(&mut self, ctx: &mut SimContext<'_>, reason: DespawnReason) -> usize {
        let members = std::mem::take(&mut self.members);
        let mut removed = 0;
        for id in members {
            if ctx.world.despawn(id).is_ok() {
                removed += 1;
                self.emit_despawn(ctx, id, reason);
            }
        }
        if removed > 0 {
            tracing::info!(spawner = %self.config.name, removed, %reason, "population cleared");
        }
        removed
    }

    fn emit_despawn(&self, ctx: &mut SimContext<'_>, entity: EntityId, reason: DespawnReason) {
        ctx.emit(
            SimEventKind::Despawned {
                spawner: self.config.name.clone(),
                entity,
                reason,
            },
            format!("{} despawned {entity} ({reason})", self.config.name),
        );
    }

    fn despawn_far(&mut self, ctx: &mut SimContext<'_>, player: DVec3, max: f64) {
        let (far, near): (Vec<EntityId>, Vec<EntityId>) =
            self.members.iter().copied().partition(|id| {
                ctx.world
                    .position(*id)
                    .is_some_and(|p| p.distance(player) > max)
            });
        self.members = near;
        for id in far {
            if ctx.world.despawn(id).is_ok() {
                tracing::debug!(spawner = %self.config.name, entity = %id, "despawned: too far");
                self.emit_despawn(ctx, id, DespawnReason::TooFar);
            }
        }
    }

    /// Phase bookkeeping. A new day always counts as dawn, even when the
    /// frame jumped from one night straight into the next. An `Always`
    /// spawner starts a new phase with each day.
    fn observe_phase(&mut self, ctx: &mut SimContext<'_>) {
        let phase = ctx.clock.phase();
        let day = ctx.clock.current_day();
        let new_day = day != self.last_day;
        let Some(prev) = self.last_phase.replace(phase) else {
            self.last_day = day;
            return;
        };
        self.last_day = day;

        let active = self.config.active_phase;
        let entered = active.includes(phase) && (!active.includes(prev) || new_day);
        if entered {
            self.spawned_this_phase = 0;
            if self.config.reset_timer_on_activation {
                self.spawn_timer = 0.0;
            }
            tracing::debug!(spawner = %self.config.name, %phase, "active phase began");
        }

        let dawn = new_day || (phase == Phase::Day && prev == Phase::Night);
        if dawn && self.config.clear_at_dawn {
            self.despawn_all(ctx, DespawnReason::Dawn);
        }
    }

    fn attempt_spawn(&mut self, ctx: &mut SimContext<'_>) -> SimResult<Option<EntityId>> {
        let player = ctx.player_position().ok_or(SimError::MissingPlayer)?;
        let occupied = self.member_positions(ctx.world);
        let placement = self.config.placement();

        let Some(position) = find_valid_position(player, &placement, ctx.terrain, &occupied, &mut *ctx.rng)
        else {
            self.failed_attempts += 1;
            tracing::warn!(
                spawner = %self.config.name,
                attempts = placement.attempt_budget,
                "no valid spawn position"
            );
            ctx.emit(
                SimEventKind::SpawnFailed {
                    spawner: self.config.name.clone(),
                },
                format!("{} found no valid spawn position", self.config.name),
            );
            return Ok(None);
        };

        let index = ctx.rng.random_range(0..self.config.templates.len());
        let kind = self.config.templates[index].clone();
        self.spawned_total += 1;
        let name = format!("{kind} {}", self.spawned_total);
        let id = ctx.world.spawn(kind.clone(), name.clone(), position);
        self.members.push(id);
        self.spawned_this_phase += 1;

        tracing::info!(
            spawner = %self.config.name,
            entity = %id,
            %kind,
            x = position.x,
            z = position.z,
            "spawned"
        );
        ctx.emit(
            SimEventKind::Spawned {
                spawner: self.config.name.clone(),
                entity: id,
                kind,
            },
            format!("{name} appeared"),
        );
        Ok(Some(id))
    }
}

impl System for Spawner {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn init(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        let check = self.config.validate().and_then(|()| {
            if ctx.world.is_alive(ctx.player) {
                Ok(())
            } else {
                Err(SimError::MissingPlayer)
            }
        });
        if let Err(err) = check {
            self.disable(ctx, &err);
            return Ok(());
        }
        self.last_phase = Some(ctx.clock.phase());
        self.last_day = ctx.clock.current_day();
        Ok(())
    }

    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()> {
        if self.disabled.is_some() {
            return Ok(());
        }

        self.observe_phase(ctx);
        self.prune_dead(ctx.world);

        let Some(player) = ctx.player_position() else {
            tracing::debug!(spawner = %self.config.name, "player gone, spawner idle");
            return Ok(());
        };
        if let Some(max) = self.config.despawn_distance {
            self.despawn_far(ctx, player, max);
        }

        if !self.config.active_phase.includes(ctx.clock.phase()) {
            return Ok(());
        }

        self.spawn_timer += ctx.delta;
        if self.spawn_timer >= self.config.spawn_interval && self.has_room() {
            self.spawn_timer = 0.0;
            self.attempt_spawn(ctx)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
