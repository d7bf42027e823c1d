use serde::{Deserialize, Serialize};

use crate::clock::ClockConfig;
use crate::error::SimResult;
use crate::interaction::InteractionConfig;
use crate::spatial::IslandConfig;
use crate::spawner::SpawnerConfig;
use crate::vitals::{VitalKind, VitalsConfig};

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON file only needs to list what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Day/night clock.
    pub clock: ClockConfig,
    /// Daytime resource spawner.
    pub resources: SpawnerConfig,
    /// Nighttime threat spawner.
    pub threats: SpawnerConfig,
    /// Energy vital.
    pub energy: VitalsConfig,
    /// Thirst vital.
    pub thirst: VitalsConfig,
    /// Health vital.
    pub health: VitalsConfig,
    /// Player start and fixtures.
    pub interactions: InteractionConfig,
    /// Terrain used by [`Simulation::on_island`](crate::Simulation::on_island).
    pub island: IslandConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_events: 0,
            clock: ClockConfig::default(),
            resources: SpawnerConfig::coconuts(),
            threats: SpawnerConfig::night_creatures(),
            energy: VitalsConfig::energy(),
            thirst: VitalsConfig::thirst(),
            health: VitalsConfig::health(),
            interactions: InteractionConfig::default(),
            island: IslandConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the clock configuration.
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the resource spawner configuration.
    pub fn with_resources(mut self, resources: SpawnerConfig) -> Self {
        self.resources = resources;
        self
    }

    /// Replace the threat spawner configuration.
    pub fn with_threats(mut self, threats: SpawnerConfig) -> Self {
        self.threats = threats;
        self
    }

    /// Replace the configuration of one vital.
    pub fn with_vital(mut self, kind: VitalKind, config: VitalsConfig) -> Self {
        match kind {
            VitalKind::Energy => self.energy = config,
            VitalKind::Thirst => self.thirst = config,
            VitalKind::Health => self.health = config,
        }
        self
    }

    /// Replace the fixtures.
    pub fn with_interactions(mut self, interactions: InteractionConfig) -> Self {
        self.interactions = interactions;
        self
    }

    /// Replace the island.
    pub fn with_island(mut self, island: IslandConfig) -> Self {
        self.island = island;
        self
    }

    /// Check every component. Spawner problems are reported here too,
    /// although at run time they only disable the spawner concerned.
    pub fn validate(&self) -> SimResult<()> {
        self.clock.validate()?;
        self.resources.validate()?;
        self.threats.validate()?;
        self.energy.validate(VitalKind::Energy)?;
        self.thirst.validate(VitalKind::Thirst)?;
        self.health.validate(VitalKind::Health)?;
        self.island.validate()?;
        self.interactions.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_events, 0);
        assert!((config.clock.cycle_duration - 120.0).abs() < f64::EPSILON);
        assert_eq!(config.clock.max_days, 4);
        assert_eq!(config.resources.capacity, 5);
        assert_eq!(config.threats.per_phase_cap, Some(5));
        config.validate().unwrap();
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_max_events(500)
            .with_clock(ClockConfig::default().with_max_days(7))
            .with_vital(VitalKind::Thirst, VitalsConfig::thirst().with_decay(2.0));
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_events, 500);
        assert_eq!(config.clock.max_days, 7);
        assert!((config.thirst.decay_rate - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "seed": 9, "clock": { "max_days": 2 }, "resources": { "capacity": 3 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.clock.max_days, 2);
        assert!((config.clock.cycle_duration - 120.0).abs() < f64::EPSILON);
        assert_eq!(config.resources.capacity, 3);
        assert_eq!(config.resources.spawn_interval, 60.0);
        // Untouched sections keep their own presets.
        assert_eq!(config.threats.name, "night_creatures");
    }

    #[test]
    fn json_round_trip_of_defaults() {
        let config = SimConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SimConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn validate_catches_degenerate_island() {
        let island = IslandConfig {
            peak_height: 2.0,
            ..IslandConfig::flat(0.0)
        };
        let err = SimConfig::default().with_island(island).validate().unwrap_err();
        assert!(err.to_string().contains("island"));
    }

    #[test]
    fn validate_catches_bad_clock() {
        let config = SimConfig::default().with_clock(ClockConfig::default().with_cycle_duration(-1.0));
        assert!(config.validate().is_err());
    }
}
