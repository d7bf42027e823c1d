use cw_core::{DVec3, EntityId, EntityKind, World};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// A bed the player can sleep in when no threat is close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedConfig {
    /// Where the bed stands.
    pub position: DVec3,
    /// How close the player must be.
    pub sleep_range: f64,
    /// Threats within this radius of the bed prevent sleeping.
    pub enemy_check_radius: f64,
    /// Energy is set to this value after sleeping.
    pub energy_restore: f64,
    /// Whether sleeping also refills thirst.
    pub restore_thirst: bool,
}

impl Default for BedConfig {
    fn default() -> Self {
        Self {
            position: DVec3::new(4.0, 0.0, 4.0),
            sleep_range: 2.0,
            enemy_check_radius: 10.0,
            energy_restore: 100.0,
            restore_thirst: false,
        }
    }
}

/// A pond the player can drink from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSourceConfig {
    /// Where the water is.
    pub position: DVec3,
    /// How close the player must be.
    pub drink_range: f64,
    /// Thirst restored per drink.
    pub restore_amount: f64,
}

impl Default for WaterSourceConfig {
    fn default() -> Self {
        Self {
            position: DVec3::new(-10.0, 0.0, 6.0),
            drink_range: 2.0,
            restore_amount: 30.0,
        }
    }
}

/// A stationary guide that hands out hints in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Where the guide waits.
    pub position: DVec3,
    /// How close the player must be.
    pub interaction_range: f64,
    /// Lines spoken in order, wrapping around.
    pub lines: Vec<String>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            position: DVec3::new(0.0, 0.0, -6.0),
            interaction_range: 3.0,
            lines: [
                "Sleep when you are spent, not before.",
                "The pond keeps you going. Drink often.",
                "Coconuts grow back each morning. Eat when you are hurt.",
                "Darkness brings things with teeth. Keep your bed clear of them.",
                "Count the days. Help comes to those who last.",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Rules for picking up food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// How close a coconut must be to grab it.
    pub pickup_radius: f64,
    /// Health restored per coconut.
    pub heal_amount: f64,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            pickup_radius: 1.0,
            heal_amount: 25.0,
        }
    }
}

/// Where the player starts and which fixtures are placed on the island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Player start position.
    pub player_start: DVec3,
    /// Beds.
    pub beds: Vec<BedConfig>,
    /// Water sources.
    pub water_sources: Vec<WaterSourceConfig>,
    /// Guides.
    pub guides: Vec<GuideConfig>,
    /// Pickup rules.
    pub pickup: PickupConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            player_start: DVec3::ZERO,
            beds: vec![BedConfig::default()],
            water_sources: vec![WaterSourceConfig::default()],
            guides: vec![GuideConfig::default()],
            pickup: PickupConfig::default(),
        }
    }
}

impl InteractionConfig {
    /// No fixtures at all; the player starts at the origin.
    pub fn empty() -> Self {
        Self {
            beds: Vec::new(),
            water_sources: Vec::new(),
            guides: Vec::new(),
            ..Self::default()
        }
    }

    /// Add a bed.
    pub fn with_bed(mut self, bed: BedConfig) -> Self {
        self.beds.push(bed);
        self
    }

    /// Add a water source.
    pub fn with_water_source(mut self, source: WaterSourceConfig) -> Self {
        self.water_sources.push(source);
        self
    }

    /// Add a guide.
    pub fn with_guide(mut self, guide: GuideConfig) -> Self {
        self.guides.push(guide);
        self
    }

    /// Reject negative ranges and amounts.
    pub fn validate(&self) -> SimResult<()> {
        let mut values = vec![self.pickup.pickup_radius, self.pickup.heal_amount];
        for bed in &self.beds {
            values.extend([bed.sleep_range, bed.enemy_check_radius, bed.energy_restore]);
        }
        for source in &self.water_sources {
            values.extend([source.drink_range, source.restore_amount]);
        }
        values.extend(self.guides.iter().map(|g| g.interaction_range));
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SimError::invalid_config(
                "interactions",
                "ranges and amounts must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// A guide placed in the world together with its dialogue cursor.
#[derive(Debug, Clone)]
pub struct PlacedGuide {
    /// The guide entity.
    pub id: EntityId,
    /// Its configuration.
    pub config: GuideConfig,
    next_line: usize,
}

impl PlacedGuide {
    /// The next line, advancing the cursor. `None` if the guide has nothing to say.
    pub fn next_line(&mut self) -> Option<&str> {
        if self.config.lines.is_empty() {
            return None;
        }
        let index = self.next_line % self.config.lines.len();
        self.next_line = index + 1;
        Some(&self.config.lines[index])
    }
}

/// Interactive fixtures placed in the world, each paired with its tuning.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    /// Placed beds.
    pub beds: Vec<(EntityId, BedConfig)>,
    /// Placed water sources.
    pub water_sources: Vec<(EntityId, WaterSourceConfig)>,
    /// Placed guides.
    pub guides: Vec<PlacedGuide>,
}

impl Fixtures {
    /// Spawn every configured fixture into `world`.
    pub fn place(world: &mut World, config: &InteractionConfig) -> Self {
        let mut fixtures = Self::default();
        for (i, bed) in config.beds.iter().enumerate() {
            let id = world.spawn(EntityKind::Bed, format!("Bed {}", i + 1), bed.position);
            fixtures.beds.push((id, bed.clone()));
        }
        for (i, source) in config.water_sources.iter().enumerate() {
            let id = world.spawn(
                EntityKind::WaterSource,
                format!("Pond {}", i + 1),
                source.position,
            );
            fixtures.water_sources.push((id, source.clone()));
        }
        for (i, guide) in config.guides.iter().enumerate() {
            let id = world.spawn(EntityKind::Guide, format!("Guide {}", i + 1), guide.position);
            fixtures.guides.push(PlacedGuide {
                id,
                config: guide.clone(),
                next_line: 0,
            });
        }
        tracing::debug!(
            beds = fixtures.beds.len(),
            water_sources = fixtures.water_sources.len(),
            guides = fixtures.guides.len(),
            "fixtures placed"
        );
        fixtures
    }

    /// The bed closest to `point`.
    pub fn nearest_bed(&self, point: DVec3) -> Option<&(EntityId, BedConfig)> {
        self.beds.iter().min_by(|a, b| {
            a.1.position
                .distance_squared(point)
                .total_cmp(&b.1.position.distance_squared(point))
        })
    }

    /// A water source within drinking range of `point`, closest first.
    pub fn water_in_reach(&self, point: DVec3) -> Option<&(EntityId, WaterSourceConfig)> {
        self.water_sources
            .iter()
            .filter(|(_, s)| s.position.distance(point) <= s.drink_range)
            .min_by(|a, b| {
                a.1.position
                    .distance_squared(point)
                    .total_cmp(&b.1.position.distance_squared(point))
            })
    }

    /// A guide within talking range of `point`.
    pub fn guide_in_reach(&mut self, point: DVec3) -> Option<&mut PlacedGuide> {
        self.guides
            .iter_mut()
            .find(|g| g.config.position.distance(point) <= g.config.interaction_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_core::WorldMeta;

    #[test]
    fn default_fixtures_are_placed() {
        let mut world = World::new(WorldMeta::new("Test"));
        let fixtures = Fixtures::place(&mut world, &InteractionConfig::default());
        assert_eq!(fixtures.beds.len(), 1);
        assert_eq!(world.entities_by_kind(&EntityKind::Bed).len(), 1);
        assert_eq!(world.entities_by_kind(&EntityKind::WaterSource).len(), 1);
        assert_eq!(world.entities_by_kind(&EntityKind::Guide).len(), 1);
    }

    #[test]
    fn guide_cycles_lines() {
        let mut world = World::new(WorldMeta::new("Test"));
        let guide = GuideConfig {
            lines: vec!["one".into(), "two".into()],
            ..GuideConfig::default()
        };
        let mut fixtures = Fixtures::place(&mut world, &InteractionConfig::empty().with_guide(guide));
        let at = fixtures.guides[0].config.position;
        let g = fixtures.guide_in_reach(at).unwrap();
        assert_eq!(g.next_line(), Some("one"));
        assert_eq!(g.next_line(), Some("two"));
        assert_eq!(g.next_line(), Some("one"));
        assert!(fixtures.guide_in_reach(at + DVec3::X * 10.0).is_none());
    }

    #[test]
    fn silent_guide_says_nothing() {
        let mut world = World::new(WorldMeta::new("Test"));
        let guide = GuideConfig {
            lines: Vec::new(),
            ..GuideConfig::default()
        };
        let mut fixtures = Fixtures::place(&mut world, &InteractionConfig::empty().with_guide(guide));
        assert_eq!(fixtures.guides[0].next_line(), None);
    }

    #[test]
    fn water_reach_is_range_limited() {
        let mut world = World::new(WorldMeta::new("Test"));
        let fixtures = Fixtures::place(&mut world, &InteractionConfig::default());
        let pond = fixtures.water_sources[0].1.position;
        assert!(fixtures.water_in_reach(pond + DVec3::X).is_some());
        assert!(fixtures.water_in_reach(pond + DVec3::X * 3.0).is_none());
    }

    #[test]
    fn negative_ranges_rejected() {
        let config = InteractionConfig::empty().with_bed(BedConfig {
            sleep_range: -1.0,
            ..BedConfig::default()
        });
        assert!(config.validate().is_err());
        InteractionConfig::default().validate().unwrap();
    }
}
