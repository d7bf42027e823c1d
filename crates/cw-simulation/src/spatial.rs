use cw_core::{DVec3, horizontal_distance};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Spatial validity queries the simulation needs from the physics layer.
///
/// The simulation never moves bodies; it only asks where the ground is and
/// whether a volume is free.
pub trait SpatialQuery: std::fmt::Debug {
    /// Probe straight down from `origin` for at most `max_distance`.
    /// Returns the ground contact point, if any.
    fn ground_below(&self, origin: DVec3, max_distance: f64) -> Option<DVec3>;

    /// Whether a sphere at `center` with `radius` overlaps any obstacle.
    fn is_obstructed(&self, center: DVec3, radius: f64) -> bool;
}

/// A spherical obstacle (boulder, tree canopy, wreckage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Sphere center.
    pub center: DVec3,
    /// Sphere radius.
    pub radius: f64,
}

impl Obstacle {
    /// Create an obstacle.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Shape of the island used by [`IslandTerrain`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Display name of the island.
    pub name: String,
    /// Shoreline radius around the origin. No ground beyond it.
    pub radius: f64,
    /// Ground height at the island's center; falls off to 0 at the shore.
    pub peak_height: f64,
    /// Obstacles scattered on the island.
    pub obstacles: Vec<Obstacle>,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            name: "Castaway Isle".to_string(),
            radius: 80.0,
            peak_height: 2.0,
            obstacles: vec![
                Obstacle::new(DVec3::new(12.0, 2.0, -18.0), 2.5),
                Obstacle::new(DVec3::new(-20.0, 1.5, 10.0), 3.0),
                Obstacle::new(DVec3::new(25.0, 1.0, 22.0), 2.0),
                Obstacle::new(DVec3::new(-8.0, 2.0, -30.0), 1.5),
            ],
        }
    }
}

impl IslandConfig {
    /// A flat island with no obstacles, handy for deterministic tests.
    pub fn flat(radius: f64) -> Self {
        Self {
            name: "Flat Isle".to_string(),
            radius,
            peak_height: 0.0,
            obstacles: Vec::new(),
        }
    }

    /// Reject shapes the terrain cannot represent.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SimError::invalid_config(
                "island",
                format!("radius must be positive, got {}", self.radius),
            ));
        }
        if !self.peak_height.is_finite() {
            return Err(SimError::invalid_config(
                "island",
                format!("peak_height must be finite, got {}", self.peak_height),
            ));
        }
        for (i, obstacle) in self.obstacles.iter().enumerate() {
            if !(obstacle.center.is_finite() && obstacle.radius.is_finite() && obstacle.radius >= 0.0) {
                return Err(SimError::invalid_config(
                    "island",
                    format!("obstacle {i} needs a finite center and a non-negative radius"),
                ));
            }
        }
        Ok(())
    }
}

/// A round island: a low dome of ground with spherical obstacles on it.
#[derive(Debug, Clone)]
pub struct IslandTerrain {
    config: IslandConfig,
}

impl IslandTerrain {
    /// Build terrain from its configuration.
    pub fn new(config: IslandConfig) -> Self {
        Self { config }
    }

    /// Ground height at a horizontal position, or `None` over water.
    pub fn height_at(&self, x: f64, z: f64) -> Option<f64> {
        let d = horizontal_distance(DVec3::new(x, 0.0, z), DVec3::ZERO);
        if d > self.config.radius {
            return None;
        }
        let t = d / self.config.radius;
        Some(self.config.peak_height * (1.0 - t * t))
    }

    /// The island configuration.
    pub fn config(&self) -> &IslandConfig {
        &self.config
    }
}

impl SpatialQuery for IslandTerrain {
    fn ground_below(&self, origin: DVec3, max_distance: f64) -> Option<DVec3> {
        let ground = self.height_at(origin.x, origin.z)?;
        let drop = origin.y - ground;
        if (0.0..=max_distance).contains(&drop) {
            Some(DVec3::new(origin.x, ground, origin.z))
        } else {
            None
        }
    }

    fn is_obstructed(&self, center: DVec3, radius: f64) -> bool {
        self.config
            .obstacles
            .iter()
            .any(|o| o.center.distance(center) < o.radius + radius)
    }
}
