use std::f64::consts::TAU;

use cw_core::DVec3;
use rand::Rng;

use crate::spatial::SpatialQuery;

/// Parameters of the bounded random search for a spawn point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Outer radius of the sampling annulus around the center.
    pub radius: f64,
    /// Inner radius of the sampling annulus.
    pub min_distance: f64,
    /// Minimum distance to any already-occupied point. 0 disables the check.
    pub min_separation: f64,
    /// Height above the center the ground probe starts from; the probe
    /// spans twice this distance downward.
    pub ground_probe_distance: f64,
    /// Lift applied to the ground point.
    pub surface_offset: f64,
    /// Height of the clearance sphere above the spawn point.
    pub clearance_height: f64,
    /// Radius of the clearance sphere.
    pub clearance_radius: f64,
    /// Candidates tried before giving up.
    pub attempt_budget: u32,
}

/// Search for a spawn point around `center`.
///
/// Candidates are drawn area-uniformly from the annulus
/// `[min_distance, radius]` in the horizontal plane, dropped onto the ground
/// and rejected when the ground is missing, the clearance sphere is blocked,
/// or an occupied point is closer than `min_separation`. Returns `None` once
/// `attempt_budget` candidates have been rejected.
pub fn find_valid_position(
    center: DVec3,
    placement: &Placement,
    terrain: &dyn SpatialQuery,
    occupied: &[DVec3],
    rng: &mut impl Rng,
) -> Option<DVec3> {
    let inner_sq = placement.min_distance * placement.min_distance;
    let outer_sq = placement.radius * placement.radius;
    let probe = placement.ground_probe_distance;

    for attempt in 0..placement.attempt_budget {
        let r = rng.random_range(inner_sq..=outer_sq).sqrt();
        let theta = rng.random_range(0.0..TAU);
        let origin = DVec3::new(
            center.x + r * theta.cos(),
            center.y + probe,
            center.z + r * theta.sin(),
        );

        let Some(ground) = terrain.ground_below(origin, probe * 2.0) else {
            tracing::trace!(attempt, "placement rejected: no ground");
            continue;
        };
        let spawn = ground + DVec3::Y * placement.surface_offset;

        let clearance = spawn + DVec3::Y * placement.clearance_height;
        if terrain.is_obstructed(clearance, placement.clearance_radius) {
            tracing::trace!(attempt, "placement rejected: obstructed");
            continue;
        }

        if placement.min_separation > 0.0
            && occupied
                .iter()
                .any(|p| p.distance(spawn) < placement.min_separation)
        {
            tracing::trace!(attempt, "placement rejected: too close to a neighbour");
            continue;
        }

        return Some(spawn);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{IslandConfig, IslandTerrain, Obstacle};
    use cw_core::horizontal_distance;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn placement() -> Placement {
        Placement {
            radius: 30.0,
            min_distance: 15.0,
            min_separation: 5.0,
            ground_probe_distance: 20.0,
            surface_offset: 0.5,
            clearance_height: 1.0,
            clearance_radius: 0.5,
            attempt_budget: 30,
        }
    }

    #[test]
    fn samples_land_in_annulus_on_the_ground() {
        let terrain = IslandTerrain::new(IslandConfig::flat(100.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = find_valid_position(DVec3::ZERO, &placement(), &terrain, &[], &mut rng)
                .unwrap();
            let d = horizontal_distance(p, DVec3::ZERO);
            assert!((15.0 - 1e-9..=30.0 + 1e-9).contains(&d), "distance {d}");
            assert!((p.y - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn gives_up_over_water() {
        let terrain = IslandTerrain::new(IslandConfig::flat(5.0));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(find_valid_position(DVec3::ZERO, &placement(), &terrain, &[], &mut rng).is_none());
    }

    #[test]
    fn respects_obstacles() {
        let mut config = IslandConfig::flat(100.0);
        // A wall of rock covering the whole annulus.
        config.obstacles.push(Obstacle::new(DVec3::ZERO, 40.0));
        let terrain = IslandTerrain::new(config);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(find_valid_position(DVec3::ZERO, &placement(), &terrain, &[], &mut rng).is_none());
    }

    #[test]
    fn keeps_separation_from_occupied_points() {
        let terrain = IslandTerrain::new(IslandConfig::flat(100.0));
        let mut rng = StdRng::seed_from_u64(11);
        let mut occupied = Vec::new();
        for _ in 0..5 {
            if let Some(p) =
                find_valid_position(DVec3::ZERO, &placement(), &terrain, &occupied, &mut rng)
            {
                occupied.push(p);
            }
        }
        for (i, a) in occupied.iter().enumerate() {
            for b in &occupied[i + 1..] {
                assert!(a.distance(*b) >= 5.0);
            }
        }
    }

    #[test]
    fn degenerate_ring_is_allowed() {
        let terrain = IslandTerrain::new(IslandConfig::flat(100.0));
        let mut rng = StdRng::seed_from_u64(5);
        let ring = Placement {
            min_distance: 10.0,
            radius: 10.0,
            ..placement()
        };
        let p = find_valid_position(DVec3::ZERO, &ring, &terrain, &[], &mut rng).unwrap();
        assert!((horizontal_distance(p, DVec3::ZERO) - 10.0).abs() < 1e-6);
    }
}
