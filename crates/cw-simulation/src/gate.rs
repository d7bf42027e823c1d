//! Proximity and safety checks shared by the interactions.
//!
//! Everything here is a pure function of positions; nothing is cached.

use std::fmt;

use cw_core::DVec3;
use serde::{Deserialize, Serialize};

/// Whether `a` and `b` are within `range` of each other (inclusive).
pub fn in_range(a: DVec3, b: DVec3, range: f64) -> bool {
    a.distance(b) <= range
}

/// Whether no threat stands within `safe_radius` of `point` (inclusive).
pub fn is_safe(point: DVec3, threats: &[DVec3], safe_radius: f64) -> bool {
    !threats.iter().any(|t| t.distance(point) <= safe_radius)
}

/// Outcome of asking to sleep at a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepVerdict {
    /// The player is too far from the bed.
    OutOfRange,
    /// A threat is too close to the bed.
    ThreatsNearby,
    /// Sleeping is allowed.
    Allowed,
}

impl SleepVerdict {
    /// Whether the verdict permits sleeping.
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }
}

impl fmt::Display for SleepVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "too far from the bed"),
            Self::ThreatsNearby => write!(f, "can't sleep, enemies nearby"),
            Self::Allowed => write!(f, "ready to sleep"),
        }
    }
}

/// Decide whether the player may sleep. Range is checked before safety, so
/// a far-away player is told to come closer rather than warned of threats.
pub fn sleep_verdict(
    bed: DVec3,
    player: DVec3,
    sleep_range: f64,
    threats: &[DVec3],
    enemy_check_radius: f64,
) -> SleepVerdict {
    if !in_range(bed, player, sleep_range) {
        SleepVerdict::OutOfRange
    } else if !is_safe(bed, threats, enemy_check_radius) {
        SleepVerdict::ThreatsNearby
    } else {
        SleepVerdict::Allowed
    }
}

/// Whether the player is within `sleep_range` of the bed and no threat is
/// within `enemy_check_radius` of the bed.
pub fn may_sleep(
    bed: DVec3,
    player: DVec3,
    sleep_range: f64,
    threats: &[DVec3],
    enemy_check_radius: f64,
) -> bool {
    sleep_verdict(bed, player, sleep_range, threats, enemy_check_radius).is_allowed()
}
