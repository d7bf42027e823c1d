use serde::{Deserialize, Serialize};

use crate::clock::TimeOfDay;
use crate::vitals::Vitals;

/// One vital as the HUD shows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    /// Current value.
    pub current: f64,
    /// Upper bound.
    pub max: f64,
    /// Whether the low-value warning is showing.
    pub warning: bool,
}

impl From<&Vitals> for VitalReading {
    fn from(vitals: &Vitals) -> Self {
        Self {
            current: vitals.current(),
            max: vitals.max(),
            warning: vitals.is_warning(),
        }
    }
}

/// Read-only snapshot of everything the HUD displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    /// Current day, `max_days + 1` once the game is over.
    pub day: u32,
    /// Last playable day.
    pub max_days: u32,
    /// Coarse time label.
    pub time_of_day: TimeOfDay,
    /// Whether it is night.
    pub is_night: bool,
    /// Position within the current cycle, in `[0, 1)`.
    pub cycle_progress: f64,
    /// Whether all days have been survived.
    pub ended: bool,
    /// Whether the player's health ran out.
    pub player_dead: bool,
    /// Energy reading.
    pub energy: VitalReading,
    /// Thirst reading.
    pub thirst: VitalReading,
    /// Health reading.
    pub health: VitalReading,
    /// Live resource count.
    pub resources: usize,
    /// Live threat count.
    pub threats: usize,
}

impl Hud {
    /// The day counter as shown on screen ("Day 2/4", or "Survived" once over).
    pub fn day_label(&self) -> String {
        if self.ended {
            format!("Survived {} days", self.max_days)
        } else {
            format!("Day {}/{}", self.day, self.max_days)
        }
    }
}
