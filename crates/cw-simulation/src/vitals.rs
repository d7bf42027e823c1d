use std::fmt;

use cw_core::{DVec3, horizontal_distance};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Which player vital a [`Vitals`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalKind {
    /// Drains while moving, recovers while idle, refilled by sleeping.
    Energy,
    /// Drains constantly, refilled by drinking.
    Thirst,
    /// Only changes through damage and food.
    Health,
}

impl fmt::Display for VitalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::Thirst => write!(f, "thirst"),
            Self::Health => write!(f, "health"),
        }
    }
}

/// Tuning for a single vital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Upper bound of the value.
    pub max: f64,
    /// Value at session start. Clamped to `[0, max]`.
    pub initial: f64,
    /// Units lost per second (while active, when regeneration is enabled).
    pub decay_rate: f64,
    /// Units gained per idle second. `None` disables regeneration, and the
    /// vital then decays regardless of activity.
    pub regen_rate: Option<f64>,
    /// At or below this value the vital is in its warning state.
    pub warning_threshold: f64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self::energy()
    }
}

impl VitalsConfig {
    /// Energy: 100, drains 1/s while moving, regains 2/s while idle, warns at 30.
    pub fn energy() -> Self {
        Self {
            max: 100.0,
            initial: 100.0,
            decay_rate: 1.0,
            regen_rate: Some(2.0),
            warning_threshold: 30.0,
        }
    }

    /// Thirst: 100, drains 0.5/s always, warns at 25.
    pub fn thirst() -> Self {
        Self {
            max: 100.0,
            initial: 100.0,
            decay_rate: 0.5,
            regen_rate: None,
            warning_threshold: 25.0,
        }
    }

    /// Health: 100, static unless damaged or healed, warns at 25.
    pub fn health() -> Self {
        Self {
            max: 100.0,
            initial: 100.0,
            decay_rate: 0.0,
            regen_rate: None,
            warning_threshold: 25.0,
        }
    }

    /// Set the maximum (and start full).
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self.initial = max;
        self
    }

    /// Set the starting value.
    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = initial;
        self
    }

    /// Set the decay rate.
    pub fn with_decay(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Set (or disable, with `None`) the regeneration rate.
    pub fn with_regen(mut self, rate: Option<f64>) -> Self {
        self.regen_rate = rate;
        self
    }

    /// Set the warning threshold.
    pub fn with_warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = threshold;
        self
    }

    /// Reject a non-positive max and negative or non-finite rates.
    pub fn validate(&self, kind: VitalKind) -> SimResult<()> {
        let component = format!("vital '{kind}'");
        if !(self.max.is_finite() && self.max > 0.0) {
            return Err(SimError::invalid_config(
                component,
                format!("max must be positive, got {}", self.max),
            ));
        }
        let rates = [Some(self.decay_rate), self.regen_rate];
        if rates.iter().flatten().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(SimError::invalid_config(
                component,
                "rates must be finite and non-negative",
            ));
        }
        if !self.initial.is_finite() || !self.warning_threshold.is_finite() {
            return Err(SimError::invalid_config(
                component,
                "initial and warning_threshold must be finite",
            ));
        }
        Ok(())
    }
}

/// A change in a vital's warning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalsTransition {
    /// The value dropped to or below the threshold.
    WarningRaised,
    /// The value rose back above the threshold.
    WarningCleared,
}

/// A bounded player vital with decay, optional regeneration and a latched
/// low-value warning.
///
/// The value is clamped to `[0, max]` after every mutation. Every mutation
/// reports a [`VitalsTransition`] when the warning state flips, so a warning
/// fires once per contiguous stretch below the threshold.
#[derive(Debug, Clone)]
pub struct Vitals {
    kind: VitalKind,
    config: VitalsConfig,
    current: f64,
    has_warned: bool,
}

impl Vitals {
    /// Create a vital from its configuration.
    pub fn new(kind: VitalKind, config: VitalsConfig) -> SimResult<Self> {
        config.validate(kind)?;
        let current = config.initial.clamp(0.0, config.max);
        let has_warned = current <= config.warning_threshold;
        Ok(Self {
            kind,
            config,
            current,
            has_warned,
        })
    }

    /// Advance by `delta` seconds. `is_active` only matters when the vital
    /// regenerates: active time drains it, idle time refills it.
    pub fn tick(&mut self, delta: f64, is_active: bool) -> Option<VitalsTransition> {
        if !delta.is_finite() || delta <= 0.0 {
            return None;
        }
        let change = match self.config.regen_rate {
            Some(regen) if !is_active => regen * delta,
            _ => -self.config.decay_rate * delta,
        };
        self.apply(self.current + change)
    }

    /// Add `amount` (negative amounts are ignored).
    pub fn restore(&mut self, amount: f64) -> Option<VitalsTransition> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        self.apply(self.current + amount)
    }

    /// Subtract `amount` (negative amounts are ignored).
    pub fn damage(&mut self, amount: f64) -> Option<VitalsTransition> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        self.apply(self.current - amount)
    }

    /// Assign a value directly.
    pub fn set(&mut self, value: f64) -> Option<VitalsTransition> {
        if value.is_nan() {
            return None;
        }
        self.apply(value)
    }

    /// Refill to max.
    pub fn fill(&mut self) -> Option<VitalsTransition> {
        self.apply(self.config.max)
    }

    fn apply(&mut self, value: f64) -> Option<VitalsTransition> {
        self.current = value.clamp(0.0, self.config.max);
        let warning = self.is_warning();
        match (warning, self.has_warned) {
            (true, false) => {
                self.has_warned = true;
                tracing::info!(vital = %self.kind, value = self.current, "vital low");
                Some(VitalsTransition::WarningRaised)
            }
            (false, true) => {
                self.has_warned = false;
                tracing::debug!(vital = %self.kind, value = self.current, "vital recovered");
                Some(VitalsTransition::WarningCleared)
            }
            _ => None,
        }
    }

    /// Which vital this is.
    pub fn kind(&self) -> VitalKind {
        self.kind
    }

    /// Current value.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Upper bound.
    pub fn max(&self) -> f64 {
        self.config.max
    }

    /// `current / max`, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.current / self.config.max
    }

    /// Whether the value is at or below the warning threshold.
    pub fn is_warning(&self) -> bool {
        self.current <= self.config.warning_threshold
    }

    /// Whether the value is zero.
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// The configuration in use.
    pub fn config(&self) -> &VitalsConfig {
        &self.config
    }
}

/// Horizontal movement below this distance between samples counts as idle.
pub const MOTION_EPSILON: f64 = 0.01;

/// Samples the player's position each frame and reports whether it moved.
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    last: Option<DVec3>,
}

impl MotionTracker {
    /// Create a tracker with no previous sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `position` and report whether it moved horizontally since the
    /// previous sample. The first sample is always idle.
    pub fn sample(&mut self, position: DVec3) -> bool {
        let moved = self
            .last
            .is_some_and(|last| horizontal_distance(last, position) > MOTION_EPSILON);
        self.last = Some(position);
        moved
    }

    /// Forget the previous sample (e.g. after a teleport).
    pub fn reset(&mut self) {
        self.last = None;
    }
}
