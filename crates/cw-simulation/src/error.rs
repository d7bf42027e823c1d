use cw_core::{CoreError, EntityId};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by the simulation crate.
///
/// Configuration errors disable the subsystem that raised them; none of
/// these variants is fatal to the rest of the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A handle did not refer to a live entity.
    #[error("entity not found in simulation: {0}")]
    EntityNotFound(EntityId),

    /// The injected player handle is not alive in the world.
    #[error("no player entity in the world")]
    MissingPlayer,

    /// A spawner was configured without any entity templates.
    #[error("spawner '{spawner}' has no templates to spawn")]
    NoTemplates {
        /// Name of the spawner.
        spawner: String,
    },

    /// A configuration value is out of range.
    #[error("invalid {component} config: {reason}")]
    InvalidConfig {
        /// Which component rejected the value (e.g. "clock", "spawner 'coconuts'").
        component: String,
        /// Human-readable reason.
        reason: String,
    },

    /// `set_day` was asked for a day outside `1..=max_days`.
    #[error("day {day} is outside 1..={max_days}")]
    InvalidDay {
        /// The requested day.
        day: u32,
        /// The last playable day.
        max_days: u32,
    },

    /// A configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An error bubbled up from the world table.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SimError {
    /// Shorthand for [`SimError::InvalidConfig`].
    pub fn invalid_config(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            component: component.into(),
            reason: reason.into(),
        }
    }
}
