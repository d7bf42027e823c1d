use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Longest session the clock accepts, in days.
pub const MAX_DAYS_LIMIT: u32 = 10_000;

/// Configuration for the day/night clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one full day + night cycle, in seconds.
    pub cycle_duration: f64,
    /// Last playable day. Crossing into `max_days + 1` ends the game.
    pub max_days: u32,
    /// Optional narrative line attached to a day's specific event.
    pub day_messages: BTreeMap<u32, String>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            cycle_duration: 120.0,
            max_days: 4,
            day_messages: BTreeMap::new(),
        }
    }
}

impl ClockConfig {
    /// Set the cycle length in seconds.
    pub fn with_cycle_duration(mut self, seconds: f64) -> Self {
        self.cycle_duration = seconds;
        self
    }

    /// Set the last playable day.
    pub fn with_max_days(mut self, days: u32) -> Self {
        self.max_days = days;
        self
    }

    /// Attach a message to a day's specific event.
    pub fn with_day_message(mut self, day: u32, message: impl Into<String>) -> Self {
        self.day_messages.insert(day, message.into());
        self
    }

    /// Reject non-positive cycle lengths and a day budget outside
    /// `1..=MAX_DAYS_LIMIT`.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.cycle_duration.is_finite() && self.cycle_duration > 0.0) {
            return Err(SimError::invalid_config(
                "clock",
                format!("cycle_duration must be positive, got {}", self.cycle_duration),
            ));
        }
        if self.max_days == 0 {
            return Err(SimError::invalid_config("clock", "max_days must be at least 1"));
        }
        if self.max_days > MAX_DAYS_LIMIT {
            return Err(SimError::invalid_config(
                "clock",
                format!("max_days must be at most {MAX_DAYS_LIMIT}, got {}", self.max_days),
            ));
        }
        Ok(())
    }
}

/// Half of the cycle the clock is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// First half of the cycle.
    Day,
    /// Second half of the cycle.
    Night,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Night => write!(f, "night"),
        }
    }
}

/// Coarse label for the position within a cycle, as shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// Progress in `[0, 0.25)`.
    Morning,
    /// Progress in `[0.25, 0.5)`.
    Afternoon,
    /// Progress in `[0.5, 0.75)`.
    Evening,
    /// Progress in `[0.75, 1)`.
    Night,
}

impl TimeOfDay {
    /// Label for a normalized cycle position.
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.25 {
            Self::Morning
        } else if progress < 0.5 {
            Self::Afternoon
        } else if progress < 0.75 {
            Self::Evening
        } else {
            Self::Night
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => write!(f, "Morning"),
            Self::Afternoon => write!(f, "Afternoon"),
            Self::Evening => write!(f, "Evening"),
            Self::Night => write!(f, "Night"),
        }
    }
}

/// Notifications produced by the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// A new day began.
    DayStarted(u32),
    /// The day's one-time specific event. Fires at most once per day.
    DaySpecific(u32),
    /// The cycle crossed between day and night.
    PhaseChanged {
        /// Day the crossing happened on.
        day: u32,
        /// Whether it is night after the crossing.
        is_night: bool,
    },
    /// The last playable day is over. Fires exactly once.
    GameComplete {
        /// Number of days survived.
        days: u32,
    },
}

/// Day/night clock: elapsed seconds, derived day number and phase.
///
/// `Running` until the elapsed time passes the end of `max_days`, then
/// `Ended` for good; every operation is a no-op once ended.
#[derive(Debug, Clone)]
pub struct DayNightClock {
    config: ClockConfig,
    elapsed: f64,
    current_day: u32,
    fired: BTreeSet<u32>,
    started: bool,
    ended: bool,
    was_night: bool,
}

impl DayNightClock {
    /// Create a clock at the start of day 1.
    pub fn new(config: ClockConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            elapsed: 0.0,
            current_day: 1,
            fired: BTreeSet::new(),
            started: false,
            ended: false,
            was_night: false,
        })
    }

    /// Announce day 1. Only the first call emits anything.
    pub fn begin(&mut self) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.started || self.ended {
            return events;
        }
        self.started = true;
        tracing::info!(day = self.current_day, "day started");
        events.push(ClockEvent::DayStarted(self.current_day));
        self.fire_specific(self.current_day, &mut events);
        events
    }

    /// Advance by `delta` seconds and report what happened.
    ///
    /// A tick that skips several day boundaries reports every skipped day in
    /// order, so no day's specific event is lost.
    pub fn tick(&mut self, delta: f64) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.ended || !delta.is_finite() || delta <= 0.0 {
            return events;
        }

        self.elapsed += delta;
        let new_day = self.day_for(self.elapsed);
        let max_days = self.config.max_days;

        for day in (self.current_day + 1)..=new_day.min(max_days) {
            self.current_day = day;
            tracing::info!(day, "day started");
            events.push(ClockEvent::DayStarted(day));
            self.fire_specific(day, &mut events);
        }

        if new_day > max_days {
            self.current_day = max_days + 1;
            self.ended = true;
            tracing::info!(days = max_days, "game complete");
            events.push(ClockEvent::GameComplete { days: max_days });
            return events;
        }

        self.push_phase_change(&mut events);
        events
    }

    /// Jump to the start of `day`. Fires that day's specific event if it
    /// has not fired yet. Intended for debug entry points.
    pub fn set_day(&mut self, day: u32) -> SimResult<Vec<ClockEvent>> {
        let max_days = self.config.max_days;
        if day == 0 || day > max_days {
            return Err(SimError::InvalidDay { day, max_days });
        }
        let mut events = Vec::new();
        if self.ended {
            tracing::warn!(day, "set_day ignored: clock has ended");
            return Ok(events);
        }
        self.elapsed = f64::from(day - 1) * self.config.cycle_duration;
        self.current_day = day;
        self.fire_specific(day, &mut events);
        self.push_phase_change(&mut events);
        Ok(events)
    }

    /// Move within the current day's cycle. `normalized` is clamped to `[0, 1)`.
    pub fn set_time_of_day(&mut self, normalized: f64) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }
        let position = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0 - 1e-9)
        };
        let cycle = self.config.cycle_duration;
        self.elapsed = f64::from(self.current_day - 1) * cycle + position * cycle;
        self.push_phase_change(&mut events);
        events
    }

    fn day_for(&self, elapsed: f64) -> u32 {
        let day = (elapsed / self.config.cycle_duration).floor() + 1.0;
        // Anything past max_days + 1 is equivalent for the state machine.
        let cap = f64::from(self.config.max_days) + 1.0;
        day.min(cap) as u32
    }

    fn fire_specific(&mut self, day: u32, events: &mut Vec<ClockEvent>) {
        if self.fired.insert(day) {
            events.push(ClockEvent::DaySpecific(day));
        }
    }

    fn push_phase_change(&mut self, events: &mut Vec<ClockEvent>) {
        let is_night = self.is_night();
        if is_night != self.was_night {
            self.was_night = is_night;
            tracing::debug!(day = self.current_day, is_night, "phase changed");
            events.push(ClockEvent::PhaseChanged {
                day: self.current_day,
                is_night,
            });
        }
    }

    /// Total elapsed seconds. Frozen once the clock has ended.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Current day, starting at 1. Equals `max_days + 1` once ended.
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    /// Last playable day.
    pub fn max_days(&self) -> u32 {
        self.config.max_days
    }

    /// Length of one cycle in seconds.
    pub fn cycle_duration(&self) -> f64 {
        self.config.cycle_duration
    }

    /// Position within the current cycle, in `[0, 1)`.
    pub fn cycle_progress(&self) -> f64 {
        let cycle = self.config.cycle_duration;
        let progress = self.elapsed.rem_euclid(cycle) / cycle;
        if progress >= 1.0 { 0.0 } else { progress }
    }

    /// Whether the second half of the cycle is running.
    pub fn is_night(&self) -> bool {
        self.cycle_progress() >= 0.5
    }

    /// Current [`Phase`].
    pub fn phase(&self) -> Phase {
        if self.is_night() {
            Phase::Night
        } else {
            Phase::Day
        }
    }

    /// Current HUD label.
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_progress(self.cycle_progress())
    }

    /// Whether the game is complete. Never reverts to false.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether the given day's specific event already fired.
    pub fn has_fired(&self, day: u32) -> bool {
        self.fired.contains(&day)
    }

    /// The configured message for `day`, if any.
    pub fn day_message(&self, day: u32) -> Option<&str> {
        self.config.day_messages.get(&day).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(cycle: f64, max_days: u32) -> DayNightClock {
        DayNightClock::new(
            ClockConfig::default()
                .with_cycle_duration(cycle)
                .with_max_days(max_days),
        )
        .unwrap()
    }

    #[test]
    fn clock_initial_state() {
        let clock = clock(120.0, 4);
        assert_eq!(clock.current_day(), 1);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_night());
        assert!(!clock.is_ended());
        assert_eq!(clock.time_of_day(), TimeOfDay::Morning);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(DayNightClock::new(ClockConfig::default().with_cycle_duration(0.0)).is_err());
        assert!(DayNightClock::new(ClockConfig::default().with_cycle_duration(f64::NAN)).is_err());
        assert!(DayNightClock::new(ClockConfig::default().with_max_days(0)).is_err());
        assert!(DayNightClock::new(ClockConfig::default().with_max_days(u32::MAX)).is_err());
        assert!(DayNightClock::new(ClockConfig::default().with_max_days(MAX_DAYS_LIMIT)).is_ok());
    }

    #[test]
    fn begin_is_idempotent() {
        let mut clock = clock(120.0, 4);
        assert_eq!(
            clock.begin(),
            vec![ClockEvent::DayStarted(1), ClockEvent::DaySpecific(1)]
        );
        assert!(clock.begin().is_empty());
    }

    #[test]
    fn night_is_second_half() {
        let mut clock = clock(120.0, 4);
        clock.tick(59.0);
        assert!(!clock.is_night());
        let events = clock.tick(1.0);
        assert!(clock.is_night());
        assert_eq!(
            events,
            vec![ClockEvent::PhaseChanged {
                day: 1,
                is_night: true
            }]
        );
        assert_eq!(clock.time_of_day(), TimeOfDay::Evening);
    }

    #[test]
    fn single_day_advance() {
        let mut clock = clock(120.0, 4);
        clock.tick(119.0);
        let events = clock.tick(2.0);
        assert_eq!(clock.current_day(), 2);
        assert!(events.contains(&ClockEvent::DayStarted(2)));
        assert!(events.contains(&ClockEvent::DaySpecific(2)));
        assert!(events.contains(&ClockEvent::PhaseChanged {
            day: 2,
            is_night: false
        }));
    }

    #[test]
    fn large_tick_fires_every_skipped_day_in_order() {
        let mut clock = clock(120.0, 10);
        let events = clock.tick(120.0 * 3.0 + 1.0);
        assert_eq!(clock.current_day(), 4);
        let starts: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                ClockEvent::DayStarted(d) => Some(*d),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![2, 3, 4]);
        assert!(clock.has_fired(2) && clock.has_fired(3) && clock.has_fired(4));
    }

    #[test]
    fn game_ends_after_max_days() {
        let mut clock = clock(120.0, 4);
        clock.begin();
        let events = clock.tick(500.0);
        assert_eq!(clock.current_day(), 5);
        assert!(clock.is_ended());
        assert_eq!(events.last(), Some(&ClockEvent::GameComplete { days: 4 }));
        assert!(!events.contains(&ClockEvent::DayStarted(5)));

        let frozen = clock.elapsed();
        assert!(clock.tick(1000.0).is_empty());
        assert_eq!(clock.current_day(), 5);
        assert_eq!(clock.elapsed(), frozen);
    }

    #[test]
    fn non_positive_delta_is_ignored() {
        let mut clock = clock(120.0, 4);
        assert!(clock.tick(0.0).is_empty());
        assert!(clock.tick(-5.0).is_empty());
        assert!(clock.tick(f64::INFINITY).is_empty());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn set_day_fires_specific_once() {
        let mut clock = clock(120.0, 4);
        let events = clock.set_day(3).unwrap();
        assert_eq!(events, vec![ClockEvent::DaySpecific(3)]);
        assert_eq!(clock.current_day(), 3);
        assert!((clock.elapsed() - 240.0).abs() < f64::EPSILON);
        assert!(clock.set_day(3).unwrap().is_empty());
    }

    #[test]
    fn set_day_out_of_range() {
        let mut clock = clock(120.0, 4);
        assert!(matches!(
            clock.set_day(0),
            Err(SimError::InvalidDay { day: 0, max_days: 4 })
        ));
        assert!(clock.set_day(5).is_err());
    }

    #[test]
    fn ticking_after_set_day_does_not_refire() {
        let mut clock = clock(120.0, 4);
        clock.set_day(2).unwrap();
        let events = clock.tick(120.0);
        assert!(events.contains(&ClockEvent::DayStarted(3)));
        assert!(events.contains(&ClockEvent::DaySpecific(3)));
        let refired = events
            .iter()
            .filter(|e| **e == ClockEvent::DaySpecific(2))
            .count();
        assert_eq!(refired, 0);
    }

    #[test]
    fn set_time_of_day_stays_within_day() {
        let mut clock = clock(120.0, 4);
        clock.set_day(2).unwrap();
        let events = clock.set_time_of_day(0.8);
        assert_eq!(clock.current_day(), 2);
        assert!(clock.is_night());
        assert_eq!(
            events,
            vec![ClockEvent::PhaseChanged {
                day: 2,
                is_night: true
            }]
        );
        clock.set_time_of_day(7.0);
        assert_eq!(clock.current_day(), 2);
        assert!(clock.cycle_progress() < 1.0);
    }

    #[test]
    fn time_of_day_labels() {
        assert_eq!(TimeOfDay::from_progress(0.1), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_progress(0.3), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_progress(0.6), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_progress(0.9), TimeOfDay::Night);
        assert_eq!(TimeOfDay::Evening.to_string(), "Evening");
    }

    #[test]
    fn day_messages_are_looked_up() {
        let clock = DayNightClock::new(
            ClockConfig::default().with_day_message(3, "The tide turns."),
        )
        .unwrap();
        assert_eq!(clock.day_message(3), Some("The tide turns."));
        assert_eq!(clock.day_message(2), None);
    }
}
