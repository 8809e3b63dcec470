//! Simulation clock for the nested hour/sub-hour time loop.
//!
//! The clock is the single source of truth for simulated time. It counts
//! sub-hour ticks, derives completed hours from the tick count and the
//! configured step length, and carries the calendar timestamp that the
//! climate backends key their time-of-day behavior on.
//!
//! # Design Principles
//!
//! - Tick and hour counters use checked arithmetic (no silent overflow).
//! - Hours are derived from ticks: an hour completes exactly when the tick
//!   counter reaches a multiple of `ticks_per_hour`.
//! - The timestamp only moves at hour boundaries, so every tick inside an
//!   hour observes the same time of day.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use orchard_types::TimeOfDay;

/// Minutes in one simulated hour.
const MINUTES_PER_HOUR: u32 = 60;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick or hour counter would overflow.
    #[error("clock counter overflow")]
    CounterOverflow,

    /// The calendar timestamp cannot advance any further.
    #[error("timestamp {timestamp} cannot advance by one hour")]
    TimestampOverflow {
        /// The timestamp that failed to advance.
        timestamp: NaiveDateTime,
    },

    /// Invalid step configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Clock tracking ticks, hours, and the calendar timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    /// Sub-hour ticks completed since the start of the run.
    tick: u64,
    /// Hours completed since the start of the run.
    hour: u64,
    /// Length of one tick in minutes.
    time_step_minutes: u32,
    /// Ticks in one hour (`60 / time_step_minutes`).
    ticks_per_hour: u32,
    /// Calendar timestamp at the start of the run.
    start: NaiveDateTime,
    /// Calendar timestamp of the current hour.
    now: NaiveDateTime,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] unless `time_step_minutes` is
    /// in `1..=60` and divides 60 evenly.
    pub fn new(time_step_minutes: u32, start: NaiveDateTime) -> Result<Self, ClockError> {
        let ticks_per_hour = ticks_per_hour(time_step_minutes)?;
        Ok(Self {
            tick: 0,
            hour: 0,
            time_step_minutes,
            ticks_per_hour,
            start,
            now: start,
        })
    }

    /// Advance by one tick.
    ///
    /// Returns `true` when this tick completed an hour, in which case the
    /// hour counter and timestamp have moved forward as well.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::CounterOverflow`] or
    /// [`ClockError::TimestampOverflow`] at the end of representable time.
    pub fn advance(&mut self) -> Result<bool, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::CounterOverflow)?;
        let within = self
            .tick
            .checked_rem(u64::from(self.ticks_per_hour))
            .ok_or(ClockError::CounterOverflow)?;
        if within != 0 {
            return Ok(false);
        }
        self.hour = self.hour.checked_add(1).ok_or(ClockError::CounterOverflow)?;
        self.now = self
            .now
            .checked_add_signed(TimeDelta::hours(1))
            .ok_or(ClockError::TimestampOverflow {
                timestamp: self.now,
            })?;
        Ok(true)
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Hours completed so far.
    pub const fn hour(&self) -> u64 {
        self.hour
    }

    /// Ticks in one hour.
    pub const fn ticks_per_hour(&self) -> u32 {
        self.ticks_per_hour
    }

    /// Length of one tick in minutes.
    pub const fn time_step_minutes(&self) -> u32 {
        self.time_step_minutes
    }

    /// Index of the current tick within its hour (0-based).
    pub fn tick_within_hour(&self) -> u32 {
        let within = self.tick.checked_rem(u64::from(self.ticks_per_hour)).unwrap_or(0);
        u32::try_from(within).unwrap_or(0)
    }

    /// Calendar timestamp at the start of the run.
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Calendar timestamp of the current hour.
    pub const fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Hour of day (0--23) of the current hour.
    pub fn hour_of_day(&self) -> u32 {
        self.now.hour()
    }

    /// Time-of-day period of the current hour.
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.hour_of_day())
    }
}

/// Ticks per hour for a step length, validating that it divides 60.
fn ticks_per_hour(time_step_minutes: u32) -> Result<u32, ClockError> {
    if time_step_minutes == 0 || time_step_minutes > MINUTES_PER_HOUR {
        return Err(ClockError::InvalidConfig {
            reason: format!("time_step_minutes must be in 1..=60, got {time_step_minutes}"),
        });
    }
    if MINUTES_PER_HOUR.checked_rem(time_step_minutes) != Some(0) {
        return Err(ClockError::InvalidConfig {
            reason: format!("time_step_minutes {time_step_minutes} does not divide 60"),
        });
    }
    MINUTES_PER_HOUR
        .checked_div(time_step_minutes)
        .ok_or_else(|| ClockError::InvalidConfig {
            reason: "time_step_minutes is zero".to_owned(),
        })
}
