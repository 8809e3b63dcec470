//! Climate quantities, time-of-day phases, and hourly sensor records.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// A scalar quantity carried by the climate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity in percent (0--100).
    Humidity,
}

impl Quantity {
    /// Both quantities, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Temperature, Self::Humidity];
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
        }
    }
}

/// Coarse phase of the day used by the diurnal climate backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 06:00 -- 11:59.
    Morning,
    /// 12:00 -- 17:59.
    Afternoon,
    /// 18:00 -- 21:59.
    Evening,
    /// 22:00 -- 05:59.
    Night,
}

impl TimeOfDay {
    /// Map an hour of the day (0--23, wrapped if larger) to its phase.
    pub const fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// One hour of readings for a single quantity across every sensor.
///
/// `values` holds one reading per sensor, in sensor order. The timestamp
/// carries the calendar hour the readings belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Calendar hour of the readings.
    pub timestamp: NaiveDateTime,
    /// One reading per sensor.
    pub values: Vec<f64>,
}

impl HourlyRecord {
    /// Create a record.
    pub const fn new(timestamp: NaiveDateTime, values: Vec<f64>) -> Self {
        Self { timestamp, values }
    }

    /// Hour of day of the timestamp.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Number of sensor readings.
    pub fn sensor_count(&self) -> usize {
        self.values.len()
    }

    /// Whether every reading is a finite number.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// A sparse point sample of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Where the sample was taken.
    pub position: Position,
    /// The sampled value.
    pub value: f64,
}

impl Observation {
    /// Create an observation.
    pub const fn new(position: Position, value: f64) -> Self {
        Self { position, value }
    }
}
