//! Hourly climate forecasting.
//!
//! The engine consults a [`ClimateForecaster`] once per simulated hour per
//! quantity. It hands over the most recent `sequence_length` hourly records
//! and receives the next record, already inverse-transformed back into
//! physical units. The engine treats the forecaster as an opaque call:
//! any error aborts the run.
//!
//! Two forecasters ship with the crate:
//!
//! - [`ReplayForecaster`] -- returns the recorded next hour from a
//!   [`ClimateHistory`], advancing a cursor from the starting index.
//! - [`TrendForecaster`] -- normalises the window per sensor with a
//!   [`MinMaxScaler`], extends the mean hourly trend, and maps back.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use orchard_types::{HourlyRecord, Quantity};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// A source of next-hour climate readings.
pub trait ClimateForecaster {
    /// Forecast the record following `window` for `quantity`.
    ///
    /// `window` holds the most recent hourly records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if the forecaster is unavailable or the
    /// window cannot be used.
    fn forecast(
        &mut self,
        quantity: Quantity,
        window: &[HourlyRecord],
    ) -> Result<HourlyRecord, ForecastError>;
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Recorded hourly sensor series for both quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateHistory {
    /// Temperature records, oldest first.
    pub temperature: Vec<HourlyRecord>,
    /// Humidity records, oldest first.
    pub humidity: Vec<HourlyRecord>,
}

impl ClimateHistory {
    /// Create a history from two series.
    pub const fn new(temperature: Vec<HourlyRecord>, humidity: Vec<HourlyRecord>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// The series for one quantity.
    pub fn series(&self, quantity: Quantity) -> &[HourlyRecord] {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
        }
    }

    /// The `sequence_length` records immediately before `starting_index`.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::WindowTooShort`] if `starting_index` is smaller
    ///   than `sequence_length` or `sequence_length` is zero.
    /// - [`ForecastError::HistoryExhausted`] if `starting_index` lies past
    ///   the end of the series.
    pub fn window(
        &self,
        quantity: Quantity,
        starting_index: usize,
        sequence_length: usize,
    ) -> Result<Vec<HourlyRecord>, ForecastError> {
        if sequence_length == 0 || starting_index < sequence_length {
            return Err(ForecastError::WindowTooShort {
                required: sequence_length.max(1),
                actual: starting_index,
            });
        }
        let series = self.series(quantity);
        let start = starting_index.saturating_sub(sequence_length);
        series
            .get(start..starting_index)
            .map(<[HourlyRecord]>::to_vec)
            .ok_or(ForecastError::HistoryExhausted {
                quantity,
                index: starting_index,
            })
    }

    /// Generate a smooth synthetic history with a daily cycle.
    ///
    /// Temperature peaks at 14:00 with a +/-5 degree swing around each
    /// sensor's base value; humidity moves opposite with a +/-15 point
    /// swing, clamped to 0--100.
    pub fn synthetic(
        start: NaiveDateTime,
        hours: usize,
        base_temperature: &[f64],
        base_humidity: &[f64],
    ) -> Self {
        let mut temperature = Vec::with_capacity(hours);
        let mut humidity = Vec::with_capacity(hours);
        let mut timestamp = start;
        for _ in 0..hours {
            let phase = (f64::from(timestamp.hour()) - 14.0) / 24.0 * std::f64::consts::TAU;
            let cycle = phase.cos();
            temperature.push(HourlyRecord::new(
                timestamp,
                base_temperature.iter().map(|t| t + 5.0 * cycle).collect(),
            ));
            humidity.push(HourlyRecord::new(
                timestamp,
                base_humidity
                    .iter()
                    .map(|h| (h - 15.0 * cycle).clamp(0.0, 100.0))
                    .collect(),
            ));
            match next_hour(timestamp) {
                Ok(next) => timestamp = next,
                Err(_) => break,
            }
        }
        Self {
            temperature,
            humidity,
        }
    }
}

/// Advance a timestamp by one hour.
///
/// # Errors
///
/// Returns [`ForecastError::MalformedWindow`] if the calendar overflows.
pub fn next_hour(timestamp: NaiveDateTime) -> Result<NaiveDateTime, ForecastError> {
    timestamp
        .checked_add_signed(TimeDelta::hours(1))
        .ok_or_else(|| ForecastError::MalformedWindow {
            reason: format!("timestamp {timestamp} cannot advance by one hour"),
        })
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// Forecaster that replays a recorded history.
///
/// Each call returns the record at the quantity's cursor and advances it,
/// so the first forecast after a window ending at `starting_index - 1` is
/// the record at `starting_index`.
#[derive(Debug, Clone)]
pub struct ReplayForecaster {
    /// The recorded series.
    history: ClimateHistory,
    /// Next index to return, per quantity.
    cursors: BTreeMap<Quantity, usize>,
}

impl ReplayForecaster {
    /// Create a replay forecaster positioned at `starting_index`.
    pub fn new(history: ClimateHistory, starting_index: usize) -> Self {
        let cursors = Quantity::ALL
            .iter()
            .map(|&q| (q, starting_index))
            .collect();
        Self { history, cursors }
    }

    /// The next index that will be replayed for `quantity`.
    pub fn cursor(&self, quantity: Quantity) -> usize {
        self.cursors.get(&quantity).copied().unwrap_or(0)
    }
}

impl ClimateForecaster for ReplayForecaster {
    fn forecast(
        &mut self,
        quantity: Quantity,
        _window: &[HourlyRecord],
    ) -> Result<HourlyRecord, ForecastError> {
        let index = self.cursor(quantity);
        let record = self
            .history
            .series(quantity)
            .get(index)
            .cloned()
            .ok_or(ForecastError::HistoryExhausted { quantity, index })?;
        self.cursors.insert(quantity, index.saturating_add(1));
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Per-sensor min-max normaliser.
///
/// Maps each sensor column into `[0, 1]` using the minimum and maximum
/// seen while fitting. A constant column maps to `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    /// Column minimums.
    min: Vec<f64>,
    /// Column maximums.
    max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit the scaler to a window of records.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::MalformedWindow`] if the window is empty,
    /// ragged, or contains non-finite values.
    pub fn fit(window: &[HourlyRecord]) -> Result<Self, ForecastError> {
        let columns = validate_window(window)?;
        let mut min = vec![f64::INFINITY; columns];
        let mut max = vec![f64::NEG_INFINITY; columns];
        for record in window {
            for ((lo, hi), &v) in min.iter_mut().zip(max.iter_mut()).zip(&record.values) {
                *lo = lo.min(v);
                *hi = hi.max(v);
            }
        }
        Ok(Self { min, max })
    }

    /// Number of columns the scaler was fitted on.
    pub fn columns(&self) -> usize {
        self.min.len()
    }

    /// Normalise a row.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&lo, &hi))| {
                let range = hi - lo;
                if range > 0.0 { (v - lo) / range } else { 0.0 }
            })
            .collect()
    }

    /// Map a normalised row back into physical units.
    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&lo, &hi))| v.mul_add(hi - lo, lo))
            .collect()
    }
}

/// Check that a window is non-empty, rectangular, and finite. Returns the
/// column count.
fn validate_window(window: &[HourlyRecord]) -> Result<usize, ForecastError> {
    let first = window.first().ok_or_else(|| ForecastError::MalformedWindow {
        reason: "window is empty".to_owned(),
    })?;
    let columns = first.sensor_count();
    if columns == 0 {
        return Err(ForecastError::MalformedWindow {
            reason: "records carry no sensor values".to_owned(),
        });
    }
    for record in window {
        if record.sensor_count() != columns {
            return Err(ForecastError::MalformedWindow {
                reason: format!(
                    "record at {} has {} values, expected {columns}",
                    record.timestamp,
                    record.sensor_count()
                ),
            });
        }
        if !record.is_finite() {
            return Err(ForecastError::MalformedWindow {
                reason: format!("record at {} has non-finite values", record.timestamp),
            });
        }
    }
    Ok(columns)
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Forecaster that extends the recent hourly trend.
///
/// The window is normalised per sensor, the mean hourly change across the
/// window is damped and added to the last normalised row, the result is
/// clamped to `[0, 1]` and mapped back to physical units. Clamping keeps
/// every forecast within the range observed in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendForecaster {
    /// Fraction of the mean hourly change carried into the forecast.
    damping: f64,
}

impl TrendForecaster {
    /// Default damping applied to the trend.
    pub const DEFAULT_DAMPING: f64 = 0.5;

    /// Create a trend forecaster. `damping` is clamped to `[0, 1]`.
    pub fn new(damping: f64) -> Self {
        Self {
            damping: damping.clamp(0.0, 1.0),
        }
    }
}

impl Default for TrendForecaster {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAMPING)
    }
}

impl ClimateForecaster for TrendForecaster {
    fn forecast(
        &mut self,
        _quantity: Quantity,
        window: &[HourlyRecord],
    ) -> Result<HourlyRecord, ForecastError> {
        if window.len() < 2 {
            return Err(ForecastError::WindowTooShort {
                required: 2,
                actual: window.len(),
            });
        }
        let scaler = MinMaxScaler::fit(window)?;
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return Err(ForecastError::WindowTooShort {
                required: 2,
                actual: window.len(),
            });
        };

        let first_norm = scaler.transform(&first.values);
        let last_norm = scaler.transform(&last.values);
        let steps = u32::try_from(window.len().saturating_sub(1)).unwrap_or(u32::MAX);
        let steps = f64::from(steps);

        let next_norm: Vec<f64> = first_norm
            .iter()
            .zip(&last_norm)
            .map(|(&a, &b)| {
                let slope = (b - a) / steps;
                self.damping.mul_add(slope, b).clamp(0.0, 1.0)
            })
            .collect();

        Ok(HourlyRecord::new(
            next_hour(last.timestamp)?,
            scaler.inverse_transform(&next_norm),
        ))
    }
}
