//! Climate state read by the agents.
//!
//! A [`ClimateField`] pairs the temperature and humidity grids built from
//! the same sensor network. A [`ClimateModel`] owns the current field and
//! refreshes it exactly once per simulated hour through one of two
//! backends chosen at construction:
//!
//! - **Diurnal** -- rescales the base field by a time-of-day factor. The
//!   factor is always applied to the base field, so repeated refreshes
//!   never compound.
//! - **Forecast** -- keeps a rolling window of hourly records per quantity,
//!   asks a [`ClimateForecaster`] for the next record, and rebuilds the
//!   field from the new sensor readings.
//!
//! Within an hour the field is read-only: agents query it, nothing else
//! mutates it.

use std::collections::{BTreeMap, VecDeque};

use orchard_types::{HourlyRecord, Observation, Position, Quantity, SensorId, TimeOfDay};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::WorldError;
use crate::field::SpatialField;
use crate::forecast::ClimateForecaster;

/// A fixed climate sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Sensor identifier (index in the sensor list).
    pub id: SensorId,
    /// Where the sensor stands.
    pub position: Position,
}

impl Sensor {
    /// Build sensors from positions, numbering them in order.
    pub fn from_positions(positions: &[Position]) -> Vec<Self> {
        positions
            .iter()
            .zip(0_u32..)
            .map(|(&position, raw)| Self {
                id: SensorId::new(raw),
                position,
            })
            .collect()
    }
}

/// Current readings at one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Which sensor.
    pub sensor: SensorId,
    /// Where the sensor stands.
    pub position: Position,
    /// Current temperature reading in degrees Celsius.
    pub temperature: f64,
    /// Current humidity reading in percent.
    pub humidity: f64,
}

// ---------------------------------------------------------------------------
// Climate field
// ---------------------------------------------------------------------------

/// Temperature and humidity grids over the same domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateField {
    /// The sensors both grids were built from, in reading order.
    sensors: Vec<Sensor>,
    /// Temperature grid.
    temperature: SpatialField,
    /// Humidity grid.
    humidity: SpatialField,
}

impl ClimateField {
    /// Build both grids from one reading per sensor.
    ///
    /// # Errors
    ///
    /// - [`WorldError::EmptyObservations`] if there are no sensors.
    /// - [`WorldError::SensorCountMismatch`] if a reading vector does not
    ///   have exactly one value per sensor.
    /// - Any error from [`SpatialField::build`].
    pub fn from_readings(
        sensors: &[Sensor],
        temperature: &[f64],
        humidity: &[f64],
        width: u32,
        height: u32,
        power: f64,
    ) -> Result<Self, WorldError> {
        if sensors.is_empty() {
            return Err(WorldError::EmptyObservations);
        }
        let temperature =
            build_quantity(Quantity::Temperature, sensors, temperature, width, height, power)?;
        let humidity =
            build_quantity(Quantity::Humidity, sensors, humidity, width, height, power)?;
        Ok(Self {
            sensors: sensors.to_vec(),
            temperature,
            humidity,
        })
    }

    /// Point query for either quantity.
    pub fn value_at(&self, quantity: Quantity, x: f64, y: f64) -> f64 {
        self.field(quantity).value_at(x, y)
    }

    /// Temperature at a position.
    pub fn temperature_at(&self, position: Position) -> f64 {
        self.temperature.value_at_position(position)
    }

    /// Humidity at a position.
    pub fn humidity_at(&self, position: Position) -> f64 {
        self.humidity.value_at_position(position)
    }

    /// The grid for one quantity.
    pub const fn field(&self, quantity: Quantity) -> &SpatialField {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
        }
    }

    /// Whether a point lies inside the domain.
    pub fn contains(&self, position: Position) -> bool {
        self.temperature.contains(position)
    }

    /// Domain width in metres.
    pub const fn width(&self) -> u32 {
        self.temperature.width()
    }

    /// Domain height in metres.
    pub const fn height(&self) -> u32 {
        self.temperature.height()
    }

    /// The sensors this field was built from.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Current reading at every sensor.
    pub fn sensor_readings(&self) -> Vec<SensorReading> {
        self.sensors
            .iter()
            .zip(self.temperature.observations())
            .zip(self.humidity.observations())
            .map(|((sensor, t), h)| SensorReading {
                sensor: sensor.id,
                position: sensor.position,
                temperature: t.value,
                humidity: h.value,
            })
            .collect()
    }

    /// Apply per-quantity value transforms to both grids.
    #[must_use]
    pub fn map_values(
        &self,
        temperature: impl Fn(f64) -> f64,
        humidity: impl Fn(f64) -> f64,
    ) -> Self {
        Self {
            sensors: self.sensors.clone(),
            temperature: self.temperature.map_values(temperature),
            humidity: self.humidity.map_values(humidity),
        }
    }
}

/// Pair sensors with readings and build one grid.
fn build_quantity(
    quantity: Quantity,
    sensors: &[Sensor],
    readings: &[f64],
    width: u32,
    height: u32,
    power: f64,
) -> Result<SpatialField, WorldError> {
    if readings.len() != sensors.len() {
        return Err(WorldError::SensorCountMismatch {
            quantity,
            expected: sensors.len(),
            actual: readings.len(),
        });
    }
    let observations: Vec<Observation> = sensors
        .iter()
        .zip(readings)
        .map(|(s, &v)| Observation::new(s.position, v))
        .collect();
    SpatialField::build(quantity, &observations, width, height, power)
}

// ---------------------------------------------------------------------------
// Diurnal profile
// ---------------------------------------------------------------------------

/// Time-of-day multipliers for the diurnal backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiurnalProfile {
    /// Temperature factors: morning, afternoon, evening, night.
    pub temperature: [f64; 4],
    /// Humidity factors: morning, afternoon, evening, night.
    pub humidity: [f64; 4],
}

impl Default for DiurnalProfile {
    fn default() -> Self {
        Self {
            temperature: [1.0, 1.15, 0.95, 0.8],
            humidity: [1.0, 0.85, 1.05, 1.15],
        }
    }
}

impl DiurnalProfile {
    /// Whether every factor is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.temperature
            .iter()
            .chain(&self.humidity)
            .all(|f| f.is_finite() && *f >= 0.0)
    }

    /// Multiplier for a quantity at a time of day.
    pub const fn factor(&self, quantity: Quantity, time_of_day: TimeOfDay) -> f64 {
        let factors = match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
        };
        let [morning, afternoon, evening, night] = *factors;
        match time_of_day {
            TimeOfDay::Morning => morning,
            TimeOfDay::Afternoon => afternoon,
            TimeOfDay::Evening => evening,
            TimeOfDay::Night => night,
        }
    }

    /// Rescale a base field for the given hour of day.
    ///
    /// Humidity is clamped to 0--100 after scaling.
    pub fn apply(&self, base: &ClimateField, hour_of_day: u32) -> ClimateField {
        let tod = TimeOfDay::from_hour(hour_of_day);
        let t = self.factor(Quantity::Temperature, tod);
        let h = self.factor(Quantity::Humidity, tod);
        base.map_values(|v| v * t, |v| (v * h).clamp(0.0, 100.0))
    }
}

// ---------------------------------------------------------------------------
// Refresh backends
// ---------------------------------------------------------------------------

/// Rolling-window state for the forecast backend.
pub struct ForecastBackend {
    /// The external forecaster.
    forecaster: Box<dyn ClimateForecaster>,
    /// Most recent records per quantity, oldest first.
    windows: BTreeMap<Quantity, VecDeque<HourlyRecord>>,
    /// Window length handed to the forecaster.
    sequence_length: usize,
}

impl core::fmt::Debug for ForecastBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ForecastBackend")
            .field("windows", &self.windows)
            .field("sequence_length", &self.sequence_length)
            .finish_non_exhaustive()
    }
}

/// How the climate field is refreshed each hour.
#[derive(Debug)]
pub enum ClimateBackend {
    /// Deterministic time-of-day rescaling of the base field.
    Diurnal(DiurnalProfile),
    /// Next-hour readings from an external forecaster.
    Forecast(ForecastBackend),
}

/// The climate field plus its hourly refresh.
#[derive(Debug)]
pub struct ClimateModel {
    /// Refresh backend chosen at construction.
    backend: ClimateBackend,
    /// Field the diurnal backend rescales; the initial field otherwise.
    base: ClimateField,
    /// Field the agents read during the current hour.
    current: ClimateField,
    /// Number of refreshes applied so far.
    refreshes: u64,
}

impl ClimateModel {
    /// Create a model with the diurnal backend.
    ///
    /// The current field is the base field rescaled for `hour_of_day`.
    pub fn diurnal(base: ClimateField, profile: DiurnalProfile, hour_of_day: u32) -> Self {
        let current = profile.apply(&base, hour_of_day);
        Self {
            backend: ClimateBackend::Diurnal(profile),
            base,
            current,
            refreshes: 0,
        }
    }

    /// Create a model with the forecast backend.
    ///
    /// The initial field is built from the last record of each window.
    ///
    /// # Errors
    ///
    /// - [`WorldError::EmptyObservations`] if a window is empty or there
    ///   are no sensors.
    /// - [`WorldError::SensorCountMismatch`] if the last records do not
    ///   carry one value per sensor.
    pub fn forecast(
        sensors: &[Sensor],
        temperature_window: Vec<HourlyRecord>,
        humidity_window: Vec<HourlyRecord>,
        forecaster: Box<dyn ClimateForecaster>,
        width: u32,
        height: u32,
        power: f64,
    ) -> Result<Self, WorldError> {
        let sequence_length = temperature_window.len().max(humidity_window.len());
        let (Some(t_last), Some(h_last)) = (temperature_window.last(), humidity_window.last())
        else {
            return Err(WorldError::EmptyObservations);
        };
        let base = ClimateField::from_readings(
            sensors,
            &t_last.values,
            &h_last.values,
            width,
            height,
            power,
        )?;

        let mut windows = BTreeMap::new();
        windows.insert(Quantity::Temperature, VecDeque::from(temperature_window));
        windows.insert(Quantity::Humidity, VecDeque::from(humidity_window));

        Ok(Self {
            backend: ClimateBackend::Forecast(ForecastBackend {
                forecaster,
                windows,
                sequence_length,
            }),
            current: base.clone(),
            base,
            refreshes: 0,
        })
    }

    /// Refresh the field for a new simulated hour.
    ///
    /// Called by the engine exactly once per elapsed hour.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Forecast`] if the forecaster fails, or a
    /// field-construction error if it returns unusable readings.
    pub fn refresh(&mut self, hour_of_day: u32) -> Result<(), WorldError> {
        match &mut self.backend {
            ClimateBackend::Diurnal(profile) => {
                self.current = profile.apply(&self.base, hour_of_day);
            }
            ClimateBackend::Forecast(backend) => {
                // Both quantities are forecast before either window moves.
                let mut forecasts: Vec<(Quantity, HourlyRecord)> =
                    Vec::with_capacity(Quantity::ALL.len());
                for quantity in Quantity::ALL {
                    let window = backend.windows.entry(quantity).or_default();
                    let record = backend
                        .forecaster
                        .forecast(quantity, window.make_contiguous())?;
                    if !record.is_finite() {
                        warn!(
                            %quantity,
                            timestamp = %record.timestamp,
                            "Forecaster returned non-finite readings"
                        );
                        return Err(WorldError::NonFiniteObservation { quantity });
                    }
                    forecasts.push((quantity, record));
                }

                let readings = |quantity: Quantity| {
                    forecasts
                        .iter()
                        .find(|(q, _)| *q == quantity)
                        .map(|(_, record)| record.values.as_slice())
                        .unwrap_or_default()
                };
                let field = ClimateField::from_readings(
                    self.base.sensors(),
                    readings(Quantity::Temperature),
                    readings(Quantity::Humidity),
                    self.base.width(),
                    self.base.height(),
                    self.base.temperature.power(),
                )?;

                for (quantity, record) in forecasts {
                    let window = backend.windows.entry(quantity).or_default();
                    window.push_back(record);
                    while window.len() > backend.sequence_length {
                        window.pop_front();
                    }
                }
                self.current = field;
            }
        }
        self.refreshes = self.refreshes.saturating_add(1);
        debug!(
            hour_of_day,
            refreshes = self.refreshes,
            min_temperature = self.current.temperature.min(),
            max_temperature = self.current.temperature.max(),
            "Climate field refreshed"
        );
        Ok(())
    }

    /// The field agents read during the current hour.
    pub const fn current(&self) -> &ClimateField {
        &self.current
    }

    /// Number of refreshes applied so far.
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Whether the model uses the forecast backend.
    pub const fn is_forecast(&self) -> bool {
        matches!(self.backend, ClimateBackend::Forecast(_))
    }

    /// Most recent record in a quantity's window (forecast backend only).
    pub fn latest_record(&self, quantity: Quantity) -> Option<&HourlyRecord> {
        match &self.backend {
            ClimateBackend::Diurnal(_) => None,
            ClimateBackend::Forecast(backend) => {
                backend.windows.get(&quantity).and_then(VecDeque::back)
            }
        }
    }

    /// Current window length for a quantity (forecast backend only).
    pub fn window_len(&self, quantity: Quantity) -> usize {
        match &self.backend {
            ClimateBackend::Diurnal(_) => 0,
            ClimateBackend::Forecast(backend) => {
                backend.windows.get(&quantity).map_or(0, VecDeque::len)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::error::ForecastError;
    use crate::forecast::{ClimateHistory, ReplayForecaster, TrendForecaster};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn sensors() -> Vec<Sensor> {
        Sensor::from_positions(&[
            Position::new(1.0, 3.0),
            Position::new(30.0, 30.0),
            Position::new(60.0, 90.0),
        ])
    }

    fn base_field() -> ClimateField {
        ClimateField::from_readings(
            &sensors(),
            &[20.0, 25.0, 30.0],
            &[50.0, 60.0, 90.0],
            100,
            100,
            2.0,
        )
        .unwrap()
    }

    /// Forecaster that always fails.
    struct Offline;

    impl ClimateForecaster for Offline {
        fn forecast(
            &mut self,
            _quantity: Quantity,
            _window: &[HourlyRecord],
        ) -> Result<HourlyRecord, ForecastError> {
            Err(ForecastError::Unavailable {
                reason: "offline".to_owned(),
            })
        }
    }

    /// Forecaster that answers for temperature and fails for humidity.
    struct HumidityOffline;

    impl ClimateForecaster for HumidityOffline {
        fn forecast(
            &mut self,
            quantity: Quantity,
            _window: &[HourlyRecord],
        ) -> Result<HourlyRecord, ForecastError> {
            match quantity {
                Quantity::Temperature => Ok(HourlyRecord::new(ts(23), vec![99.0; 3])),
                Quantity::Humidity => Err(ForecastError::Unavailable {
                    reason: "humidity sensor feed down".to_owned(),
                }),
            }
        }
    }

    /// Forecaster that returns NaN readings.
    struct Broken;

    impl ClimateForecaster for Broken {
        fn forecast(
            &mut self,
            _quantity: Quantity,
            window: &[HourlyRecord],
        ) -> Result<HourlyRecord, ForecastError> {
            let n = window.last().map_or(0, HourlyRecord::sensor_count);
            Ok(HourlyRecord::new(ts(5), vec![f64::NAN; n]))
        }
    }

    #[test]
    fn readings_are_exact_at_sensors() {
        let field = base_field();
        let readings = field.sensor_readings();
        assert_eq!(readings.len(), 3);
        for r in readings {
            assert_eq!(field.temperature_at(r.position), r.temperature);
            assert_eq!(field.humidity_at(r.position), r.humidity);
        }
        assert_eq!(field.value_at(Quantity::Humidity, 60.0, 90.0), 90.0);
    }

    #[test]
    fn reading_count_must_match_sensors() {
        let result =
            ClimateField::from_readings(&sensors(), &[20.0], &[50.0, 60.0, 90.0], 10, 10, 2.0);
        assert!(matches!(
            result,
            Err(WorldError::SensorCountMismatch {
                quantity: Quantity::Temperature,
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn no_sensors_is_a_configuration_error() {
        let result = ClimateField::from_readings(&[], &[], &[], 10, 10, 2.0);
        assert!(matches!(result, Err(WorldError::EmptyObservations)));
    }

    #[test]
    fn diurnal_refresh_does_not_compound() {
        let mut model = ClimateModel::diurnal(base_field(), DiurnalProfile::default(), 8);
        assert_eq!(model.current().temperature_at(Position::new(1.0, 3.0)), 20.0);

        model.refresh(14).unwrap();
        let afternoon = model.current().temperature_at(Position::new(1.0, 3.0));
        assert!((afternoon - 23.0).abs() < 1e-9);

        model.refresh(15).unwrap();
        let again = model.current().temperature_at(Position::new(1.0, 3.0));
        assert!((again - 23.0).abs() < 1e-9);
        assert_eq!(model.refreshes(), 2);
    }

    #[test]
    fn diurnal_profile_rejects_unusable_factors() {
        assert!(DiurnalProfile::default().is_valid());
        let nan = DiurnalProfile {
            temperature: [f64::NAN, 1.0, 1.0, 1.0],
            ..DiurnalProfile::default()
        };
        assert!(!nan.is_valid());
        let negative = DiurnalProfile {
            humidity: [1.0, -0.5, 1.0, 1.0],
            ..DiurnalProfile::default()
        };
        assert!(!negative.is_valid());
    }

    #[test]
    fn diurnal_humidity_is_clamped() {
        let model = ClimateModel::diurnal(base_field(), DiurnalProfile::default(), 23);
        // 90 * 1.15 would exceed saturation.
        assert_eq!(model.current().humidity_at(Position::new(60.0, 90.0)), 100.0);
    }

    #[test]
    fn forecast_refresh_rolls_window() {
        let history =
            ClimateHistory::synthetic(ts(0), 24, &[20.0, 25.0, 30.0], &[50.0, 60.0, 70.0]);
        let t_window = history.window(Quantity::Temperature, 6, 4).unwrap();
        let h_window = history.window(Quantity::Humidity, 6, 4).unwrap();
        let mut model = ClimateModel::forecast(
            &sensors(),
            t_window,
            h_window,
            Box::new(ReplayForecaster::new(history.clone(), 6)),
            100,
            100,
            2.0,
        )
        .unwrap();
        assert!(model.is_forecast());
        assert_eq!(
            model.current().temperature_at(Position::new(1.0, 3.0)),
            history.temperature[5].values[0]
        );

        model.refresh(6).unwrap();
        assert_eq!(model.window_len(Quantity::Temperature), 4);
        assert_eq!(
            model.current().temperature_at(Position::new(1.0, 3.0)),
            history.temperature[6].values[0]
        );
        assert_eq!(
            model.current().humidity_at(Position::new(30.0, 30.0)),
            history.humidity[6].values[1]
        );
    }

    #[test]
    fn trend_forecaster_drives_refresh() {
        let history =
            ClimateHistory::synthetic(ts(0), 24, &[20.0, 25.0, 30.0], &[50.0, 60.0, 70.0]);
        let mut model = ClimateModel::forecast(
            &sensors(),
            history.window(Quantity::Temperature, 12, 12).unwrap(),
            history.window(Quantity::Humidity, 12, 12).unwrap(),
            Box::new(TrendForecaster::default()),
            50,
            100,
            2.0,
        )
        .unwrap();
        model.refresh(12).unwrap();
        let t = model.current().temperature_at(Position::new(1.0, 3.0));
        assert!(t.is_finite());
        assert!((15.0..=25.0).contains(&t));
    }

    #[test]
    fn forecaster_failure_aborts_refresh() {
        let history = ClimateHistory::synthetic(ts(0), 8, &[20.0, 25.0, 30.0], &[50.0, 60.0, 70.0]);
        let mut model = ClimateModel::forecast(
            &sensors(),
            history.window(Quantity::Temperature, 4, 4).unwrap(),
            history.window(Quantity::Humidity, 4, 4).unwrap(),
            Box::new(Offline),
            100,
            100,
            2.0,
        )
        .unwrap();
        assert!(matches!(model.refresh(4), Err(WorldError::Forecast { .. })));
    }

    #[test]
    fn failed_humidity_forecast_leaves_both_windows_untouched() {
        let history = ClimateHistory::synthetic(ts(0), 8, &[20.0, 25.0, 30.0], &[50.0, 60.0, 70.0]);
        let mut model = ClimateModel::forecast(
            &sensors(),
            history.window(Quantity::Temperature, 4, 4).unwrap(),
            history.window(Quantity::Humidity, 4, 4).unwrap(),
            Box::new(HumidityOffline),
            100,
            100,
            2.0,
        )
        .unwrap();
        let before_t = model.latest_record(Quantity::Temperature).cloned().unwrap();
        let before_h = model.latest_record(Quantity::Humidity).cloned().unwrap();
        let before_field = model.current().clone();

        assert!(matches!(model.refresh(4), Err(WorldError::Forecast { .. })));
        assert_eq!(model.latest_record(Quantity::Temperature), Some(&before_t));
        assert_eq!(model.latest_record(Quantity::Humidity), Some(&before_h));
        assert_eq!(model.window_len(Quantity::Temperature), 4);
        assert_eq!(model.current(), &before_field);
        assert_eq!(model.refreshes(), 0);
    }

    #[test]
    fn non_finite_forecast_is_rejected() {
        let history = ClimateHistory::synthetic(ts(0), 8, &[20.0, 25.0, 30.0], &[50.0, 60.0, 70.0]);
        let mut model = ClimateModel::forecast(
            &sensors(),
            history.window(Quantity::Temperature, 4, 4).unwrap(),
            history.window(Quantity::Humidity, 4, 4).unwrap(),
            Box::new(Broken),
            100,
            100,
            2.0,
        )
        .unwrap();
        assert!(matches!(
            model.refresh(4),
            Err(WorldError::NonFiniteObservation { .. })
        ));
    }

    #[test]
    fn empty_forecast_window_is_rejected() {
        let result = ClimateModel::forecast(
            &sensors(),
            Vec::new(),
            Vec::new(),
            Box::new(TrendForecaster::default()),
            100,
            100,
            2.0,
        );
        assert!(matches!(result, Err(WorldError::EmptyObservations)));
    }
}
