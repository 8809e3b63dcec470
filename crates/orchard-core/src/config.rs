//! Configuration loading and typed config structures for the Orchard simulation.
//!
//! The canonical configuration lives in `orchard-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader, and [`SimulationConfig::validate`], which rejects
//! every inconsistent setting before any agent is built.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use orchard_agents::{AgentError, FruitParams, MovementParams, PesticideParams};
use orchard_types::{Position, Wind};
use orchard_world::DiurnalProfile;
use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An agent parameter block is out of range.
    #[error("invalid agent parameters: {source}")]
    Parameter {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The configuration is internally inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `orchard-config.yaml`. Every field has a
/// default, so an empty document describes a runnable orchard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and run bounds.
    #[serde(default)]
    pub run: RunConfig,

    /// Field geometry, time stepping, wind, sensors, and climate backend.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Bug population.
    #[serde(default)]
    pub bugs: BugConfig,

    /// Trees and their fruit.
    #[serde(default)]
    pub trees: TreeConfig,

    /// Pesticide deployment.
    #[serde(default)]
    pub pesticide: PesticideConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The result is not validated; call [`validate`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check every setting for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] or [`ConfigError::Parameter`]
    /// describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        self.environment.validate()?;
        self.bugs.validate()?;
        self.trees.validate(&self.environment)?;
        self.pesticide.validate(&self.environment)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Seed and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Hours after which the run stops even if neither termination
    /// condition has been met.
    #[serde(default = "default_max_hours")]
    pub max_hours: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_hours: default_max_hours(),
        }
    }
}

/// Upper bound on `run.max_hours` and `environment.starting_index`.
///
/// A synthetic climate history covers both, so they must stay small enough
/// to allocate.
pub const MAX_RUN_HOURS: u64 = 100_000;

impl RunConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hours == 0 || self.max_hours > MAX_RUN_HOURS {
            return Err(invalid(format!(
                "run.max_hours must be between 1 and {MAX_RUN_HOURS}, got {}",
                self.max_hours
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Field geometry, time stepping, and climate settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    /// Domain size `[width, height]` in metres.
    #[serde(default = "default_field_size")]
    pub field_size: [u32; 2],

    /// Index into the climate history of the first simulated hour.
    #[serde(default = "default_sequence_length")]
    pub starting_index: usize,

    /// Number of hourly records handed to the forecaster.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,

    /// Length of one sub-hour tick in minutes. Must divide 60.
    #[serde(default = "default_time_step_minutes")]
    pub time_step_minutes: u32,

    /// Inverse-distance-weighting exponent.
    #[serde(default = "default_idw_power")]
    pub idw_power: f64,

    /// Calendar time of the first simulated hour.
    #[serde(default = "default_start_time")]
    pub start_time: NaiveDateTime,

    /// Prevailing wind.
    #[serde(default)]
    pub wind: WindConfig,

    /// Sensor positions.
    #[serde(default = "default_sensors")]
    pub sensors: Vec<Position>,

    /// Climate backend and initial readings.
    #[serde(default)]
    pub climate: ClimateConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            field_size: default_field_size(),
            starting_index: default_sequence_length(),
            sequence_length: default_sequence_length(),
            time_step_minutes: default_time_step_minutes(),
            idw_power: default_idw_power(),
            start_time: default_start_time(),
            wind: WindConfig::default(),
            sensors: default_sensors(),
            climate: ClimateConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Domain width in metres.
    pub const fn width(&self) -> u32 {
        self.field_size[0]
    }

    /// Domain height in metres.
    pub const fn height(&self) -> u32 {
        self.field_size[1]
    }

    /// Whether a point lies inside the half-open domain.
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < f64::from(self.width())
            && position.y < f64::from(self.height())
    }

    /// Normalised wind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero or non-finite
    /// direction, or a negative speed.
    pub fn wind(&self) -> Result<Wind, ConfigError> {
        Wind::new(self.wind.direction, self.wind.speed).ok_or_else(|| {
            invalid(format!(
                "environment.wind: direction {:?} with speed {} is not usable",
                self.wind.direction, self.wind.speed
            ))
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width() == 0 || self.height() == 0 {
            return Err(invalid(format!(
                "environment.field_size must be positive, got {:?}",
                self.field_size
            )));
        }
        if self.time_step_minutes == 0
            || self.time_step_minutes > 60
            || 60_u32.checked_rem(self.time_step_minutes) != Some(0)
        {
            return Err(invalid(format!(
                "environment.time_step_minutes must divide 60, got {}",
                self.time_step_minutes
            )));
        }
        if !self.idw_power.is_finite() || self.idw_power <= 0.0 {
            return Err(invalid(format!(
                "environment.idw_power must be positive, got {}",
                self.idw_power
            )));
        }
        self.wind()?;

        if self.sensors.is_empty() {
            return Err(invalid("environment.sensors must list at least one sensor"));
        }
        if let Some(p) = self.sensors.iter().find(|p| !self.contains(**p)) {
            return Err(invalid(format!(
                "sensor at ({}, {}) lies outside the field",
                p.x, p.y
            )));
        }

        let sensors = self.sensors.len();
        let climate = &self.climate;
        if climate.temperature.len() != sensors || climate.humidity.len() != sensors {
            return Err(invalid(format!(
                "environment.climate needs one temperature and humidity reading per sensor \
                 ({sensors}), got {} and {}",
                climate.temperature.len(),
                climate.humidity.len()
            )));
        }
        if climate.temperature.iter().chain(&climate.humidity).any(|v| !v.is_finite()) {
            return Err(invalid("environment.climate readings must be finite"));
        }
        if !climate.diurnal.is_valid() {
            return Err(invalid(format!(
                "environment.climate.diurnal factors must be finite and non-negative, got {:?}",
                climate.diurnal
            )));
        }
        if !climate.damping.is_finite() || !(0.0..=1.0).contains(&climate.damping) {
            return Err(invalid(format!(
                "environment.climate.damping must lie in [0, 1], got {}",
                climate.damping
            )));
        }
        if !u64::try_from(self.starting_index).is_ok_and(|i| i <= MAX_RUN_HOURS) {
            return Err(invalid(format!(
                "environment.starting_index must be at most {MAX_RUN_HOURS}, got {}",
                self.starting_index
            )));
        }

        if climate.backend == ClimateBackendKind::Forecast {
            if self.sequence_length == 0 {
                return Err(invalid("environment.sequence_length must be at least 1"));
            }
            if self.starting_index < self.sequence_length {
                return Err(invalid(format!(
                    "environment.starting_index {} is smaller than sequence_length {}",
                    self.starting_index, self.sequence_length
                )));
            }
            if climate.forecaster == ForecasterKind::Trend && self.sequence_length < 2 {
                return Err(invalid(
                    "the trend forecaster needs a sequence_length of at least 2",
                ));
            }
        }
        Ok(())
    }
}

/// Wind as configured (direction need not be normalised).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WindConfig {
    /// Direction vector; normalised on use.
    #[serde(default = "default_wind_direction")]
    pub direction: [f64; 2],

    /// Speed in metres per minute.
    #[serde(default = "default_wind_speed")]
    pub speed: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            direction: default_wind_direction(),
            speed: default_wind_speed(),
        }
    }
}

/// Which refresh backend drives the climate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateBackendKind {
    /// Rescale the initial readings by time of day.
    #[default]
    Diurnal,
    /// Ask a forecaster for the next hour of readings.
    Forecast,
}

/// Which bundled forecaster the forecast backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecasterKind {
    /// Replay the recorded history from `starting_index` on.
    Replay,
    /// Extrapolate the damped trend of the current window.
    #[default]
    Trend,
}

/// Climate backend selection and initial readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClimateConfig {
    /// Refresh backend.
    #[serde(default)]
    pub backend: ClimateBackendKind,

    /// Forecaster used by the forecast backend.
    #[serde(default)]
    pub forecaster: ForecasterKind,

    /// Trend damping for [`ForecasterKind::Trend`].
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Initial temperature per sensor, degrees Celsius.
    #[serde(default = "default_temperatures")]
    pub temperature: Vec<f64>,

    /// Initial relative humidity per sensor, percent.
    #[serde(default = "default_humidities")]
    pub humidity: Vec<f64>,

    /// Time-of-day factors for the diurnal backend.
    #[serde(default)]
    pub diurnal: DiurnalProfile,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            backend: ClimateBackendKind::default(),
            forecaster: ForecasterKind::default(),
            damping: default_damping(),
            temperature: default_temperatures(),
            humidity: default_humidities(),
            diurnal: DiurnalProfile::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Bug population settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BugConfig {
    /// Initial number of bugs, placed uniformly at random.
    #[serde(default = "default_bug_count")]
    pub count: u32,

    /// Length of one successful step in metres.
    #[serde(default = "default_max_step_length")]
    pub max_step_length: f64,

    /// Temperature-gated movement curve.
    #[serde(default)]
    pub movement: MovementParams,
}

impl Default for BugConfig {
    fn default() -> Self {
        Self {
            count: default_bug_count(),
            max_step_length: default_max_step_length(),
            movement: MovementParams::default(),
        }
    }
}

impl BugConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(invalid("bugs.count must be at least 1"));
        }
        if !self.max_step_length.is_finite() || self.max_step_length <= 0.0 {
            return Err(invalid(format!(
                "bugs.max_step_length must be positive, got {}",
                self.max_step_length
            )));
        }
        self.movement.validate()?;
        Ok(())
    }
}

/// Tree and fruit settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeConfig {
    /// Number of trees.
    #[serde(default = "default_tree_count")]
    pub count: u32,

    /// Upper bound on fruits per tree; each tree bears `1..=max`.
    #[serde(default = "default_max_fruits_per_tree")]
    pub max_fruits_per_tree: u32,

    /// Fixed tree positions; missing ones are drawn at random.
    #[serde(default)]
    pub positions: Vec<Position>,

    /// Ripening and puncture parameters.
    #[serde(default)]
    pub fruit: FruitParams,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            count: default_tree_count(),
            max_fruits_per_tree: default_max_fruits_per_tree(),
            positions: Vec::new(),
            fruit: FruitParams::default(),
        }
    }
}

impl TreeConfig {
    fn validate(&self, environment: &EnvironmentConfig) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(invalid("trees.count must be at least 1"));
        }
        if self.max_fruits_per_tree == 0 {
            return Err(invalid("trees.max_fruits_per_tree must be at least 1"));
        }
        check_positions("trees", &self.positions, self.count, environment)?;
        self.fruit.validate()?;
        Ok(())
    }
}

/// Pesticide deployment settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PesticideConfig {
    /// Total active mass in grams, split evenly across sources.
    #[serde(default = "default_total_quantity_grams")]
    pub total_quantity_grams: f64,

    /// Dispersion radius at deployment, metres.
    #[serde(default = "default_initial_radius")]
    pub initial_radius: f64,

    /// Number of sources.
    #[serde(default = "default_pesticide_count")]
    pub count: u32,

    /// Fixed source positions; missing ones are drawn at random.
    #[serde(default)]
    pub positions: Vec<Position>,

    /// Decay, mortality, and repulsion parameters.
    #[serde(flatten)]
    pub params: PesticideParams,
}

impl Default for PesticideConfig {
    fn default() -> Self {
        Self {
            total_quantity_grams: default_total_quantity_grams(),
            initial_radius: default_initial_radius(),
            count: default_pesticide_count(),
            positions: Vec::new(),
            params: PesticideParams::default(),
        }
    }
}

impl PesticideConfig {
    /// Mass assigned to each source.
    pub fn mass_per_source(&self) -> f64 {
        self.total_quantity_grams / f64::from(self.count.max(1))
    }

    fn validate(&self, environment: &EnvironmentConfig) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(invalid("pesticide.count must be at least 1"));
        }
        if !self.total_quantity_grams.is_finite() || self.total_quantity_grams <= 0.0 {
            return Err(invalid(format!(
                "pesticide.total_quantity_grams must be positive, got {}",
                self.total_quantity_grams
            )));
        }
        if !self.initial_radius.is_finite() || self.initial_radius < 0.0 {
            return Err(invalid(format!(
                "pesticide.initial_radius must be non-negative, got {}",
                self.initial_radius
            )));
        }
        check_positions("pesticide", &self.positions, self.count, environment)?;
        self.params.validate()?;
        Ok(())
    }
}

/// Check a fixed-position list against its count and the domain.
fn check_positions(
    section: &str,
    positions: &[Position],
    count: u32,
    environment: &EnvironmentConfig,
) -> Result<(), ConfigError> {
    let listed = u32::try_from(positions.len()).unwrap_or(u32::MAX);
    if listed > count {
        return Err(invalid(format!(
            "{section}.positions lists {listed} entries but count is {count}"
        )));
    }
    if let Some(p) = positions.iter().find(|p| !environment.contains(**p)) {
        return Err(invalid(format!(
            "{section} position ({}, {}) lies outside the field",
            p.x, p.y
        )));
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_max_hours() -> u64 {
    720
}

const fn default_field_size() -> [u32; 2] {
    [100, 100]
}

const fn default_sequence_length() -> usize {
    24
}

const fn default_time_step_minutes() -> u32 {
    10
}

const fn default_idw_power() -> f64 {
    orchard_world::DEFAULT_IDW_POWER
}

fn default_start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

const fn default_wind_direction() -> [f64; 2] {
    [1.0, 0.0]
}

const fn default_wind_speed() -> f64 {
    1.0
}

fn default_sensors() -> Vec<Position> {
    [
        [1.0, 3.0],
        [1.0, 30.0],
        [1.0, 60.0],
        [1.0, 90.0],
        [30.0, 3.0],
        [30.0, 30.0],
        [30.0, 60.0],
        [30.0, 90.0],
        [60.0, 3.0],
        [60.0, 30.0],
        [60.0, 60.0],
        [60.0, 90.0],
        [90.0, 3.0],
    ]
    .into_iter()
    .map(Position::from)
    .collect()
}

fn default_temperatures() -> Vec<f64> {
    vec![
        24.1, 23.8, 23.5, 23.9, 24.6, 24.2, 23.7, 24.0, 25.1, 24.8, 24.3, 24.5, 25.0,
    ]
}

fn default_humidities() -> Vec<f64> {
    vec![
        62.0, 64.0, 66.0, 63.0, 60.0, 61.0, 65.0, 62.0, 58.0, 59.0, 61.0, 60.0, 57.0,
    ]
}

const fn default_damping() -> f64 {
    orchard_world::TrendForecaster::DEFAULT_DAMPING
}

const fn default_bug_count() -> u32 {
    50
}

const fn default_max_step_length() -> f64 {
    1.0
}

const fn default_tree_count() -> u32 {
    10
}

const fn default_max_fruits_per_tree() -> u32 {
    20
}

const fn default_total_quantity_grams() -> f64 {
    200.0
}

const fn default_initial_radius() -> f64 {
    1.0
}

const fn default_pesticide_count() -> u32 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.run.seed, 42);
        assert_eq!(config.environment.sensors.len(), 13);
        assert_eq!(config.environment.time_step_minutes, 10);
        assert_eq!(config.pesticide.total_quantity_grams, 200.0);
        assert_eq!(config.pesticide.params.decay_factor, 0.0025);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
run:
  seed: 7
  max_hours: 48

environment:
  field_size: [50, 40]
  starting_index: 12
  sequence_length: 6
  time_step_minutes: 15
  idw_power: 3.0
  start_time: "2023-08-15T06:00:00"
  wind:
    direction: [0.0, 2.0]
    speed: 0.5
  sensors: [[1, 1], [25, 20], [45, 35]]
  climate:
    backend: forecast
    forecaster: replay
    temperature: [20.0, 21.0, 22.0]
    humidity: [50.0, 55.0, 60.0]

bugs:
  count: 30
  max_step_length: 0.5
  movement:
    optimal_temperature: 24.0

trees:
  count: 4
  max_fruits_per_tree: 8
  positions: [[10, 10], [30, 30]]
  fruit:
    bite_tolerance: 3

pesticide:
  total_quantity_grams: 300.0
  initial_radius: 2.0
  count: 3
  positions: [[25, 20]]
  decay_factor: 0.004
  mortality_probability: 0.7
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.run.max_hours, 48);
        assert_eq!(config.environment.width(), 50);
        assert_eq!(config.environment.height(), 40);
        assert_eq!(config.environment.climate.backend, ClimateBackendKind::Forecast);
        assert_eq!(config.environment.climate.forecaster, ForecasterKind::Replay);
        assert_eq!(config.bugs.movement.optimal_temperature, 24.0);
        assert_eq!(config.bugs.movement.p_max, 0.9);
        assert_eq!(config.trees.fruit.bite_tolerance, 3);
        assert_eq!(config.pesticide.params.decay_factor, 0.004);
        assert_eq!(config.pesticide.params.repulsion_probability, 0.5);
        assert!((config.pesticide.mass_per_source() - 100.0).abs() < 1e-12);

        let wind = config.environment.wind().unwrap();
        assert!((wind.direction[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("bugs:\n  count: 5\n").unwrap();
        assert_eq!(config.bugs.count, 5);
        assert_eq!(config.trees.count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn zero_counts_fail_fast() {
        for yaml in [
            "bugs:\n  count: 0\n",
            "trees:\n  count: 0\n",
            "trees:\n  max_fruits_per_tree: 0\n",
            "pesticide:\n  count: 0\n",
        ] {
            let config = SimulationConfig::parse(yaml).unwrap();
            assert!(config.validate().is_err(), "accepted: {yaml}");
        }
    }

    #[test]
    fn time_step_must_divide_an_hour() {
        let config = SimulationConfig::parse("environment:\n  time_step_minutes: 7\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn empty_sensor_list_is_rejected() {
        let config = SimulationConfig::parse(
            "environment:\n  sensors: []\n  climate:\n    temperature: []\n    humidity: []\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reading_count_must_match_sensors() {
        let config =
            SimulationConfig::parse("environment:\n  climate:\n    temperature: [20.0]\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn positions_outside_field_are_rejected() {
        let config = SimulationConfig::parse("trees:\n  positions: [[100, 5]]\n").unwrap();
        assert!(config.validate().is_err());

        let config = SimulationConfig::parse("pesticide:\n  positions: [[-1, 5]]\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn too_many_positions_are_rejected() {
        let config =
            SimulationConfig::parse("pesticide:\n  count: 1\n  positions: [[1, 1], [2, 2]]\n")
                .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_wind_direction_is_rejected() {
        let config =
            SimulationConfig::parse("environment:\n  wind:\n    direction: [0.0, 0.0]\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn forecast_window_must_fit_before_start() {
        let yaml = "environment:\n  starting_index: 4\n  sequence_length: 8\n  climate:\n    backend: forecast\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn run_length_is_bounded() {
        let yaml = r"
run:
  max_hours: 18446744073709551000
environment:
  climate:
    backend: forecast
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_err());

        let config =
            SimulationConfig::parse(&format!("run:\n  max_hours: {MAX_RUN_HOURS}\n")).unwrap();
        assert!(config.validate().is_ok());

        let yaml = "environment:\n  starting_index: 18446744073709551000\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn diurnal_factors_must_be_finite_and_non_negative() {
        let yaml = r"
environment:
  climate:
    diurnal:
      temperature: [.nan, 1.0, 1.0, 1.0]
      humidity: [1.0, 1.0, 1.0, 1.0]
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = r"
environment:
  climate:
    diurnal:
      temperature: [1.0, -3.0, 1.0, 1.0]
      humidity: [1.0, 1.0, 1.0, 1.0]
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn damping_must_be_a_fraction() {
        for damping in [".nan", "-0.5", "1.5"] {
            let yaml = format!("environment:\n  climate:\n    damping: {damping}\n");
            let config = SimulationConfig::parse(&yaml).unwrap();
            assert!(config.validate().is_err(), "damping {damping} accepted");
        }
    }

    #[test]
    fn agent_parameter_errors_surface() {
        let config = SimulationConfig::parse("pesticide:\n  mortality_probability: 2.0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Parameter { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("orchard-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().validate().is_ok());
        }
    }
}
