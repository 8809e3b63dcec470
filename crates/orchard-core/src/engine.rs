//! Tick cycle: the nested hour/sub-hour loop that drives the Orchard simulation.
//!
//! Every sub-hour tick runs five steps against a field that is read-only
//! for the whole tick:
//!
//! 1. **Pesticide** -- each source spreads and decays, then runs one
//!    lethality trial against every live bug. Hits mark the bug dead.
//! 2. **Cull** -- the bug collection is rebuilt without dead bugs.
//! 3. **Movement** -- each live bug plans and applies one move; a bug that
//!    ends outside the domain is marked escaped. It is never clamped back.
//! 4. **Cull** -- the bug collection is rebuilt without escaped bugs.
//! 5. **Fruit** -- every fruit ripens, nearby bugs attempt punctures, and
//!    each tree rebuilds its fruit collection without rotten fruit.
//!
//! After `ticks_per_hour` ticks the clock completes an hour and the climate
//! field is refreshed exactly once. All randomness draws from one
//! generator seeded at construction, so a run is reproducible from its
//! configuration.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use orchard_agents::{
    AgentError, BugAgent, FruitParams, MovementParams, PesticideSource, Surroundings, TreeAgent,
};
use orchard_types::{BugId, PesticideId, Position, Quantity, TimeOfDay, TreeId, Wind};
use orchard_world::{
    ClimateField, ClimateForecaster, ClimateHistory, ClimateModel, ForecastError,
    ReplayForecaster, Sensor, TrendForecaster, WorldError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{ClockError, SimulationClock};
use crate::config::{
    ClimateBackendKind, ConfigError, EnvironmentConfig, ForecasterKind, SimulationConfig,
};
use crate::runner::{RunReport, SimulationEndReason};

/// Errors that can occur while building or running the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Building or refreshing the climate field failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The climate history could not supply the initial window.
    #[error("forecast error: {source}")]
    Forecast {
        /// The underlying forecast error.
        #[from]
        source: ForecastError,
    },

    /// An agent could not be constructed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Summary of a single sub-hour tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed (1-based).
    pub tick: u64,
    /// Whether this tick completed an hour (and refreshed the field).
    pub hour_completed: bool,
    /// Bugs killed by pesticide during this tick.
    pub deaths: u32,
    /// Bugs that left the domain during this tick.
    pub escapes: u32,
    /// Fruits that rotted during this tick.
    pub fruits_rotted: u32,
    /// Live bugs at the end of the tick.
    pub bugs_alive: u32,
}

/// Summary of one completed simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSummary {
    /// Hours completed so far (1-based).
    pub hour: u64,
    /// Calendar time of the hour that begins now.
    pub timestamp: NaiveDateTime,
    /// Time-of-day period of the hour that begins now.
    pub time_of_day: TimeOfDay,
    /// Live bugs.
    pub bugs_alive: u32,
    /// Bugs killed during this hour.
    pub deaths_this_hour: u32,
    /// Bugs that escaped during this hour.
    pub escapes_this_hour: u32,
    /// Cumulative bug deaths.
    pub bug_deaths: u32,
    /// Cumulative escapes.
    pub bugs_escaped: u32,
    /// Sources with mass remaining.
    pub active_pesticides: u32,
    /// Largest pesticide radius observed so far, metres.
    pub max_pesticide_radius: f64,
    /// Live fruit across all trees.
    pub fruits_remaining: u32,
    /// Cumulative rotten fruit.
    pub fruits_rotten: u32,
}

/// Running totals kept across the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tallies {
    initial_bugs: u32,
    bug_deaths: u32,
    bugs_escaped: u32,
    fruits_rotten: u32,
    max_pesticide_radius: f64,
}

/// The simulation engine: every agent collection, the climate model, the
/// clock, and the run's random generator.
#[derive(Debug)]
pub struct SimulationEngine {
    clock: SimulationClock,
    climate: ClimateModel,
    wind: Wind,
    bugs: Vec<BugAgent>,
    trees: Vec<TreeAgent>,
    pesticides: Vec<PesticideSource>,
    movement: MovementParams,
    fruit: FruitParams,
    max_hours: u64,
    rng: StdRng,
    tallies: Tallies,
}

impl SimulationEngine {
    /// Build an engine from configuration.
    ///
    /// With the forecast backend and no recorded history, a synthetic
    /// history with a daily cycle around the configured readings seeds the
    /// forecaster window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration is invalid or any
    /// component fails to build. Nothing is ticked on failure.
    pub fn new(config: &SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let history = match config.environment.climate.backend {
            ClimateBackendKind::Diurnal => ClimateHistory::default(),
            ClimateBackendKind::Forecast => synthetic_history(config)?,
        };
        Self::with_history(config, &history)
    }

    /// Build an engine whose forecast backend reads a recorded history.
    ///
    /// The forecaster is the one named by the configuration. The history
    /// is ignored by the diurnal backend.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration is invalid, the history
    /// cannot supply the initial window, or any component fails to build.
    pub fn with_history(
        config: &SimulationConfig,
        history: &ClimateHistory,
    ) -> Result<Self, EngineError> {
        let climate = &config.environment.climate;
        let forecaster: Box<dyn ClimateForecaster> = match climate.forecaster {
            ForecasterKind::Replay => Box::new(ReplayForecaster::new(
                history.clone(),
                config.environment.starting_index,
            )),
            ForecasterKind::Trend => Box::new(TrendForecaster::new(climate.damping)),
        };
        Self::with_forecaster(config, history, forecaster)
    }

    /// Build an engine with a caller-supplied forecaster.
    ///
    /// # Errors
    ///
    /// See [`with_history`](Self::with_history).
    pub fn with_forecaster(
        config: &SimulationConfig,
        history: &ClimateHistory,
        forecaster: Box<dyn ClimateForecaster>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let climate = build_climate(&config.environment, history, forecaster)?;

        let mut rng = StdRng::seed_from_u64(config.run.seed);
        let trees = plant_trees(config, &mut rng)?;
        let pesticides = deploy_pesticides(config, &mut rng)?;
        let bugs = release_bugs(config, &mut rng)?;

        Self::assemble(config, climate, bugs, trees, pesticides, rng)
    }

    /// Build an engine from pre-built parts.
    ///
    /// Agents are taken as given; the configuration supplies the clock,
    /// wind, movement and fruit parameters, run bound, and seed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration is invalid.
    pub fn from_parts(
        config: &SimulationConfig,
        climate: ClimateModel,
        bugs: Vec<BugAgent>,
        trees: Vec<TreeAgent>,
        pesticides: Vec<PesticideSource>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.run.seed);
        Self::assemble(config, climate, bugs, trees, pesticides, rng)
    }

    fn assemble(
        config: &SimulationConfig,
        climate: ClimateModel,
        bugs: Vec<BugAgent>,
        trees: Vec<TreeAgent>,
        pesticides: Vec<PesticideSource>,
        rng: StdRng,
    ) -> Result<Self, EngineError> {
        let environment = &config.environment;
        let clock = SimulationClock::new(environment.time_step_minutes, environment.start_time)?;
        let wind = environment.wind()?;
        let max_pesticide_radius = pesticides
            .iter()
            .map(PesticideSource::radius)
            .fold(0.0, f64::max);

        let engine = Self {
            clock,
            climate,
            wind,
            tallies: Tallies {
                initial_bugs: count(bugs.len()),
                max_pesticide_radius,
                ..Tallies::default()
            },
            bugs,
            trees,
            pesticides,
            movement: config.bugs.movement,
            fruit: config.trees.fruit,
            max_hours: config.run.max_hours,
            rng,
        };

        info!(
            seed = config.run.seed,
            bugs = engine.bugs.len(),
            trees = engine.trees.len(),
            fruits = engine.fruits_remaining(),
            pesticides = engine.pesticides.len(),
            ticks_per_hour = engine.clock.ticks_per_hour(),
            forecast = engine.climate.is_forecast(),
            "Engine initialised"
        );
        Ok(engine)
    }

    // -----------------------------------------------------------------------
    // Tick cycle
    // -----------------------------------------------------------------------

    /// Execute one sub-hour tick.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the clock overflows or the hourly climate
    /// refresh fails. Either aborts the run.
    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        let time_step = f64::from(self.clock.time_step_minutes());
        let climate = self.climate.current();

        // --- 1. Pesticide spread and lethality ---
        let mut deaths: u32 = 0;
        for source in &mut self.pesticides {
            let at = source.position();
            let (temperature, humidity) = (climate.temperature_at(at), climate.humidity_at(at));
            if source.spread(&self.wind, temperature, humidity, time_step) {
                debug!(pesticide = %source.id(), radius = source.radius(), "Pesticide dissipated");
            }
            self.tallies.max_pesticide_radius =
                self.tallies.max_pesticide_radius.max(source.radius());

            if source.is_dissipated() {
                continue;
            }
            for bug in &mut self.bugs {
                if bug.is_alive() && source.affects(bug, &mut self.rng) {
                    bug.mark_dead();
                    deaths = deaths.saturating_add(1);
                    debug!(
                        bug = %bug.id(),
                        pesticide = %source.id(),
                        position = %bug.position(),
                        "Bug killed"
                    );
                }
            }
        }
        self.tallies.bug_deaths = self.tallies.bug_deaths.saturating_add(deaths);

        // --- 2. Drop dead bugs ---
        self.bugs = retain_alive(std::mem::take(&mut self.bugs));

        // --- 3. Movement and exit check ---
        let readings = climate.sensor_readings();
        let mut escapes: u32 = 0;
        for index in 0..self.bugs.len() {
            let Some(bug) = self.bugs.get(index) else {
                continue;
            };
            let surroundings = Surroundings {
                climate,
                trees: &self.trees,
                bugs: &self.bugs,
                sensors: &readings,
                pesticides: &self.pesticides,
            };
            let outcome = bug.plan_move(&surroundings, &self.movement, &mut self.rng);

            if let Some(bug) = self.bugs.get_mut(index) {
                bug.apply_move(outcome);
                if !climate.contains(bug.position()) {
                    bug.mark_escaped();
                    escapes = escapes.saturating_add(1);
                    debug!(bug = %bug.id(), position = %bug.position(), "Bug escaped");
                }
            }
        }
        self.tallies.bugs_escaped = self.tallies.bugs_escaped.saturating_add(escapes);

        // --- 4. Drop escaped bugs ---
        self.bugs = retain_alive(std::mem::take(&mut self.bugs));

        // --- 5. Fruit ripening, punctures, and rot ---
        let mut fruits_rotted: u32 = 0;
        for tree in &mut self.trees {
            let removed = tree.tick_fruits(climate, &self.bugs, &self.fruit, &mut self.rng);
            fruits_rotted = fruits_rotted.saturating_add(count(removed.len()));
        }
        self.tallies.fruits_rotten = self.tallies.fruits_rotten.saturating_add(fruits_rotted);

        // --- Clock and hourly refresh ---
        let hour_completed = self.clock.advance()?;
        if hour_completed {
            self.climate.refresh(self.clock.hour_of_day())?;
        }

        Ok(TickSummary {
            tick: self.clock.tick(),
            hour_completed,
            deaths,
            escapes,
            fruits_rotted,
            bugs_alive: self.bugs_alive(),
        })
    }

    /// Run ticks until the current hour completes.
    ///
    /// # Errors
    ///
    /// Propagates the first [`EngineError`] from [`tick`](Self::tick).
    pub fn run_hour(&mut self) -> Result<HourSummary, EngineError> {
        let deaths_before = self.tallies.bug_deaths;
        let escapes_before = self.tallies.bugs_escaped;
        loop {
            if self.tick()?.hour_completed {
                break;
            }
        }

        let summary = HourSummary {
            hour: self.clock.hour(),
            timestamp: self.clock.now(),
            time_of_day: self.clock.time_of_day(),
            bugs_alive: self.bugs_alive(),
            deaths_this_hour: self.tallies.bug_deaths.saturating_sub(deaths_before),
            escapes_this_hour: self.tallies.bugs_escaped.saturating_sub(escapes_before),
            bug_deaths: self.tallies.bug_deaths,
            bugs_escaped: self.tallies.bugs_escaped,
            active_pesticides: count(self.pesticides.iter().filter(|s| !s.is_dissipated()).count()),
            max_pesticide_radius: self.tallies.max_pesticide_radius,
            fruits_remaining: self.fruits_remaining(),
            fruits_rotten: self.tallies.fruits_rotten,
        };
        info!(
            hour = summary.hour,
            bugs_alive = summary.bugs_alive,
            deaths = summary.bug_deaths,
            escaped = summary.bugs_escaped,
            active_pesticides = summary.active_pesticides,
            max_radius = summary.max_pesticide_radius,
            "Hour complete"
        );
        Ok(summary)
    }

    /// Why the run should stop now, if it should.
    ///
    /// Checked once per completed hour. Dissipation of every source takes
    /// precedence over an empty population, which takes precedence over
    /// the hour bound.
    pub fn termination(&self) -> Option<SimulationEndReason> {
        if self.pesticides.iter().all(PesticideSource::is_dissipated) {
            Some(SimulationEndReason::PesticideDissipated)
        } else if self.bugs.is_empty() {
            Some(SimulationEndReason::PopulationCleared)
        } else if self.clock.hour() >= self.max_hours {
            Some(SimulationEndReason::MaxHoursReached)
        } else {
            None
        }
    }

    /// The run output as of now.
    pub fn report(&self, end_reason: SimulationEndReason) -> RunReport {
        RunReport {
            bugs_survived: self.bugs_alive(),
            bugs_escaped: self.tallies.bugs_escaped,
            bug_deaths: self.tallies.bug_deaths,
            hours_elapsed: self.clock.hour(),
            ticks_elapsed: self.clock.tick(),
            max_pesticide_radius: self.tallies.max_pesticide_radius,
            fruits_rotten: self.tallies.fruits_rotten,
            fruits_remaining: self.fruits_remaining(),
            end_reason,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The simulation clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The climate model.
    pub const fn climate(&self) -> &ClimateModel {
        &self.climate
    }

    /// The field agents read during the current hour.
    pub const fn field(&self) -> &ClimateField {
        self.climate.current()
    }

    /// Active bugs. Never contains dead or escaped bugs between ticks.
    pub fn bugs(&self) -> &[BugAgent] {
        &self.bugs
    }

    /// Trees and their live fruit.
    pub fn trees(&self) -> &[TreeAgent] {
        &self.trees
    }

    /// Pesticide sources, including dissipated ones.
    pub fn pesticides(&self) -> &[PesticideSource] {
        &self.pesticides
    }

    /// Bugs at construction.
    pub const fn initial_bug_count(&self) -> u32 {
        self.tallies.initial_bugs
    }

    /// Live bugs.
    pub fn bugs_alive(&self) -> u32 {
        count(self.bugs.len())
    }

    /// Cumulative bug deaths.
    pub const fn bug_deaths(&self) -> u32 {
        self.tallies.bug_deaths
    }

    /// Cumulative escapes.
    pub const fn bugs_escaped(&self) -> u32 {
        self.tallies.bugs_escaped
    }

    /// Cumulative rotten fruit.
    pub const fn fruits_rotten(&self) -> u32 {
        self.tallies.fruits_rotten
    }

    /// Live fruit across all trees.
    pub fn fruits_remaining(&self) -> u32 {
        count(self.trees.iter().map(|t| t.fruits().len()).sum())
    }

    /// Largest pesticide radius observed so far.
    pub const fn max_pesticide_radius(&self) -> f64 {
        self.tallies.max_pesticide_radius
    }
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

/// Rebuild a bug collection keeping only live members.
fn retain_alive(bugs: Vec<BugAgent>) -> Vec<BugAgent> {
    bugs.into_iter().filter(BugAgent::is_alive).collect()
}

/// Saturating `usize` to `u32` conversion for counters.
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn build_climate(
    environment: &EnvironmentConfig,
    history: &ClimateHistory,
    forecaster: Box<dyn ClimateForecaster>,
) -> Result<ClimateModel, EngineError> {
    let sensors = Sensor::from_positions(&environment.sensors);
    let (width, height, power) = (environment.width(), environment.height(), environment.idw_power);

    match environment.climate.backend {
        ClimateBackendKind::Diurnal => {
            let base = ClimateField::from_readings(
                &sensors,
                &environment.climate.temperature,
                &environment.climate.humidity,
                width,
                height,
                power,
            )?;
            Ok(ClimateModel::diurnal(
                base,
                environment.climate.diurnal,
                environment.start_time.hour(),
            ))
        }
        ClimateBackendKind::Forecast => {
            let start = environment.starting_index;
            let length = environment.sequence_length;
            let temperature = history.window(Quantity::Temperature, start, length)?;
            let humidity = history.window(Quantity::Humidity, start, length)?;
            Ok(ClimateModel::forecast(
                &sensors,
                temperature,
                humidity,
                forecaster,
                width,
                height,
                power,
            )?)
        }
    }
}

/// Synthetic history ending just before the first simulated hour, long
/// enough to replay every hour the run may reach.
fn synthetic_history(config: &SimulationConfig) -> Result<ClimateHistory, EngineError> {
    let environment = &config.environment;
    let lead = i64::try_from(environment.starting_index).map_err(|_err| ConfigError::Invalid {
        reason: "environment.starting_index is too large".to_owned(),
    })?;
    let start = environment
        .start_time
        .checked_sub_signed(TimeDelta::hours(lead))
        .ok_or_else(|| ConfigError::Invalid {
            reason: "environment.start_time is too early for starting_index".to_owned(),
        })?;
    let hours = environment
        .starting_index
        .saturating_add(usize::try_from(config.run.max_hours).unwrap_or(usize::MAX))
        .saturating_add(1);
    Ok(ClimateHistory::synthetic(
        start,
        hours,
        &environment.climate.temperature,
        &environment.climate.humidity,
    ))
}

/// Uniform random point inside the domain.
fn random_position(environment: &EnvironmentConfig, rng: &mut impl Rng) -> Position {
    Position::new(
        rng.random_range(0.0..f64::from(environment.width())),
        rng.random_range(0.0..f64::from(environment.height())),
    )
}

/// Configured position `index` if listed, otherwise a random one.
fn placement(
    positions: &[Position],
    index: u32,
    environment: &EnvironmentConfig,
    rng: &mut impl Rng,
) -> Position {
    usize::try_from(index)
        .ok()
        .and_then(|i| positions.get(i).copied())
        .unwrap_or_else(|| random_position(environment, rng))
}

fn plant_trees(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<TreeAgent>, EngineError> {
    let trees = &config.trees;
    let mut next_fruit_id = 0;
    let mut planted = Vec::new();
    for raw in 0..trees.count {
        let position = placement(&trees.positions, raw, &config.environment, rng);
        let fruit_count = rng.random_range(1..=trees.max_fruits_per_tree);
        planted.push(TreeAgent::planted(
            TreeId::new(raw),
            position,
            fruit_count,
            &mut next_fruit_id,
            &trees.fruit,
            rng,
        )?);
    }
    Ok(planted)
}

fn deploy_pesticides(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<PesticideSource>, EngineError> {
    let pesticide = &config.pesticide;
    let mass = pesticide.mass_per_source();
    let mut deployed = Vec::new();
    for raw in 0..pesticide.count {
        let position = placement(&pesticide.positions, raw, &config.environment, rng);
        deployed.push(PesticideSource::new(
            PesticideId::new(raw),
            position,
            mass,
            pesticide.initial_radius,
            &pesticide.params,
        )?);
    }
    Ok(deployed)
}

fn release_bugs(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<BugAgent>, EngineError> {
    let mut bugs = Vec::new();
    for raw in 0..config.bugs.count {
        let position = random_position(&config.environment, rng);
        bugs.push(BugAgent::new(BugId::new(raw), position, config.bugs.max_step_length)?);
    }
    Ok(bugs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        SimulationConfig::parse(
            r"
run: { seed: 11, max_hours: 10 }
bugs: { count: 20 }
trees: { count: 3, max_fruits_per_tree: 4, positions: [[20, 20]] }
pesticide: { count: 2, positions: [[50, 50]] }
",
        )
        .unwrap()
    }

    #[test]
    fn engine_builds_from_config() {
        let engine = SimulationEngine::new(&small_config()).unwrap();
        assert_eq!(engine.bugs().len(), 20);
        assert_eq!(engine.initial_bug_count(), 20);
        assert_eq!(engine.trees().len(), 3);
        assert_eq!(engine.trees()[0].position(), Position::new(20.0, 20.0));
        assert_eq!(engine.pesticides().len(), 2);
        assert_eq!(engine.pesticides()[0].position(), Position::new(50.0, 50.0));
        assert!((engine.pesticides()[1].remaining_mass() - 100.0).abs() < 1e-12);
        for tree in engine.trees() {
            assert!((1..=4).contains(&tree.fruits().len()));
        }
        assert!(engine.bugs().iter().all(|b| engine.field().contains(b.position())));
        assert!(!engine.climate().is_forecast());
    }

    #[test]
    fn invalid_config_fails_before_building() {
        let config = SimulationConfig::parse("bugs: { count: 0 }").unwrap();
        assert!(matches!(
            SimulationEngine::new(&config),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn oversized_forecast_run_is_rejected_not_allocated() {
        let config = SimulationConfig::parse(
            r"
run: { max_hours: 18446744073709551000 }
environment: { climate: { backend: forecast } }
",
        )
        .unwrap();
        assert!(matches!(
            SimulationEngine::new(&config),
            Err(EngineError::Config { .. })
        ));
    }

    #[test]
    fn same_seed_gives_same_run() {
        let mut a = SimulationEngine::new(&small_config()).unwrap();
        let mut b = SimulationEngine::new(&small_config()).unwrap();
        for _ in 0..3 {
            assert_eq!(a.run_hour().unwrap(), b.run_hour().unwrap());
        }
        assert_eq!(a.bugs(), b.bugs());
    }

    #[test]
    fn hour_refreshes_field_once() {
        let mut engine = SimulationEngine::new(&small_config()).unwrap();
        let ticks_per_hour = u64::from(engine.clock().ticks_per_hour());
        let summary = engine.run_hour().unwrap();
        assert_eq!(summary.hour, 1);
        assert_eq!(engine.clock().tick(), ticks_per_hour);
        assert_eq!(engine.climate().refreshes(), 1);
    }

    #[test]
    fn only_the_last_tick_completes_an_hour() {
        let mut engine = SimulationEngine::new(&small_config()).unwrap();
        let ticks_per_hour = engine.clock().ticks_per_hour();
        for _ in 1..ticks_per_hour {
            assert!(!engine.tick().unwrap().hour_completed);
        }
        assert!(engine.tick().unwrap().hour_completed);
    }

    #[test]
    fn forecast_backend_keeps_window_length() {
        let config = SimulationConfig::parse(
            r"
environment:
  starting_index: 12
  sequence_length: 6
  climate: { backend: forecast }
bugs: { count: 5 }
",
        )
        .unwrap();
        let mut engine = SimulationEngine::new(&config).unwrap();
        assert!(engine.climate().is_forecast());
        engine.run_hour().unwrap();
        engine.run_hour().unwrap();
        assert_eq!(engine.climate().window_len(Quantity::Temperature), 6);
        assert_eq!(engine.climate().window_len(Quantity::Humidity), 6);
        assert_eq!(engine.climate().refreshes(), 2);
    }

    #[test]
    fn replay_forecaster_runs_from_synthetic_history() {
        let config = SimulationConfig::parse(
            r"
run: { max_hours: 3 }
environment:
  climate: { backend: forecast, forecaster: replay }
bugs: { count: 5 }
",
        )
        .unwrap();
        let mut engine = SimulationEngine::new(&config).unwrap();
        for _ in 0..3 {
            engine.run_hour().unwrap();
        }
        assert_eq!(engine.clock().hour(), 3);
    }

    #[test]
    fn report_reflects_tallies() {
        let mut engine = SimulationEngine::new(&small_config()).unwrap();
        engine.run_hour().unwrap();
        let report = engine.report(SimulationEndReason::MaxHoursReached);
        assert_eq!(report.hours_elapsed, 1);
        assert_eq!(
            report.bugs_survived + report.bugs_escaped + report.bug_deaths,
            engine.initial_bug_count()
        );
        assert!(report.max_pesticide_radius >= 1.0);
    }
}
