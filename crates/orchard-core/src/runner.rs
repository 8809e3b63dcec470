//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], which drives the engine one
//! simulated hour at a time until a termination condition holds:
//!
//! - **Pesticide dissipated**: no source has mass remaining.
//! - **Population cleared**: no live bug is left.
//! - **Hour bound**: `run.max_hours` hours have elapsed.
//!
//! Conditions are checked once per completed hour, never per sub-tick.
//! The runner returns the structured [`RunReport`]; persisting it is up to
//! the caller.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::engine::{EngineError, HourSummary, SimulationEngine};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// Every pesticide source dissipated.
    PesticideDissipated,
    /// No live bug remains.
    PopulationCleared,
    /// Reached the configured `max_hours` bound.
    MaxHoursReached,
}

/// Structured output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Bugs still alive and inside the field.
    pub bugs_survived: u32,
    /// Bugs that left the field.
    pub bugs_escaped: u32,
    /// Bugs killed by pesticide.
    pub bug_deaths: u32,
    /// Simulated hours completed.
    pub hours_elapsed: u64,
    /// Sub-hour ticks completed.
    pub ticks_elapsed: u64,
    /// Largest pesticide radius observed during the run, metres.
    pub max_pesticide_radius: f64,
    /// Fruits that rotted during the run.
    pub fruits_rotten: u32,
    /// Fruits still hanging at the end.
    pub fruits_remaining: u32,
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
}

/// Callback invoked after each simulated hour completes.
///
/// Implementations can use this to feed a display or collect time series.
pub trait HourObserver {
    /// Called after an hour completes and the field has been refreshed.
    fn on_hour(&mut self, summary: &HourSummary, engine: &SimulationEngine);
}

/// A no-op hour observer.
pub struct NoOpObserver;

impl HourObserver for NoOpObserver {
    fn on_hour(&mut self, _summary: &HourSummary, _engine: &SimulationEngine) {}
}

/// Run the engine until a termination condition holds.
///
/// # Errors
///
/// Returns [`EngineError`] if a tick fails. Mid-run faults are not
/// recovered; the run is abandoned.
pub fn run_simulation(
    engine: &mut SimulationEngine,
    observer: &mut dyn HourObserver,
) -> Result<RunReport, EngineError> {
    info!(
        bugs = engine.bugs_alive(),
        pesticides = engine.pesticides().len(),
        ticks_per_hour = engine.clock().ticks_per_hour(),
        "Simulation starting"
    );

    loop {
        let summary = engine.run_hour()?;
        observer.on_hour(&summary, engine);

        if let Some(reason) = engine.termination() {
            let report = engine.report(reason);
            log_simulation_end(&report);
            return Ok(report);
        }
    }
}

/// Build an engine from configuration and run it to completion.
///
/// # Errors
///
/// Returns [`EngineError`] if the configuration is invalid or the run
/// fails.
pub fn run_config(config: &SimulationConfig) -> Result<RunReport, EngineError> {
    let mut engine = SimulationEngine::new(config)?;
    run_simulation(&mut engine, &mut NoOpObserver)
}

/// Log the end of a run.
pub fn log_simulation_end(report: &RunReport) {
    info!(
        reason = ?report.end_reason,
        hours = report.hours_elapsed,
        survived = report.bugs_survived,
        escaped = report.bugs_escaped,
        deaths = report.bug_deaths,
        max_radius = report.max_pesticide_radius,
        "Simulation ended"
    );
}
