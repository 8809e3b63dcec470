//! Simulation clock, tick cycle, and run loop for the Orchard simulation.
//!
//! This crate owns the nested time loop: sub-hour ticks advance pesticide,
//! bugs, and fruit; hourly ticks refresh the climate field.
//!
//! # Modules
//!
//! - [`clock`] -- Tick and hour counters, calendar timestamp, time of day.
//! - [`config`] -- Configuration loading from `orchard-config.yaml` into
//!   strongly-typed, validated structs.
//! - [`engine`] -- [`SimulationEngine`]: construction and the five-step tick.
//! - [`runner`] -- [`run_simulation`], termination, and the [`RunReport`].
//!
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`run_simulation`]: runner::run_simulation
//! [`RunReport`]: runner::RunReport

pub mod clock;
pub mod config;
pub mod engine;
pub mod runner;

pub use clock::{ClockError, SimulationClock};
pub use config::{ConfigError, SimulationConfig};
pub use engine::{EngineError, HourSummary, SimulationEngine, TickSummary};
pub use runner::{
    HourObserver, NoOpObserver, RunReport, SimulationEndReason, run_config, run_simulation,
};
