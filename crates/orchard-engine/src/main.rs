//! Orchard Engine binary.
//!
//! Loads configuration, builds the simulation engine, runs it until a
//! termination condition holds, and writes the run report as JSON to
//! stdout.
//!
//! # Usage
//!
//! ```text
//! orchard-engine [CONFIG.yaml] [HISTORY.json]
//! ```
//!
//! Without a config argument, `orchard-config.yaml` in the working
//! directory is used when present and defaults otherwise. A history file
//! feeds the forecast climate backend; without one a synthetic history is
//! generated from the configured sensor readings.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration
//! 3. Load the optional climate history
//! 4. Build the engine (field, trees, pesticide, bugs)
//! 5. Run the simulation loop
//! 6. Print the report

mod error;
mod timeline;

use std::io::Write;
use std::path::{Path, PathBuf};

use orchard_core::{HourSummary, RunReport, SimulationConfig, SimulationEngine, run_simulation};
use orchard_world::ClimateHistory;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::timeline::TimelineObserver;

/// Default configuration file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "orchard-config.yaml";

/// Document written to stdout at the end of a run.
#[derive(Debug, Serialize)]
struct RunOutput {
    report: RunReport,
    hours: Vec<HourSummary>,
}

fn main() -> Result<(), AppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Orchard Engine starting");

    let mut args = std::env::args().skip(1);
    let config_arg = args.next().map(PathBuf::from);
    let history_arg = args.next().map(PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(AppError::Usage {
            message: format!(
                "unexpected argument {extra:?}; expected [CONFIG.yaml] [HISTORY.json]"
            ),
        });
    }

    // 2. Load configuration.
    let config = load_config(config_arg.as_deref())?;
    info!(
        seed = config.run.seed,
        max_hours = config.run.max_hours,
        bugs = config.bugs.count,
        trees = config.trees.count,
        pesticides = config.pesticide.count,
        time_step_minutes = config.environment.time_step_minutes,
        "Configuration loaded"
    );

    // 3-4. Load history and build the engine.
    let mut engine = match history_arg {
        Some(path) => {
            let history = load_history(&path)?;
            info!(
                path = %path.display(),
                hours = history.temperature.len(),
                "Climate history loaded"
            );
            SimulationEngine::with_history(&config, &history)?
        }
        None => SimulationEngine::new(&config)?,
    };

    // 5. Run.
    let mut timeline = TimelineObserver::new();
    let report = run_simulation(&mut engine, &mut timeline)?;

    // 6. Report.
    info!(hours_recorded = timeline.hours().len(), "Writing run report");
    let output = RunOutput {
        report,
        hours: timeline.into_hours(),
    };
    let json = serde_json::to_string_pretty(&output)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").map_err(|source| AppError::Output { source })?;

    info!("Orchard Engine shutdown complete");
    Ok(())
}

/// Load the simulation config from `path`, or from the default location.
///
/// An explicit path must exist. The default path falls back to built-in
/// defaults when missing.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, AppError> {
    if let Some(path) = path {
        return Ok(SimulationConfig::from_file(path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        Ok(SimulationConfig::from_file(default_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

/// Read a JSON climate history.
fn load_history(path: &Path) -> Result<ClimateHistory, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::HistoryRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| AppError::HistoryParse {
        path: path.to_path_buf(),
        source,
    })
}
