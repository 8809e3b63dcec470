//! Hour observer that logs progress and keeps the hourly time series.
//!
//! Each completed hour is logged at `info` and its [`HourSummary`] is kept
//! so the binary can emit the full series next to the run report.

use orchard_core::{HourObserver, HourSummary, SimulationEngine};
use tracing::info;

/// Records every [`HourSummary`] of a run.
#[derive(Debug, Default)]
pub struct TimelineObserver {
    hours: Vec<HourSummary>,
}

impl TimelineObserver {
    /// Create an empty timeline.
    pub const fn new() -> Self {
        Self { hours: Vec::new() }
    }

    /// Recorded summaries, oldest first.
    pub fn hours(&self) -> &[HourSummary] {
        &self.hours
    }

    /// Consume the observer and return the recorded summaries.
    pub fn into_hours(self) -> Vec<HourSummary> {
        self.hours
    }
}

impl HourObserver for TimelineObserver {
    fn on_hour(&mut self, summary: &HourSummary, engine: &SimulationEngine) {
        info!(
            hour = summary.hour,
            timestamp = %summary.timestamp,
            time_of_day = ?summary.time_of_day,
            alive = summary.bugs_alive,
            deaths = summary.deaths_this_hour,
            escapes = summary.escapes_this_hour,
            active_pesticides = summary.active_pesticides,
            initial = engine.initial_bug_count(),
            "Hour recorded"
        );
        self.hours.push(summary.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use orchard_core::{SimulationConfig, run_simulation};

    use super::*;

    #[test]
    fn records_one_summary_per_hour() {
        let config = SimulationConfig::parse(
            "run: { max_hours: 4 }\nbugs: { count: 8 }\npesticide: { mortality_probability: 0.0 }\n",
        )
        .unwrap();
        let mut engine = SimulationEngine::new(&config).unwrap();
        let mut timeline = TimelineObserver::new();
        let report = run_simulation(&mut engine, &mut timeline).unwrap();

        assert_eq!(timeline.hours().len(), 4);
        assert_eq!(u64::try_from(timeline.hours().len()).unwrap(), report.hours_elapsed);
        let hours: Vec<u64> = timeline.into_hours().iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![1, 2, 3, 4]);
    }
}
