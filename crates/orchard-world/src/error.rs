//! Error types for the `orchard-world` crate.
//!
//! Field construction problems surface as [`WorldError`]; failures of the
//! external forecaster surface as [`ForecastError`] and are wrapped into
//! [`WorldError::Forecast`] when they happen during a refresh.

use orchard_types::Quantity;

/// Errors that can occur while building or refreshing the climate field.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A field was requested from an empty observation set.
    #[error("cannot build a field from an empty observation set")]
    EmptyObservations,

    /// The domain has a zero dimension or too many cells.
    #[error("invalid field dimensions {width}x{height}")]
    InvalidDimensions {
        /// Domain width in cells.
        width: u32,
        /// Domain height in cells.
        height: u32,
    },

    /// The IDW power exponent is not a positive finite number.
    #[error("invalid IDW power exponent: {0}")]
    InvalidPower(f64),

    /// An observation has a non-finite coordinate or value.
    #[error("non-finite observation for {quantity}")]
    NonFiniteObservation {
        /// The quantity being built.
        quantity: Quantity,
    },

    /// A reading vector does not have one entry per sensor.
    #[error("{quantity} has {actual} readings but {expected} sensors are deployed")]
    SensorCountMismatch {
        /// The quantity being built.
        quantity: Quantity,
        /// Number of sensors.
        expected: usize,
        /// Number of readings supplied.
        actual: usize,
    },

    /// The forecaster failed during an hourly refresh.
    #[error("forecast failed: {source}")]
    Forecast {
        /// The underlying forecaster error.
        #[from]
        source: ForecastError,
    },
}

/// Errors reported by a [`ClimateForecaster`].
///
/// [`ClimateForecaster`]: crate::forecast::ClimateForecaster
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The forecaster could not be reached or refused to answer.
    #[error("forecaster unavailable: {reason}")]
    Unavailable {
        /// Explanation from the forecaster.
        reason: String,
    },

    /// The historical window is shorter than the forecaster needs.
    #[error("historical window too short: need {required} records, have {actual}")]
    WindowTooShort {
        /// Records required.
        required: usize,
        /// Records supplied.
        actual: usize,
    },

    /// The historical window is inconsistent (ragged rows, bad values).
    #[error("malformed historical window: {reason}")]
    MalformedWindow {
        /// What is wrong with the window.
        reason: String,
    },

    /// A replayed series has no record at the requested index.
    #[error("{quantity} history exhausted at index {index}")]
    HistoryExhausted {
        /// The quantity being replayed.
        quantity: Quantity,
        /// The missing index.
        index: usize,
    },
}
