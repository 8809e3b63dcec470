//! Climate field interpolation and forecasting for the Orchard simulation.
//!
//! This crate models the physical environment the agents read from:
//! dense temperature and humidity grids interpolated from a sparse set of
//! sensors, and the hourly refresh that keeps those grids current.
//!
//! # Modules
//!
//! - [`field`] -- [`SpatialField`]: inverse-distance-weighted grid over the
//!   orchard domain with exact lookups at sensor locations.
//! - [`climate`] -- [`ClimateField`] (temperature + humidity pair),
//!   [`Sensor`] placement, and [`ClimateModel`] with its diurnal and
//!   forecast refresh backends.
//! - [`forecast`] -- [`ClimateForecaster`] trait, [`ClimateHistory`],
//!   [`MinMaxScaler`], and the bundled replay and trend forecasters.
//! - [`error`] -- Error types for field construction and refresh.
//!
//! [`SpatialField`]: field::SpatialField
//! [`ClimateField`]: climate::ClimateField
//! [`Sensor`]: climate::Sensor
//! [`ClimateModel`]: climate::ClimateModel
//! [`ClimateForecaster`]: forecast::ClimateForecaster
//! [`ClimateHistory`]: forecast::ClimateHistory
//! [`MinMaxScaler`]: forecast::MinMaxScaler

pub mod climate;
pub mod error;
pub mod field;
pub mod forecast;

// Re-export primary types at crate root.
pub use climate::{
    ClimateBackend, ClimateField, ClimateModel, DiurnalProfile, ForecastBackend, Sensor,
    SensorReading,
};
pub use error::{ForecastError, WorldError};
pub use field::{DEFAULT_IDW_POWER, SpatialField};
pub use forecast::{
    ClimateForecaster, ClimateHistory, MinMaxScaler, ReplayForecaster, TrendForecaster,
};
