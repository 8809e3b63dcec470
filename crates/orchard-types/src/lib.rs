//! Shared type definitions for the Orchard pest simulation.
//!
//! This crate holds the plain value types that flow between the climate
//! field, the agents, and the engine. Nothing here owns behavior beyond
//! small geometric helpers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe integer wrappers for entity identifiers
//! - [`geometry`] -- [`Position`], [`Wind`], and Euclidean distance
//! - [`climate`] -- Climate quantities, time of day, and hourly sensor records

pub mod climate;
pub mod geometry;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use climate::{HourlyRecord, Observation, Quantity, TimeOfDay};
pub use geometry::{Position, Wind};
pub use ids::{BugId, FruitId, PesticideId, SensorId, TreeId};
