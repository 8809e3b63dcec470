//! Bug, fruit, tree, and pesticide agents for the Orchard simulation.
//!
//! Agents are plain data records with explicit update functions. The
//! engine owns every collection and calls these functions once per tick;
//! an agent only ever mutates its own state, never the collection that
//! holds it.
//!
//! # Modules
//!
//! - [`bug`] -- [`BugAgent`]: multi-force movement gated by temperature
//!   suitability, terminal dead/escaped states.
//! - [`config`] -- Tunable parameters ([`MovementParams`], [`FruitParams`],
//!   [`PesticideParams`]).
//! - [`error`] -- Error types for agent construction ([`AgentError`]).
//! - [`fruit`] -- [`FruitAgent`]: climate-driven ripeness countdown and
//!   bug punctures.
//! - [`pesticide`] -- [`PesticideSource`]: dispersion, decay, Gaussian
//!   concentration, and lethality trials.
//! - [`tree`] -- [`TreeAgent`]: fixed owner of a fruit collection.
//!
//! [`BugAgent`]: bug::BugAgent
//! [`MovementParams`]: config::MovementParams
//! [`FruitParams`]: config::FruitParams
//! [`PesticideParams`]: config::PesticideParams
//! [`AgentError`]: error::AgentError
//! [`FruitAgent`]: fruit::FruitAgent
//! [`PesticideSource`]: pesticide::PesticideSource
//! [`TreeAgent`]: tree::TreeAgent

pub mod bug;
pub mod config;
pub mod error;
pub mod fruit;
pub mod pesticide;
pub mod tree;

// Re-export primary types at crate root for convenience.
pub use bug::{BugAgent, BugStatus, FORCE_EPSILON, MoveOutcome, Surroundings};
pub use config::{FruitParams, MovementParams, PesticideParams};
pub use error::AgentError;
pub use fruit::FruitAgent;
pub use pesticide::{DISSIPATION_THRESHOLD, PesticideSource};
pub use tree::TreeAgent;
