//! Pesticide dispersal units.
//!
//! Each [`PesticideSource`] sits at a fixed position and evolves under a
//! simplified atmospheric-dispersion approximation:
//!
//! - **Spread** -- the radius grows by a wind-driven term plus a turbulent
//!   diffusion term, both modulated by temperature and humidity.
//! - **Decay** -- the remaining mass decays exponentially at a rate that the
//!   same climate factors modulate.
//! - **Dissipation** -- once the mass falls below [`DISSIPATION_THRESHOLD`]
//!   it snaps to zero and the source is frozen for the rest of the run.
//!
//! Concentration is a 2-D Gaussian centred on the source with
//! `sigma = radius / 2`, cut off at the radius. Lethality is a Bernoulli
//! trial weighted by concentration, so the chance of a hit degrades
//! smoothly with distance and elapsed time.
//!
//! Both climate factors are floored at zero before use, which keeps the
//! radius non-decreasing and the mass non-increasing in every climate.

use std::f64::consts::PI;

use orchard_types::{PesticideId, Position, Wind};
use rand::Rng;

use crate::bug::BugAgent;
use crate::config::PesticideParams;
use crate::error::{AgentError, check_non_negative};

/// Mass in grams below which a source is considered dissipated.
pub const DISSIPATION_THRESHOLD: f64 = 0.01;

/// Fraction of wind travel converted into radius growth.
const WIND_SPREAD_COEFFICIENT: f64 = 0.15;

/// Smallest Gaussian spread used for concentration, in metres.
const MIN_SIGMA: f64 = 1e-6;

/// One deployed dispersal unit.
#[derive(Debug, Clone, PartialEq)]
pub struct PesticideSource {
    /// Source identifier.
    id: PesticideId,
    /// Where the unit was deployed. Immutable after creation.
    position: Position,
    /// Current dispersion radius in metres.
    radius: f64,
    /// Remaining active mass in grams.
    remaining_mass: f64,
    /// Exponential decay rate per minute.
    decay_factor: f64,
    /// Concentration-to-kill-probability scale.
    mortality_probability: f64,
    /// Concentration-to-repulsion scale.
    repulsion_probability: f64,
}

impl PesticideSource {
    /// Deploy a source.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the position is not finite, the mass or
    /// radius is negative, or any parameter is out of range.
    pub fn new(
        id: PesticideId,
        position: Position,
        mass_grams: f64,
        initial_radius: f64,
        params: &PesticideParams,
    ) -> Result<Self, AgentError> {
        if !position.is_finite() {
            return Err(AgentError::NonFinitePosition { entity: "pesticide" });
        }
        check_non_negative("pesticide.mass", mass_grams)?;
        check_non_negative("pesticide.initial_radius", initial_radius)?;
        params.validate()?;

        let remaining_mass = if mass_grams < DISSIPATION_THRESHOLD {
            0.0
        } else {
            mass_grams
        };
        Ok(Self {
            id,
            position,
            radius: initial_radius,
            remaining_mass,
            decay_factor: params.decay_factor,
            mortality_probability: params.mortality_probability,
            repulsion_probability: params.repulsion_probability,
        })
    }

    /// Advance dispersion and decay by `time_step` minutes.
    ///
    /// `temperature` and `humidity` are the field values at the source.
    /// Does nothing once the source has dissipated. Returns `true` if the
    /// source dissipated during this call.
    pub fn spread(&mut self, wind: &Wind, temperature: f64, humidity: f64, time_step: f64) -> bool {
        if self.is_dissipated() {
            return false;
        }
        let climate = climate_factor(temperature, humidity);

        let growth = (wind.speed * time_step * WIND_SPREAD_COEFFICIENT)
            .mul_add(climate, time_step.max(0.0).sqrt());
        if growth.is_finite() && growth > 0.0 {
            self.radius += growth;
        }

        let exponent = self.decay_factor * time_step * climate;
        if exponent.is_finite() && exponent > 0.0 {
            self.remaining_mass *= (-exponent).exp();
        }

        if self.remaining_mass < DISSIPATION_THRESHOLD {
            self.remaining_mass = 0.0;
            return true;
        }
        false
    }

    /// Concentration at a point.
    ///
    /// Zero once dissipated or beyond the radius; otherwise
    /// `mass / (2 pi sigma^2) * exp(-d^2 / (2 sigma^2))` with
    /// `sigma = radius / 2`.
    pub fn concentration_at(&self, point: Position) -> f64 {
        if self.is_dissipated() {
            return 0.0;
        }
        let distance = self.position.distance_to(point);
        if distance > self.radius {
            return 0.0;
        }
        let sigma = (self.radius / 2.0).max(MIN_SIGMA);
        let two_sigma_sq = 2.0 * sigma * sigma;
        self.remaining_mass / (PI * two_sigma_sq) * (-(distance * distance) / two_sigma_sq).exp()
    }

    /// Strength with which the source repels a bug standing at `point`.
    pub fn repulsion_strength(&self, point: Position) -> f64 {
        self.concentration_at(point) * self.repulsion_probability
    }

    /// Lethality trial against a bug.
    ///
    /// Draws one uniform number and reports a hit iff
    /// `concentration * mortality_probability > draw`.
    pub fn affects(&self, bug: &BugAgent, rng: &mut impl Rng) -> bool {
        let draw: f64 = rng.random();
        self.concentration_at(bug.position()) * self.mortality_probability > draw
    }

    /// Whether the mass has reached zero. Terminal.
    pub fn is_dissipated(&self) -> bool {
        self.remaining_mass <= 0.0
    }

    /// Source identifier.
    pub const fn id(&self) -> PesticideId {
        self.id
    }

    /// Deployment position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current radius in metres.
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Remaining mass in grams.
    pub const fn remaining_mass(&self) -> f64 {
        self.remaining_mass
    }
}

/// Combined temperature/humidity modulation, floored at zero.
///
/// `temp_factor = 1 + 0.02 (T - 25)`, `humidity_factor = 1 - 0.004 H`.
pub fn climate_factor(temperature: f64, humidity: f64) -> f64 {
    let temp_factor = 0.02_f64.mul_add(temperature - 25.0, 1.0).max(0.0);
    let humidity_factor = 0.004_f64.mul_add(-humidity, 1.0).max(0.0);
    temp_factor * humidity_factor
}
