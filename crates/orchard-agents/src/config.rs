//! Tunable parameters for agent behavior.
//!
//! Each struct bundles the constants one agent kind needs so callers
//! (engine, tests) can override defaults. All structs deserialize with
//! per-field defaults, so a configuration file only has to name what it
//! changes.

use serde::Deserialize;

use crate::error::{AgentError, check_non_negative, check_positive, check_probability};

/// Temperature-gated movement parameters for bugs.
///
/// Move probability follows a Gaussian suitability curve:
///
/// ```text
/// p = p_min + (p_max - p_min) * exp(-(T - optimal_temperature)^2 / (2 * sigma^2))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementParams {
    /// Move probability at the optimal temperature (default: 0.9).
    pub p_max: f64,
    /// Move probability far from the optimum (default: 0.2).
    pub p_min: f64,
    /// Temperature of peak activity in degrees Celsius (default: 22).
    pub optimal_temperature: f64,
    /// Spread of the suitability curve in degrees (default: 3).
    pub sigma: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            p_max: 0.9,
            p_min: 0.2,
            optimal_temperature: 22.0,
            sigma: 3.0,
        }
    }
}

impl MovementParams {
    /// Validate ranges.
    pub fn validate(&self) -> Result<(), AgentError> {
        check_probability("movement.p_max", self.p_max)?;
        check_probability("movement.p_min", self.p_min)?;
        if self.p_min > self.p_max {
            return Err(AgentError::InvalidParameter {
                name: "movement.p_min",
                reason: format!("{} exceeds p_max {}", self.p_min, self.p_max),
            });
        }
        if !self.optimal_temperature.is_finite() {
            return Err(AgentError::InvalidParameter {
                name: "movement.optimal_temperature",
                reason: "must be finite".to_owned(),
            });
        }
        check_positive("movement.sigma", self.sigma)
    }

    /// Move probability at temperature `t`.
    pub fn move_probability(&self, t: f64) -> f64 {
        let deviation = t - self.optimal_temperature;
        let suitability = (-(deviation * deviation) / (2.0 * self.sigma * self.sigma)).exp();
        (self.p_max - self.p_min).mul_add(suitability, self.p_min)
    }
}

/// Fruit ripening and puncture parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FruitParams {
    /// Range of initial ripeness life units `[min, max]` (default: 100--300).
    pub ripeness_range: [f64; 2],
    /// Punctures a fruit tolerates before rotting (default: 5).
    pub bite_tolerance: u32,
    /// Distance within which a bug can puncture a fruit, metres (default: 2).
    pub puncture_radius: f64,
    /// Chance a bug in range punctures a fruit per tick (default: 0.6).
    pub puncture_probability: f64,
}

impl Default for FruitParams {
    fn default() -> Self {
        Self {
            ripeness_range: [100.0, 300.0],
            bite_tolerance: 5,
            puncture_radius: 2.0,
            puncture_probability: 0.6,
        }
    }
}

impl FruitParams {
    /// Validate ranges.
    pub fn validate(&self) -> Result<(), AgentError> {
        let [lo, hi] = self.ripeness_range;
        check_positive("fruit.ripeness_range", lo)?;
        check_positive("fruit.ripeness_range", hi)?;
        if lo > hi {
            return Err(AgentError::InvalidParameter {
                name: "fruit.ripeness_range",
                reason: format!("lower bound {lo} exceeds upper bound {hi}"),
            });
        }
        check_non_negative("fruit.puncture_radius", self.puncture_radius)?;
        check_probability("fruit.puncture_probability", self.puncture_probability)
    }
}

/// Per-source pesticide parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PesticideParams {
    /// Exponential mass decay rate per minute (default: 0.0025).
    pub decay_factor: f64,
    /// Scales concentration into a per-tick kill probability (default: 0.5).
    pub mortality_probability: f64,
    /// Scales concentration into repulsion strength (default: 0.5).
    pub repulsion_probability: f64,
}

impl Default for PesticideParams {
    fn default() -> Self {
        Self {
            decay_factor: 0.0025,
            mortality_probability: 0.5,
            repulsion_probability: 0.5,
        }
    }
}

impl PesticideParams {
    /// Validate ranges.
    pub fn validate(&self) -> Result<(), AgentError> {
        check_non_negative("pesticide.decay_factor", self.decay_factor)?;
        check_probability("pesticide.mortality_probability", self.mortality_probability)?;
        check_probability("pesticide.repulsion_probability", self.repulsion_probability)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MovementParams::default().validate().is_ok());
        assert!(FruitParams::default().validate().is_ok());
        assert!(PesticideParams::default().validate().is_ok());
    }

    #[test]
    fn move_probability_peaks_at_optimum() {
        let params = MovementParams::default();
        assert!((params.move_probability(22.0) - 0.9).abs() < 1e-12);
        assert!(params.move_probability(25.0) < 0.9);
        assert!(params.move_probability(19.0) < 0.9);
        // Symmetric around the optimum.
        assert!((params.move_probability(25.0) - params.move_probability(19.0)).abs() < 1e-12);
    }

    #[test]
    fn move_probability_floors_at_p_min() {
        let params = MovementParams::default();
        let far = params.move_probability(-40.0);
        assert!(far >= 0.2);
        assert!((far - 0.2).abs() < 1e-9);
    }

    #[test]
    fn inverted_probabilities_are_rejected() {
        let params = MovementParams {
            p_max: 0.1,
            p_min: 0.5,
            ..MovementParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_sigma_is_rejected() {
        let params = MovementParams {
            sigma: 0.0,
            ..MovementParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn reversed_ripeness_range_is_rejected() {
        let params = FruitParams {
            ripeness_range: [10.0, 5.0],
            ..FruitParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn mortality_above_one_is_rejected() {
        let params = PesticideParams {
            mortality_probability: 1.5,
            ..PesticideParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let params: PesticideParams = serde_json::from_str(r#"{"decay_factor": 0.01}"#).unwrap();
        assert_eq!(params.decay_factor, 0.01);
        assert_eq!(params.mortality_probability, 0.5);
    }
}
