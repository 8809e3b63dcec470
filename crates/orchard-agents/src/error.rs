//! Error types for the `orchard-agents` crate.
//!
//! Agents validate their parameters at construction. Once built, every
//! per-tick update is infallible: numeric edge cases are guarded rather
//! than raised.

/// Errors that can occur while constructing agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A parameter is outside its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A position has a non-finite coordinate.
    #[error("non-finite position for {entity}")]
    NonFinitePosition {
        /// Which kind of entity was being placed.
        entity: &'static str,
    },
}

/// Check that `value` is a probability in `[0, 1]`.
pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), AgentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter {
            name,
            reason: format!("{value} is not a probability in [0, 1]"),
        })
    }
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter {
            name,
            reason: format!("{value} must be a positive finite number"),
        })
    }
}

/// Check that `value` is finite and non-negative.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), AgentError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AgentError::InvalidParameter {
            name,
            reason: format!("{value} must be a non-negative finite number"),
        })
    }
}
