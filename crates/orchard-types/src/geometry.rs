//! Planar geometry for the orchard domain.
//!
//! Positions are real-valued metres. They are not bound to a lattice;
//! only field lookups truncate them to integer cell indices.

use serde::{Deserialize, Serialize};

/// A point in the orchard plane, in metres.
///
/// Serializes as a two-element array `[x, y]` so configuration files can
/// list positions compactly.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// Horizontal coordinate in metres.
    pub x: f64,
    /// Vertical coordinate in metres.
    pub y: f64,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Displacement vector `(other - self)`.
    pub fn offset_to(self, other: Self) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    /// Translate by a vector.
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether both coordinates are finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Prevailing wind over the orchard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Direction the wind blows toward. Normalised to unit length by
    /// configuration validation.
    pub direction: [f64; 2],
    /// Wind speed in metres per minute of simulated time.
    pub speed: f64,
}

impl Wind {
    /// Create a wind with the direction normalised to unit length.
    ///
    /// Returns `None` if the direction has zero or non-finite length, or
    /// the speed is negative or non-finite.
    pub fn new(direction: [f64; 2], speed: f64) -> Option<Self> {
        let [dx, dy] = direction;
        let norm = dx.hypot(dy);
        if !norm.is_finite() || norm <= 0.0 || !speed.is_finite() || speed < 0.0 {
            return None;
        }
        Some(Self {
            direction: [dx / norm, dy / norm],
            speed,
        })
    }
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            direction: [1.0, 0.0],
            speed: 1.0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = Position::new(12.5, -3.0);
        assert_eq!(p.distance_to(p), 0.0);
    }

    #[test]
    fn position_round_trips_as_array() {
        let p = Position::new(1.5, 30.0);
        let json = serde_json::to_string(&p).unwrap_or_default();
        assert_eq!(json, "[1.5,30.0]");
        let back: Position = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back, p);
    }

    #[test]
    fn wind_direction_is_normalised() {
        let wind = Wind::new([3.0, 4.0], 2.0);
        assert!(wind.is_some());
        let wind = wind.unwrap_or_default();
        assert!((wind.direction[0] - 0.6).abs() < 1e-12);
        assert!((wind.direction[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn zero_wind_direction_is_rejected() {
        assert!(Wind::new([0.0, 0.0], 1.0).is_none());
    }
}
