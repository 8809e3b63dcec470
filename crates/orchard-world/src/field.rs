//! Inverse-distance-weighted scalar grids.
//!
//! A [`SpatialField`] covers a fixed `width x height` domain with one value
//! per integer cell. Cell `(i, j)` is sampled at the integer point `(i, j)`,
//! its lower-left corner, and estimated from the full observation set:
//!
//! ```text
//! value(p) = sum(w_i * v_i) / sum(w_i),   w_i = 1 / distance(p, p_i)^power
//! ```
//!
//! A query point that coincides exactly with an observation returns that
//! observation's value, which both avoids the division by zero and keeps
//! lookups exact at sensor locations.
//!
//! Point lookups truncate real coordinates to cell indices. Coordinates
//! outside the domain are clamped to the nearest edge cell.

use orchard_types::{Observation, Position, Quantity};

use crate::error::WorldError;

/// Default IDW power exponent.
pub const DEFAULT_IDW_POWER: f64 = 2.0;

/// Dense interpolated grid for a single quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialField {
    /// Which quantity this grid carries.
    quantity: Quantity,
    /// Domain width in cells (metres).
    width: u32,
    /// Domain height in cells (metres).
    height: u32,
    /// IDW power exponent used to build the grid.
    power: f64,
    /// Row-major cell values: index `y * width + x`.
    cells: Vec<f64>,
    /// The sparse observations the grid was built from.
    observations: Vec<Observation>,
}

impl SpatialField {
    /// Build a grid from sparse observations.
    ///
    /// # Errors
    ///
    /// - [`WorldError::EmptyObservations`] if `observations` is empty.
    /// - [`WorldError::InvalidDimensions`] if either dimension is zero.
    /// - [`WorldError::InvalidPower`] if `power` is not positive and finite.
    /// - [`WorldError::NonFiniteObservation`] if any observation has a
    ///   non-finite coordinate or value.
    pub fn build(
        quantity: Quantity,
        observations: &[Observation],
        width: u32,
        height: u32,
        power: f64,
    ) -> Result<Self, WorldError> {
        if observations.is_empty() {
            return Err(WorldError::EmptyObservations);
        }
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        if !power.is_finite() || power <= 0.0 {
            return Err(WorldError::InvalidPower(power));
        }
        if observations
            .iter()
            .any(|o| !o.position.is_finite() || !o.value.is_finite())
        {
            return Err(WorldError::NonFiniteObservation { quantity });
        }

        let cell_count = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .map_err(|_err| WorldError::InvalidDimensions { width, height })?;

        let mut cells = Vec::with_capacity(cell_count);
        for y in 0..height {
            for x in 0..width {
                let point = Position::new(f64::from(x), f64::from(y));
                cells.push(interpolate(observations, point, power));
            }
        }

        Ok(Self {
            quantity,
            width,
            height,
            power,
            cells,
            observations: observations.to_vec(),
        })
    }

    /// Look up the field value at a real-valued point.
    ///
    /// An exact hit on an observation returns the observed value; any
    /// other point reads the cell at the truncated coordinates, clamped
    /// into the domain.
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        if let Some(hit) = self
            .observations
            .iter()
            .find(|o| Position::new(x, y).distance_to(o.position) <= 0.0)
        {
            return hit.value;
        }
        self.cells
            .get(self.cell_index(x, y))
            .copied()
            .unwrap_or_else(|| interpolate(&self.observations, Position::new(x, y), self.power))
    }

    /// Look up the field value at a position.
    pub fn value_at_position(&self, position: Position) -> f64 {
        self.value_at(position.x, position.y)
    }

    /// Whether a point lies inside the domain `[0, width) x [0, height)`.
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < f64::from(self.width)
            && position.y < f64::from(self.height)
    }

    /// Return a new field with `f` applied to every cell and observation.
    ///
    /// IDW is linear in the observation values, so scaling the grid is the
    /// same as rebuilding it from scaled observations.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            quantity: self.quantity,
            width: self.width,
            height: self.height,
            power: self.power,
            cells: self.cells.iter().map(|&v| f(v)).collect(),
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.position, f(o.value)))
                .collect(),
        }
    }

    /// The quantity this field carries.
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Domain width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Domain height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The IDW power exponent.
    pub const fn power(&self) -> f64 {
        self.power
    }

    /// The observations the field was built from.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Smallest cell value.
    pub fn min(&self) -> f64 {
        self.cells.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest cell value.
    pub fn max(&self) -> f64 {
        self.cells.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Row-major cell index for a point, clamped into the domain.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_index(&self, x: f64, y: f64) -> usize {
        let max_x = f64::from(self.width.saturating_sub(1));
        let max_y = f64::from(self.height.saturating_sub(1));
        // Clamped to [0, dim - 1] so the casts cannot truncate or wrap.
        let cx = x.clamp(0.0, max_x).trunc() as u32;
        let cy = y.clamp(0.0, max_y).trunc() as u32;
        let index = u64::from(cy)
            .saturating_mul(u64::from(self.width))
            .saturating_add(u64::from(cx));
        usize::try_from(index).unwrap_or(usize::MAX)
    }
}

/// IDW estimate at a single point.
///
/// Returns the observation value directly when `point` coincides with an
/// observation. `observations` must be non-empty; an empty slice yields NaN.
pub fn interpolate(observations: &[Observation], point: Position, power: f64) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for obs in observations {
        let distance = point.distance_to(obs.position);
        if distance <= 0.0 {
            return obs.value;
        }
        let weight = 1.0 / distance.powf(power);
        weighted_sum += weight * obs.value;
        weight_total += weight;
    }
    weighted_sum / weight_total
}
