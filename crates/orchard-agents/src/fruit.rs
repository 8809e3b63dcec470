//! Fruit ripeness and puncture state.
//!
//! A fruit counts down its remaining ripeness at a climate-dependent rate
//! and collects punctures from nearby bugs. It rots, permanently, once the
//! countdown reaches zero or the punctures exceed its bite tolerance.

use orchard_types::{FruitId, Position};
use rand::Rng;

use crate::config::FruitParams;

/// Above this temperature ripeness drops at the fast rate.
const HOT_THRESHOLD: f64 = 30.0;
/// Below this temperature ripeness drops at the slow rate.
const COLD_THRESHOLD: f64 = 10.0;
/// Above this humidity every tick adds a puncture.
const HUMID_THRESHOLD: f64 = 80.0;

/// One fruit hanging on a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FruitAgent {
    id: FruitId,
    /// Position of the owning tree.
    position: Position,
    ripeness_remaining: f64,
    puncture_count: u32,
    bite_tolerance: u32,
    rotten: bool,
    /// Where the puncturing bugs stood.
    puncture_sites: Vec<Position>,
}

impl FruitAgent {
    /// Create a fresh fruit with a given ripeness budget.
    pub const fn new(id: FruitId, position: Position, ripeness: f64, params: &FruitParams) -> Self {
        Self {
            id,
            position,
            ripeness_remaining: ripeness,
            puncture_count: 0,
            bite_tolerance: params.bite_tolerance,
            rotten: ripeness <= 0.0,
            puncture_sites: Vec::new(),
        }
    }

    /// Create a fruit with ripeness drawn uniformly from
    /// `params.ripeness_range`.
    pub fn random(
        id: FruitId,
        position: Position,
        params: &FruitParams,
        rng: &mut impl Rng,
    ) -> Self {
        let [lo, hi] = params.ripeness_range;
        let ripeness = if hi > lo { rng.random_range(lo..=hi) } else { lo };
        Self::new(id, position, ripeness, params)
    }

    /// Advance ripening by one tick under the local climate.
    ///
    /// Ripeness drops by 2 above 30 C, by 0.5 below 10 C and by 1
    /// otherwise. Humidity above 80 % records an extra puncture.
    /// Returns `true` if the fruit rotted during this call.
    pub fn update_ripeness(&mut self, temperature: f64, humidity: f64) -> bool {
        if self.rotten {
            return false;
        }
        let decrement = if temperature > HOT_THRESHOLD {
            2.0
        } else if temperature < COLD_THRESHOLD {
            0.5
        } else {
            1.0
        };
        self.ripeness_remaining -= decrement;
        if humidity > HUMID_THRESHOLD {
            self.puncture_count = self.puncture_count.saturating_add(1);
        }
        self.check_rot()
    }

    /// Puncture trial from a bug standing at `bug_position`.
    ///
    /// A bug within `params.puncture_radius` punctures the fruit with
    /// probability `params.puncture_probability`. Bugs out of range draw
    /// nothing. Returns `true` if a puncture was recorded.
    pub fn puncture_by_bug(
        &mut self,
        bug_position: Position,
        params: &FruitParams,
        rng: &mut impl Rng,
    ) -> bool {
        if self.rotten || bug_position.distance_to(self.position) > params.puncture_radius {
            return false;
        }
        let draw: f64 = rng.random();
        if draw >= params.puncture_probability {
            return false;
        }
        self.puncture_count = self.puncture_count.saturating_add(1);
        self.puncture_sites.push(bug_position);
        self.check_rot();
        true
    }

    fn check_rot(&mut self) -> bool {
        if !self.rotten
            && (self.ripeness_remaining <= 0.0 || self.puncture_count > self.bite_tolerance)
        {
            self.rotten = true;
            return true;
        }
        false
    }

    /// Fruit identifier.
    pub const fn id(&self) -> FruitId {
        self.id
    }

    /// Position (that of the owning tree).
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Remaining ripeness life units.
    pub const fn ripeness_remaining(&self) -> f64 {
        self.ripeness_remaining
    }

    /// Punctures recorded so far.
    pub const fn puncture_count(&self) -> u32 {
        self.puncture_count
    }

    /// Punctures tolerated before rotting.
    pub const fn bite_tolerance(&self) -> u32 {
        self.bite_tolerance
    }

    /// Whether the fruit has rotted. Terminal.
    pub const fn is_rotten(&self) -> bool {
        self.rotten
    }

    /// Positions of the bugs that punctured this fruit.
    pub fn puncture_sites(&self) -> &[Position] {
        &self.puncture_sites
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn fruit(ripeness: f64) -> FruitAgent {
        FruitAgent::new(
            FruitId::new(0),
            Position::new(10.0, 10.0),
            ripeness,
            &FruitParams::default(),
        )
    }

    #[test]
    fn ripeness_rate_depends_on_temperature() {
        let mut hot = fruit(10.0);
        hot.update_ripeness(31.0, 50.0);
        assert_eq!(hot.ripeness_remaining(), 8.0);

        let mut cold = fruit(10.0);
        cold.update_ripeness(9.0, 50.0);
        assert_eq!(cold.ripeness_remaining(), 9.5);

        let mut mild = fruit(10.0);
        mild.update_ripeness(30.0, 50.0);
        assert_eq!(mild.ripeness_remaining(), 9.0);
    }

    #[test]
    fn humidity_adds_puncture() {
        let mut f = fruit(100.0);
        f.update_ripeness(20.0, 81.0);
        assert_eq!(f.puncture_count(), 1);
        f.update_ripeness(20.0, 80.0);
        assert_eq!(f.puncture_count(), 1);
    }

    #[test]
    fn rots_when_ripeness_runs_out() {
        let mut f = fruit(1.5);
        assert!(!f.update_ripeness(20.0, 50.0));
        assert!(f.update_ripeness(20.0, 50.0));
        assert!(f.is_rotten());
    }

    #[test]
    fn rots_when_punctures_exceed_tolerance() {
        let mut f = fruit(1000.0);
        for _ in 0..5 {
            f.update_ripeness(20.0, 90.0);
        }
        assert!(!f.is_rotten());
        assert!(f.update_ripeness(20.0, 90.0));
        assert_eq!(f.puncture_count(), 6);
    }

    #[test]
    fn rotten_fruit_is_frozen() {
        let mut f = fruit(0.5);
        f.update_ripeness(20.0, 50.0);
        assert!(f.is_rotten());
        let ripeness = f.ripeness_remaining();

        assert!(!f.update_ripeness(40.0, 95.0));
        assert_eq!(f.ripeness_remaining(), ripeness);

        let params = FruitParams {
            puncture_probability: 1.0,
            ..FruitParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!f.puncture_by_bug(Position::new(10.0, 10.0), &params, &mut rng));
        assert!(f.is_rotten());
    }

    #[test]
    fn out_of_range_bug_never_punctures() {
        let mut f = fruit(100.0);
        let params = FruitParams {
            puncture_probability: 1.0,
            ..FruitParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!f.puncture_by_bug(Position::new(13.0, 10.0), &params, &mut rng));
        assert_eq!(f.puncture_count(), 0);
    }

    #[test]
    fn puncture_records_bug_position() {
        let mut f = fruit(100.0);
        let params = FruitParams {
            puncture_probability: 1.0,
            ..FruitParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(f.puncture_by_bug(Position::new(11.0, 10.0), &params, &mut rng));
        assert_eq!(f.puncture_sites(), &[Position::new(11.0, 10.0)]);
    }

    #[test]
    fn puncture_rate_tracks_probability() {
        let params = FruitParams {
            bite_tolerance: u32::MAX,
            ..FruitParams::default()
        };
        let mut f = FruitAgent::new(FruitId::new(0), Position::new(0.0, 0.0), 100.0, &params);
        let mut rng = SmallRng::seed_from_u64(2024);
        let hits = (0..10_000)
            .filter(|_| f.puncture_by_bug(Position::new(0.5, 0.0), &params, &mut rng))
            .count();
        assert!((5_700..=6_300).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn random_ripeness_stays_in_range() {
        let params = FruitParams::default();
        let mut rng = SmallRng::seed_from_u64(11);
        for raw in 0..200 {
            let f =
                FruitAgent::random(FruitId::new(raw), Position::new(1.0, 1.0), &params, &mut rng);
            assert!((100.0..=300.0).contains(&f.ripeness_remaining()));
        }
    }
}
