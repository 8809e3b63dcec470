//! Mobile pest agents.
//!
//! A bug sums four attraction/repulsion terms into a net force:
//!
//! | Source           | Weight                              | Direction |
//! |------------------|-------------------------------------|-----------|
//! | Live fruit       | `ripeness / (d + eps)`              | toward    |
//! | Other live bug   | `0.5 / (d + eps)`                   | toward    |
//! | Sensor           | `temperature / 30 / (d + eps)`      | toward    |
//! | Pesticide source | `repulsion strength / (d + eps)`    | away      |
//!
//! Each term contributes `weight * (dx, dy)`, where `(dx, dy)` is the raw
//! offset to the target. The pull toward a target therefore has roughly
//! the magnitude of its base weight whatever the distance, so a ripe fruit
//! far away outweighs a nearly rotten one close by. A target at zero
//! distance contributes nothing and every term stays finite.
//!
//! If the net force is non-zero the bug draws once against a
//! temperature-gated move probability (see
//! [`MovementParams::move_probability`]) and, on success, steps
//! `max_step_length` along the normalised force. Leaving the domain is
//! detected by the engine, not here.

use orchard_types::{BugId, Position};
use orchard_world::{ClimateField, SensorReading};
use rand::Rng;
use serde::Serialize;

use crate::config::MovementParams;
use crate::error::{AgentError, check_positive};
use crate::pesticide::PesticideSource;
use crate::tree::TreeAgent;

/// Guard added to every distance in a force denominator.
pub const FORCE_EPSILON: f64 = 1e-6;

/// Attraction weight of another live bug.
const BUG_ATTRACTION: f64 = 0.5;

/// Temperature divisor for sensor attraction.
const SENSOR_TEMPERATURE_SCALE: f64 = 30.0;

/// Lifecycle of a bug. `Dead` and `Escaped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BugStatus {
    /// Active in the simulation.
    Alive,
    /// Killed by pesticide.
    Dead,
    /// Left the field domain.
    Escaped,
}

/// Everything a bug reads while deciding where to go.
///
/// Borrowed for the duration of one decision; agents never hold on to it.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// Current climate field.
    pub climate: &'a ClimateField,
    /// Trees and their live fruit.
    pub trees: &'a [TreeAgent],
    /// Active bugs, possibly including the deciding bug itself.
    pub bugs: &'a [BugAgent],
    /// Current sensor readings.
    pub sensors: &'a [SensorReading],
    /// Deployed pesticide sources.
    pub pesticides: &'a [PesticideSource],
}

/// Result of one movement decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// The net force was zero; no draw was made.
    NoForce,
    /// The move draw failed; the bug stays put.
    Stayed,
    /// The bug stepped from one position to another.
    Moved {
        /// Position before the step.
        from: Position,
        /// Position after the step.
        to: Position,
    },
}

/// A single pest.
#[derive(Debug, Clone, PartialEq)]
pub struct BugAgent {
    id: BugId,
    position: Position,
    status: BugStatus,
    max_step_length: f64,
}

impl BugAgent {
    /// Create a live bug.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the position is not finite or the step
    /// length is not positive.
    pub fn new(id: BugId, position: Position, max_step_length: f64) -> Result<Self, AgentError> {
        if !position.is_finite() {
            return Err(AgentError::NonFinitePosition { entity: "bug" });
        }
        check_positive("bugs.max_step_length", max_step_length)?;
        Ok(Self {
            id,
            position,
            status: BugStatus::Alive,
            max_step_length,
        })
    }

    /// Net force acting on this bug, as `(mx, my)`.
    pub fn net_force(&self, surroundings: &Surroundings<'_>) -> (f64, f64) {
        let mut force = (0.0, 0.0);

        for fruit in surroundings.trees.iter().flat_map(TreeAgent::fruits) {
            if !fruit.is_rotten() {
                self.accumulate(&mut force, fruit.position(), fruit.ripeness_remaining());
            }
        }

        for other in surroundings.bugs {
            if other.id != self.id && other.is_alive() {
                self.accumulate(&mut force, other.position, BUG_ATTRACTION);
            }
        }

        for reading in surroundings.sensors {
            self.accumulate(
                &mut force,
                reading.position,
                reading.temperature / SENSOR_TEMPERATURE_SCALE,
            );
        }

        for source in surroundings.pesticides {
            let strength = source.repulsion_strength(self.position);
            if strength > 0.0 {
                self.accumulate(&mut force, source.position(), -strength);
            }
        }

        force
    }

    /// Add one weighted pull toward `target` (negative weight pushes away).
    fn accumulate(&self, force: &mut (f64, f64), target: Position, weight: f64) {
        let (dx, dy) = self.position.offset_to(target);
        let denom = self.position.distance_to(target) + FORCE_EPSILON;
        let scale = weight / denom;
        if scale.is_finite() {
            force.0 += dx * scale;
            force.1 += dy * scale;
        }
    }

    /// Decide this tick's move without applying it.
    ///
    /// The move probability uses the field temperature at the bug's
    /// current position.
    pub fn plan_move(
        &self,
        surroundings: &Surroundings<'_>,
        params: &MovementParams,
        rng: &mut impl Rng,
    ) -> MoveOutcome {
        let (mx, my) = self.net_force(surroundings);
        let magnitude = mx.hypot(my);
        if !magnitude.is_finite() || magnitude <= 0.0 {
            return MoveOutcome::NoForce;
        }

        let temperature = surroundings.climate.temperature_at(self.position);
        let probability = params.move_probability(temperature);
        let draw: f64 = rng.random();
        if draw >= probability {
            return MoveOutcome::Stayed;
        }

        let to = self.position.translated(
            mx / magnitude * self.max_step_length,
            my / magnitude * self.max_step_length,
        );
        MoveOutcome::Moved {
            from: self.position,
            to,
        }
    }

    /// Apply a planned move. Ignored for bugs that are no longer alive.
    pub const fn apply_move(&mut self, outcome: MoveOutcome) {
        if let (BugStatus::Alive, MoveOutcome::Moved { to, .. }) = (self.status, outcome) {
            self.position = to;
        }
    }

    /// Whether the bug is within `distance` of `point`.
    pub fn is_near(&self, point: Position, distance: f64) -> bool {
        self.position.distance_to(point) <= distance
    }

    /// Mark the bug dead. No effect unless it is alive.
    pub const fn mark_dead(&mut self) {
        if matches!(self.status, BugStatus::Alive) {
            self.status = BugStatus::Dead;
        }
    }

    /// Mark the bug escaped. No effect unless it is alive.
    pub const fn mark_escaped(&mut self) {
        if matches!(self.status, BugStatus::Alive) {
            self.status = BugStatus::Escaped;
        }
    }

    /// Bug identifier.
    pub const fn id(&self) -> BugId {
        self.id
    }

    /// Current position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Lifecycle status.
    pub const fn status(&self) -> BugStatus {
        self.status
    }

    /// Whether the bug is still active.
    pub const fn is_alive(&self) -> bool {
        matches!(self.status, BugStatus::Alive)
    }

    /// Distance covered by one successful step.
    pub const fn max_step_length(&self) -> f64 {
        self.max_step_length
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use orchard_types::{FruitId, PesticideId, TreeId};

    use super::*;
    use crate::config::{FruitParams, PesticideParams};
    use crate::fruit::FruitAgent;

    fn uniform_climate(temperature: f64) -> ClimateField {
        let sensors = orchard_world::Sensor::from_positions(&[Position::new(50.0, 50.0)]);
        ClimateField::from_readings(&sensors, &[temperature], &[50.0], 100, 100, 2.0).unwrap()
    }

    fn bug(id: u32, x: f64, y: f64) -> BugAgent {
        BugAgent::new(BugId::new(id), Position::new(x, y), 1.0).unwrap()
    }

    fn tree_with_fruit(position: Position, ripeness: f64) -> TreeAgent {
        let fruit = FruitAgent::new(FruitId::new(0), position, ripeness, &FruitParams::default());
        TreeAgent::new(TreeId::new(0), position, vec![fruit]).unwrap()
    }

    fn always_move() -> MovementParams {
        MovementParams {
            p_max: 1.0,
            p_min: 1.0,
            ..MovementParams::default()
        }
    }

    #[test]
    fn lone_bug_has_no_force() {
        let climate = uniform_climate(22.0);
        let b = bug(0, 10.0, 10.0);
        let bugs = [b.clone()];
        let s = Surroundings {
            climate: &climate,
            trees: &[],
            bugs: &bugs,
            sensors: &[],
            pesticides: &[],
        };
        assert_eq!(b.net_force(&s), (0.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(b.plan_move(&s, &always_move(), &mut rng), MoveOutcome::NoForce);
    }

    #[test]
    fn bug_on_top_of_fruit_stays_finite() {
        let climate = uniform_climate(22.0);
        let trees = [tree_with_fruit(Position::new(20.0, 20.0), 1.0)];
        let b = bug(0, 20.0, 20.0);
        let s = Surroundings {
            climate: &climate,
            trees: &trees,
            bugs: &[],
            sensors: &[],
            pesticides: &[],
        };
        let (mx, my) = b.net_force(&s);
        assert!(mx.is_finite() && my.is_finite());

        let mut rng = SmallRng::seed_from_u64(3);
        match b.plan_move(&s, &always_move(), &mut rng) {
            MoveOutcome::NoForce | MoveOutcome::Stayed => {}
            MoveOutcome::Moved { to, .. } => {
                assert!(to.is_finite());
                assert!(b.position().distance_to(to) <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn bug_steps_toward_ripe_fruit() {
        let climate = uniform_climate(22.0);
        let trees = [tree_with_fruit(Position::new(30.0, 10.0), 200.0)];
        let mut b = bug(0, 10.0, 10.0);
        let s = Surroundings {
            climate: &climate,
            trees: &trees,
            bugs: &[],
            sensors: &[],
            pesticides: &[],
        };
        let mut rng = SmallRng::seed_from_u64(9);
        let outcome = b.plan_move(&s, &always_move(), &mut rng);
        let MoveOutcome::Moved { from, to } = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(from, Position::new(10.0, 10.0));
        assert!((to.x - 11.0).abs() < 1e-9);
        assert!((to.y - 10.0).abs() < 1e-9);

        b.apply_move(outcome);
        assert_eq!(b.position(), to);
    }

    #[test]
    fn distant_ripe_fruit_outweighs_near_rotting_fruit() {
        let climate = uniform_climate(22.0);
        let params = FruitParams::default();
        let far = FruitAgent::new(FruitId::new(0), Position::new(90.0, 10.0), 100.0, &params);
        let near = FruitAgent::new(FruitId::new(1), Position::new(10.0, 12.0), 10.0, &params);
        let trees = [
            TreeAgent::new(TreeId::new(0), Position::new(90.0, 10.0), vec![far]).unwrap(),
            TreeAgent::new(TreeId::new(1), Position::new(10.0, 12.0), vec![near]).unwrap(),
        ];
        let b = bug(0, 10.0, 10.0);
        let s = Surroundings {
            climate: &climate,
            trees: &trees,
            bugs: &[],
            sensors: &[],
            pesticides: &[],
        };
        let (mx, my) = b.net_force(&s);
        assert!((mx - 100.0).abs() < 1e-3, "mx = {mx}");
        assert!((my - 10.0).abs() < 1e-3, "my = {my}");
        assert!(mx > my);
    }

    #[test]
    fn pesticide_pushes_bug_away() {
        let climate = uniform_climate(22.0);
        let source = PesticideSource::new(
            PesticideId::new(0),
            Position::new(50.0, 50.0),
            200.0,
            10.0,
            &PesticideParams::default(),
        )
        .unwrap();
        let pesticides = [source];
        let b = bug(0, 53.0, 50.0);
        let s = Surroundings {
            climate: &climate,
            trees: &[],
            bugs: &[],
            sensors: &[],
            pesticides: &pesticides,
        };
        let (mx, my) = b.net_force(&s);
        assert!(mx > 0.0);
        assert!(my.abs() < 1e-12);
    }

    #[test]
    fn other_bugs_attract_and_self_is_ignored() {
        let climate = uniform_climate(22.0);
        let bugs = [bug(0, 10.0, 10.0), bug(1, 10.0, 20.0)];
        let s = Surroundings {
            climate: &climate,
            trees: &[],
            bugs: &bugs,
            sensors: &[],
            pesticides: &[],
        };
        let (mx, my) = bugs[0].net_force(&s);
        assert!(mx.abs() < 1e-12);
        assert!(my > 0.0);
    }

    #[test]
    fn dead_bugs_do_not_attract() {
        let climate = uniform_climate(22.0);
        let mut other = bug(1, 10.0, 20.0);
        other.mark_dead();
        let bugs = [bug(0, 10.0, 10.0), other];
        let s = Surroundings {
            climate: &climate,
            trees: &[],
            bugs: &bugs,
            sensors: &[],
            pesticides: &[],
        };
        assert_eq!(bugs[0].net_force(&s), (0.0, 0.0));
    }

    #[test]
    fn sensors_attract_by_temperature() {
        let climate = uniform_climate(22.0);
        let readings = climate.sensor_readings();
        let b = bug(0, 40.0, 50.0);
        let s = Surroundings {
            climate: &climate,
            trees: &[],
            bugs: &[],
            sensors: &readings,
            pesticides: &[],
        };
        let (mx, _) = b.net_force(&s);
        assert!(mx > 0.0);
    }

    #[test]
    fn zero_probability_never_moves() {
        let climate = uniform_climate(22.0);
        let trees = [tree_with_fruit(Position::new(30.0, 10.0), 200.0)];
        let b = bug(0, 10.0, 10.0);
        let s = Surroundings {
            climate: &climate,
            trees: &trees,
            bugs: &[],
            sensors: &[],
            pesticides: &[],
        };
        let params = MovementParams {
            p_max: 0.0,
            p_min: 0.0,
            ..MovementParams::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..50 {
            assert_eq!(b.plan_move(&s, &params, &mut rng), MoveOutcome::Stayed);
        }
    }

    #[test]
    fn terminal_states_are_permanent() {
        let mut b = bug(0, 1.0, 1.0);
        b.mark_dead();
        b.mark_escaped();
        assert_eq!(b.status(), BugStatus::Dead);

        let mut e = bug(1, 1.0, 1.0);
        e.mark_escaped();
        e.mark_dead();
        assert_eq!(e.status(), BugStatus::Escaped);

        e.apply_move(MoveOutcome::Moved {
            from: Position::new(1.0, 1.0),
            to: Position::new(2.0, 2.0),
        });
        assert_eq!(e.position(), Position::new(1.0, 1.0));
    }

    #[test]
    fn invalid_bug_is_rejected() {
        assert!(BugAgent::new(BugId::new(0), Position::new(f64::NAN, 1.0), 1.0).is_err());
        assert!(BugAgent::new(BugId::new(0), Position::new(1.0, 1.0), 0.0).is_err());
    }
}
