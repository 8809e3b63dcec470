//! Fixed trees and the fruit they own.

use orchard_types::{FruitId, Position, TreeId};
use orchard_world::ClimateField;
use rand::Rng;
use tracing::debug;

use crate::bug::BugAgent;
use crate::config::FruitParams;
use crate::error::AgentError;
use crate::fruit::FruitAgent;

/// A tree at a fixed position.
///
/// Fruits are created with the tree and never added later. Rotten fruit
/// is dropped by rebuilding the collection at the end of each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeAgent {
    id: TreeId,
    position: Position,
    fruits: Vec<FruitAgent>,
}

impl TreeAgent {
    /// Create a tree owning `fruits`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NonFinitePosition`] for a non-finite position.
    pub fn new(
        id: TreeId,
        position: Position,
        fruits: Vec<FruitAgent>,
    ) -> Result<Self, AgentError> {
        if !position.is_finite() {
            return Err(AgentError::NonFinitePosition { entity: "tree" });
        }
        Ok(Self { id, position, fruits })
    }

    /// Plant a tree bearing `fruit_count` fruits with random ripeness.
    ///
    /// Fruit ids are taken from `next_fruit_id`, which is advanced past the
    /// last id used.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NonFinitePosition`] for a non-finite position.
    pub fn planted(
        id: TreeId,
        position: Position,
        fruit_count: u32,
        next_fruit_id: &mut u32,
        params: &FruitParams,
        rng: &mut impl Rng,
    ) -> Result<Self, AgentError> {
        let mut fruits = Vec::with_capacity(usize::try_from(fruit_count).unwrap_or_default());
        for _ in 0..fruit_count {
            let fruit_id = FruitId::new(*next_fruit_id);
            *next_fruit_id = next_fruit_id.saturating_add(1);
            fruits.push(FruitAgent::random(fruit_id, position, params, rng));
        }
        Self::new(id, position, fruits)
    }

    /// Advance every fruit by one tick.
    ///
    /// Each fruit ripens under the climate at the tree, then every live
    /// bug within `params.puncture_radius` of the tree gets one puncture
    /// trial against it. Rotten fruit is then removed by rebuilding the
    /// collection; the removed fruits are returned.
    pub fn tick_fruits(
        &mut self,
        climate: &ClimateField,
        bugs: &[BugAgent],
        params: &FruitParams,
        rng: &mut impl Rng,
    ) -> Vec<FruitAgent> {
        let temperature = climate.temperature_at(self.position);
        let humidity = climate.humidity_at(self.position);
        let near: Vec<Position> = bugs
            .iter()
            .filter(|bug| bug.is_alive() && bug.is_near(self.position, params.puncture_radius))
            .map(BugAgent::position)
            .collect();

        for fruit in &mut self.fruits {
            fruit.update_ripeness(temperature, humidity);
            for &bug_position in &near {
                if fruit.is_rotten() {
                    break;
                }
                fruit.puncture_by_bug(bug_position, params, rng);
            }
        }

        self.remove_rotten()
    }

    /// Rebuild the fruit collection without rotten members, returning them.
    pub fn remove_rotten(&mut self) -> Vec<FruitAgent> {
        let (rotten, live): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.fruits).into_iter().partition(FruitAgent::is_rotten);
        self.fruits = live;
        for fruit in &rotten {
            debug!(
                tree = %self.id,
                fruit = %fruit.id(),
                punctures = fruit.puncture_count(),
                "fruit rotted"
            );
        }
        rotten
    }

    /// Tree identifier.
    pub const fn id(&self) -> TreeId {
        self.id
    }

    /// Fixed position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Live fruit.
    pub fn fruits(&self) -> &[FruitAgent] {
        &self.fruits
    }
}
