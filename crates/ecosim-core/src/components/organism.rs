//! Organism components: identity, physiology, spatial state and the
//! entity lists an organism keeps (neighbours, offspring).

use std::sync::Arc;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::Vec2;
use crate::navigation::Navigator;

/// Parameters shared by every organism of one species.
///
/// This is the species record read from configuration; it is wrapped in an
/// `Arc` and shared by all members of the population and their offspring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesSpec {
    pub species_name: String,
    /// Strictly higher levels may prey on strictly lower levels
    pub trophic_level: i32,
    /// Distance travelled per tick
    pub speed: f64,
    /// Hunger at the start of every epoch
    pub base_hunger: i32,
    pub feeding_range: f64,
    /// Success probability of a feeding attempt, 0-100
    pub feeding_chance: u32,
    /// Success probability of a reproduction attempt, 0-100
    pub offspring_chance: u32,
    pub litter_size: u32,
}

impl SpeciesSpec {
    /// Food yielded to a predator when an organism of this species is eaten
    pub fn food_value(&self) -> i32 {
        self.base_hunger / 5 + 1
    }

    /// Whether organisms of this species may prey on `trophic_level`
    pub fn outranks(&self, trophic_level: i32) -> bool {
        self.trophic_level > trophic_level
    }
}

/// Lifecycle of a single organism instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    /// Constructed but not yet placed in the environment
    Uninitialized,
    Alive,
    /// Terminal for this instance; queued offspring survive it
    Dead,
}

/// Core organism component
#[derive(Debug, Clone)]
pub struct Organism {
    /// Unique within the species, assigned in creation order
    pub id: u64,
    pub species: Arc<SpeciesSpec>,
    pub hunger: i32,
    pub state: LifeState,
    pub reproduced_this_epoch: bool,
}

impl Organism {
    pub fn new(id: u64, species: Arc<SpeciesSpec>) -> Self {
        let hunger = species.base_hunger;
        Self {
            id,
            species,
            hunger,
            state: LifeState::Uninitialized,
            reproduced_this_epoch: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn is_satiated(&self) -> bool {
        self.hunger <= 0
    }

    pub fn trophic_level(&self) -> i32 {
        self.species.trophic_level
    }
}

/// Spatial state, mutated only by the organism's own move step
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// The organism's own spatial strategy instance
#[derive(Debug)]
pub struct Navigation(pub Box<dyn Navigator>);

/// Prey candidates found by the last neighbour refresh.
///
/// Handles are non-owning; liveness is always checked through the world.
#[derive(Debug, Clone, Default)]
pub struct Neighbours(pub Vec<Entity>);

/// Children born this epoch, held by the parent until epoch rollover
#[derive(Debug, Clone, Default)]
pub struct Offspring(pub Vec<Entity>);

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(trophic_level: i32, base_hunger: i32) -> Arc<SpeciesSpec> {
        Arc::new(SpeciesSpec {
            species_name: format!("level{}", trophic_level),
            trophic_level,
            speed: 1.0,
            base_hunger,
            feeding_range: 1.0,
            feeding_chance: 50,
            offspring_chance: 50,
            litter_size: 1,
        })
    }

    #[test]
    fn test_food_value() {
        assert_eq!(spec(1, 0).food_value(), 1);
        assert_eq!(spec(1, 4).food_value(), 1);
        assert_eq!(spec(1, 5).food_value(), 2);
        assert_eq!(spec(1, 23).food_value(), 5);
    }

    #[test]
    fn test_new_organism_starts_uninitialized_and_hungry() {
        let org = Organism::new(7, spec(2, 10));
        assert_eq!(org.state, LifeState::Uninitialized);
        assert!(!org.is_alive());
        assert_eq!(org.hunger, 10);
        assert!(!org.is_satiated());
    }

    #[test]
    fn test_outranks_is_strict() {
        let fox = spec(2, 10);
        assert!(fox.outranks(1));
        assert!(!fox.outranks(2));
        assert!(!fox.outranks(3));
    }
}
