//! Population - a same-species cohort of organisms.
//!
//! A population owns the lifetime bookkeeping of its members: it creates
//! them, moves eaten ones from the living to the dead set during a tick,
//! and at epoch rollover admits every queued offspring, resets survivors
//! and discards the dead.

use std::sync::Arc;

use hecs::{Entity, World};
use rand::Rng;

use crate::components::SpeciesSpec;
use crate::error::SimError;
use crate::ids::IdAllocator;
use crate::navigation::Navigator;
use crate::systems::{
    advance_organism, is_alive, reset_organism, spawn_organism, take_offspring,
};

#[derive(Debug, Clone)]
pub struct Population {
    species: Arc<SpeciesSpec>,
    living: Vec<Entity>,
    /// Eaten this epoch; kept only to harvest their offspring
    dead: Vec<Entity>,
}

impl Population {
    /// Create a population with `initial_size` fresh organisms
    pub fn new(
        species: SpeciesSpec,
        initial_size: u32,
        world: &mut World,
        archetype: &dyn Navigator,
        ids: &mut IdAllocator,
        rng: &mut impl Rng,
    ) -> Result<Self, SimError> {
        let mut population = Self::empty(species);
        for _ in 0..initial_size {
            population.create_individual(world, archetype, ids, rng)?;
        }
        Ok(population)
    }

    pub fn empty(species: SpeciesSpec) -> Self {
        Self {
            species: Arc::new(species),
            living: Vec::new(),
            dead: Vec::new(),
        }
    }

    pub fn species(&self) -> &SpeciesSpec {
        &self.species
    }

    pub fn species_name(&self) -> &str {
        &self.species.species_name
    }

    pub fn trophic_level(&self) -> i32 {
        self.species.trophic_level
    }

    pub fn living(&self) -> &[Entity] {
        &self.living
    }

    pub fn dead(&self) -> &[Entity] {
        &self.dead
    }

    /// Number of living individuals
    pub fn size(&self) -> usize {
        self.living.len()
    }

    pub(crate) fn species_arc(&self) -> Arc<SpeciesSpec> {
        self.species.clone()
    }

    /// Admit an already spawned organism (offspring, restored organisms)
    pub fn add_individual(&mut self, entity: Entity) {
        self.living.push(entity);
    }

    /// Spawn one organism of this species into the living set
    pub fn create_individual(
        &mut self,
        world: &mut World,
        archetype: &dyn Navigator,
        ids: &mut IdAllocator,
        rng: &mut impl Rng,
    ) -> Result<Entity, SimError> {
        let entity = spawn_organism(world, self.species.clone(), archetype.replicate(), ids, rng)?;
        self.add_individual(entity);
        Ok(entity)
    }

    /// Move an organism from the living set to the dead set
    pub fn remove_individual(&mut self, entity: Entity) -> Result<(), SimError> {
        let index = self
            .living
            .iter()
            .position(|&e| e == entity)
            .ok_or(SimError::NotLiving { entity })?;
        self.living.remove(index);
        self.dead.push(entity);
        Ok(())
    }

    /// Run one tick for every living organism, relocating the dead.
    ///
    /// Iterates over a snapshot of the living set, since relocation
    /// mutates it mid-pass.
    pub fn advance_time(
        &mut self,
        world: &mut World,
        ids: &mut IdAllocator,
        rng: &mut impl Rng,
    ) -> Result<(), SimError> {
        let snapshot = self.living.clone();
        for entity in snapshot {
            if is_alive(world, entity) {
                advance_organism(world, entity, ids, rng)?;
            } else {
                self.remove_individual(entity)?;
            }
        }
        Ok(())
    }

    /// Epoch rollover.
    ///
    /// Offspring of the dead are harvested first, then those of the living.
    /// Dead parents are despawned once harvested; living ones are reset for
    /// the new epoch. Offspring were placed at birth and are not reset.
    pub fn advance_epoch(&mut self, world: &mut World, rng: &mut impl Rng) -> Result<(), SimError> {
        let dead = std::mem::take(&mut self.dead);
        let parents = self.living.clone();

        for entity in dead {
            let children = take_offspring(world, entity)?;
            self.living.extend(children);
            world
                .despawn(entity)
                .map_err(|_| SimError::Detached { entity })?;
        }

        for entity in parents {
            let children = take_offspring(world, entity)?;
            self.living.extend(children);

            if is_alive(world, entity) {
                reset_organism(world, entity, rng)?;
            } else {
                // Eaten after this population's last sweep
                self.living.retain(|&e| e != entity);
                world
                    .despawn(entity)
                    .map_err(|_| SimError::Detached { entity })?;
            }
        }

        Ok(())
    }
}
