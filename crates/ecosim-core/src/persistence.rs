//! Save/Load functionality for resuming a run from its last completed epoch
//!
//! Uses bincode for compact binary serialization. Only epoch boundaries
//! are saved: at that point dead sets are empty, offspring are harvested
//! and neighbour lists are rebuilt on resume, so each population is just
//! its species and an ordered list of living organisms.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{
    Body, LifeState, Navigation, Neighbours, Offspring, Organism, SpeciesSpec, Vec2,
};
use crate::config::SimulationConfig;
use crate::engine::Simulation;
use crate::error::SimError;
use crate::ids::IdAllocator;
use crate::population::Population;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a simulation at an epoch boundary
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub config: SimulationConfig,
    /// Resolved seed (the config may not carry one)
    pub seed: u64,
    /// Completed epochs
    pub epoch: u32,
    pub ids: IdAllocator,
    /// In trophic order
    pub populations: Vec<SavedPopulation>,
}

#[derive(Serialize, Deserialize)]
pub struct SavedPopulation {
    pub species: SpeciesSpec,
    pub organisms: Vec<SavedOrganism>,
}

#[derive(Serialize, Deserialize)]
pub struct SavedOrganism {
    pub id: u64,
    pub hunger: i32,
    pub body: Body,
    pub heading: Vec2,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Can only save at an epoch boundary (currently at tick {time})")]
    MidEpoch { time: u32 },
    #[error("Invalid saved simulation: {0}")]
    Sim(#[from] SimError),
}

fn save_population(
    sim: &Simulation,
    population: &Population,
) -> Result<SavedPopulation, SaveError> {
    let mut organisms = Vec::with_capacity(population.size());
    for &entity in population.living() {
        let mut query = sim
            .world
            .query_one::<(&Organism, &Body, &Navigation)>(entity)
            .map_err(|_| SimError::Detached { entity })?;
        let (org, body, nav) = query.get().ok_or(SimError::Detached { entity })?;
        organisms.push(SavedOrganism {
            id: org.id,
            hunger: org.hunger,
            body: *body,
            heading: nav.0.heading(),
        });
    }
    Ok(SavedPopulation {
        species: population.species().clone(),
        organisms,
    })
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(writer: W, sim: &Simulation) -> Result<(), SaveError> {
    let pending = sim.populations.iter().any(|p| !p.dead().is_empty());
    if sim.time != 0 || pending {
        return Err(SaveError::MidEpoch { time: sim.time });
    }

    let populations = sim
        .populations
        .iter()
        .map(|p| save_population(sim, p))
        .collect::<Result<Vec<_>, _>>()?;

    let save_data = SaveData {
        version: SAVE_VERSION,
        config: sim.config.clone(),
        seed: sim.seed,
        epoch: sim.epoch,
        ids: sim.ids.clone(),
        populations,
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<Simulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut sim = Simulation::empty(save_data.config, save_data.seed)?;
    let mut populations = Vec::with_capacity(save_data.populations.len());

    for saved in save_data.populations {
        let mut population = Population::empty(saved.species);
        let species = population.species_arc();
        for organism in saved.organisms {
            let mut navigator = sim.navigator.replicate();
            navigator.set_heading(organism.heading);
            let entity = sim.world.spawn((
                Organism {
                    id: organism.id,
                    species: species.clone(),
                    hunger: organism.hunger,
                    state: LifeState::Alive,
                    reproduced_this_epoch: false,
                },
                organism.body,
                Navigation(navigator),
                Neighbours::default(),
                Offspring::default(),
            ));
            population.add_individual(entity);
        }
        populations.push(population);
    }

    sim.restore(populations, save_data.ids, save_data.epoch);
    log::info!(
        "Loaded simulation '{}' at epoch {} with {} organisms",
        sim.name(),
        sim.epoch(),
        sim.organism_count()
    );
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(1234),
            time_per_epoch: 15,
            neighbour_update_interval: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.start_simulation(1).unwrap();

        let mut buffer = Vec::new();
        sim.save(&mut buffer).expect("Save failed");

        let loaded = Simulation::load(&buffer[..]).expect("Load failed");
        assert_eq!(loaded.epoch(), 1);
        assert_eq!(loaded.seed(), 1234);
        assert_eq!(loaded.population_counts(), sim.population_counts());
        assert_eq!(loaded.positions(), sim.positions());
        assert_eq!(loaded.ids().issued("rabbit"), sim.ids().issued("rabbit"));
    }

    #[test]
    fn test_resume_matches_uninterrupted_run() {
        let mut straight = Simulation::new(config()).unwrap();
        straight.start_simulation(3).unwrap();

        let mut first_leg = Simulation::new(config()).unwrap();
        first_leg.start_simulation(2).unwrap();
        let mut buffer = Vec::new();
        first_leg.save(&mut buffer).unwrap();

        let mut resumed = Simulation::load(&buffer[..]).unwrap();
        resumed.start_simulation(1).unwrap();

        assert_eq!(resumed.epoch(), straight.epoch());
        assert_eq!(resumed.population_counts(), straight.population_counts());
        assert_eq!(resumed.positions(), straight.positions());
    }

    #[test]
    fn test_mid_epoch_save_rejected() {
        let mut sim = Simulation::new(config()).unwrap();
        sim.update_neighbours().unwrap();
        sim.advance_time().unwrap();

        let mut buffer = Vec::new();
        assert!(matches!(
            sim.save(&mut buffer),
            Err(SaveError::MidEpoch { time: 1 })
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let sim = Simulation::new(config()).unwrap();
        let mut buffer = Vec::new();
        sim.save(&mut buffer).unwrap();
        // version is the first field, little-endian u32
        buffer[0] = 99;

        assert!(matches!(
            Simulation::load(&buffer[..]),
            Err(SaveError::VersionMismatch { found: 99, .. })
        ));
    }
}
