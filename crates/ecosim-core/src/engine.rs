//! Simulation engine - drives ticks and epochs across all populations

use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::Body;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::ids::IdAllocator;
use crate::navigation::Navigator;
use crate::population::Population;
use crate::report::{EpochReport, PopulationCount, SpeciesPositions};
use crate::systems::{living_position, max_speed, neighbour_range, rebuild_neighbours};

/// Spreads epoch numbers across the seed space
const EPOCH_SEED_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for the generator used during `epoch`
fn epoch_seed(seed: u64, epoch: u32) -> u64 {
    seed.wrapping_add((epoch as u64 + 1).wrapping_mul(EPOCH_SEED_PRIME))
}

/// An independent simulation with its own world, environment and populations.
///
/// `epoch` and `time` are the only progress markers, so a run can be
/// stopped after any epoch and resumed later (see [`Simulation::save`]).
pub struct Simulation {
    /// Organism arena
    pub world: World,
    /// Sorted by descending trophic level at construction
    pub(crate) populations: Vec<Population>,
    pub(crate) config: SimulationConfig,
    /// Archetype replicated into every organism
    pub(crate) navigator: Box<dyn Navigator>,
    pub(crate) ids: IdAllocator,
    pub(crate) seed: u64,
    rng: StdRng,
    /// Ticks elapsed in the current epoch
    pub(crate) time: u32,
    /// Completed epochs
    pub(crate) epoch: u32,
    neighbour_update_ticks: u32,
    neighbour_range: Option<f64>,
    /// Positions changed since the last neighbour rebuild
    neighbours_stale: bool,
}

impl Simulation {
    /// Build a simulation and its initial populations from a config
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut sim = Self::empty(config, seed)?;

        for pop_config in sim.config.populations.clone() {
            let population = Population::new(
                pop_config.species,
                pop_config.initial_size,
                &mut sim.world,
                sim.navigator.as_ref(),
                &mut sim.ids,
                &mut sim.rng,
            )?;
            sim.populations.push(population);
        }
        sim.sort_populations();
        sim.neighbour_range = neighbour_range(
            max_speed(&sim.populations),
            sim.config.neighbour_update_interval,
        );

        log::info!(
            "Simulation '{}' created: {} populations, {} organisms, seed {}, neighbour range {:?}",
            sim.config.name,
            sim.populations.len(),
            sim.organism_count(),
            seed,
            sim.neighbour_range
        );
        Ok(sim)
    }

    /// Validated shell with no populations
    pub(crate) fn empty(config: SimulationConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let navigator = config.environment.build_navigator()?;
        Ok(Self {
            world: World::new(),
            populations: Vec::new(),
            config,
            navigator,
            ids: IdAllocator::new(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            time: 0,
            epoch: 0,
            neighbour_update_ticks: 0,
            neighbour_range: None,
            neighbours_stale: true,
        })
    }

    /// Install restored populations (already sorted) and progress markers
    pub(crate) fn restore(&mut self, populations: Vec<Population>, ids: IdAllocator, epoch: u32) {
        self.populations = populations;
        self.ids = ids;
        self.epoch = epoch;
        self.time = 0;
        self.neighbour_update_ticks = 0;
        self.neighbours_stale = true;
        self.neighbour_range = neighbour_range(
            max_speed(&self.populations),
            self.config.neighbour_update_interval,
        );
    }

    fn sort_populations(&mut self) {
        self.populations
            .sort_by(|a, b| b.trophic_level().cmp(&a.trophic_level()));
    }

    /// Run `epochs_to_run` full epochs
    pub fn start_simulation(&mut self, epochs_to_run: u32) -> Result<Vec<EpochReport>, SimError> {
        let mut reports = Vec::with_capacity(epochs_to_run as usize);
        for _ in 0..epochs_to_run {
            reports.push(self.run_epoch()?);
        }
        Ok(reports)
    }

    /// Run one epoch: every tick, then the rollover.
    ///
    /// Returns the counts the next epoch starts with.
    pub fn run_epoch(&mut self) -> Result<EpochReport, SimError> {
        self.rng = StdRng::seed_from_u64(epoch_seed(self.seed, self.epoch));
        self.time = 0;
        // advance_epoch already rebuilt the lists for this epoch
        if self.neighbours_stale {
            self.update_neighbours()?;
        }

        while self.time <= self.config.time_per_epoch {
            if self.neighbour_update_ticks >= self.config.neighbour_update_interval {
                self.update_neighbours()?;
            } else {
                self.advance_time()?;
            }
        }
        self.advance_epoch()?;

        let report = self.report();
        log::info!(
            "{} epoch {} complete: {}",
            self.config.name,
            self.epoch,
            report
                .counts
                .iter()
                .map(|c| format!("{}={}", c.species_name, c.living))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(report)
    }

    /// One tick for every population, in trophic order
    pub fn advance_time(&mut self) -> Result<(), SimError> {
        for population in &mut self.populations {
            population.advance_time(&mut self.world, &mut self.ids, &mut self.rng)?;
        }
        self.time += 1;
        self.neighbour_update_ticks += 1;
        self.neighbours_stale = true;
        Ok(())
    }

    /// Epoch rollover for every population, then a fresh neighbour index
    pub fn advance_epoch(&mut self) -> Result<(), SimError> {
        for population in &mut self.populations {
            population.advance_epoch(&mut self.world, &mut self.rng)?;
        }
        self.epoch += 1;
        self.time = 0;
        self.neighbour_update_ticks = 0;
        self.update_neighbours()?;
        Ok(())
    }

    /// Rebuild every neighbour list. Returns the number of links.
    pub fn update_neighbours(&mut self) -> Result<usize, SimError> {
        let links = rebuild_neighbours(
            &mut self.world,
            &self.populations,
            self.navigator.as_ref(),
            self.neighbour_range,
        )?;
        self.neighbour_update_ticks = 0;
        self.neighbours_stale = false;
        log::debug!(
            "neighbour refresh at epoch {} tick {}: {} links",
            self.epoch,
            self.time,
            links
        );
        Ok(links)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn population(&self, species_name: &str) -> Option<&Population> {
        self.populations
            .iter()
            .find(|p| p.species_name() == species_name)
    }

    /// Seed actually used (drawn at random if the config had none)
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks elapsed in the current epoch
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Completed epochs
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn neighbour_range(&self) -> Option<f64> {
        self.neighbour_range
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Total living organisms across populations
    pub fn organism_count(&self) -> usize {
        self.populations.iter().map(|p| p.size()).sum()
    }

    pub fn population_counts(&self) -> Vec<PopulationCount> {
        self.populations
            .iter()
            .map(|p| PopulationCount {
                species_name: p.species_name().to_string(),
                trophic_level: p.trophic_level(),
                living: p.size(),
            })
            .collect()
    }

    pub fn report(&self) -> EpochReport {
        EpochReport {
            epoch: self.epoch,
            counts: self.population_counts(),
        }
    }

    /// Positions of living organisms, per species, for plotting
    pub fn positions(&self) -> Vec<SpeciesPositions> {
        self.populations
            .iter()
            .map(|p| SpeciesPositions {
                species_name: p.species_name().to_string(),
                positions: p
                    .living()
                    .iter()
                    .filter_map(|&e| living_position(&self.world, e))
                    .collect(),
            })
            .collect()
    }

    /// Body of a population member, if it still exists
    pub fn body(&self, entity: hecs::Entity) -> Option<Body> {
        self.world.get::<&Body>(entity).ok().map(|b| *b)
    }

    /// Save the simulation at an epoch boundary
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(writer, self)
    }

    /// Load a simulation saved at an epoch boundary
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self, crate::persistence::SaveError> {
        crate::persistence::load_simulation(reader)
    }
}
