//! Read-only views of simulation state for printing and plotting

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::Vec2;

/// Living head count of one population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationCount {
    pub species_name: String,
    pub trophic_level: i32,
    pub living: usize,
}

/// Population counts at the start of an epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub epoch: u32,
    pub counts: Vec<PopulationCount>,
}

impl EpochReport {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.living).sum()
    }

    pub fn living(&self, species_name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.species_name == species_name)
            .map(|c| c.living)
    }
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Epoch {} organism count:", self.epoch)?;
        for count in &self.counts {
            writeln!(f, "  {}: {}", count.species_name, count.living)?;
        }
        write!(f, "  total: {}", self.total())
    }
}

/// Positions of every living organism of one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPositions {
    pub species_name: String,
    pub positions: Vec<Vec2>,
}
