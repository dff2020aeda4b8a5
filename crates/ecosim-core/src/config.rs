//! Simulation configuration - environment, timing and species records.
//!
//! Everything is validated up front so that a bad config fails before any
//! organism exists.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::SpeciesSpec;
use crate::error::SimError;
use crate::navigation::EnvironmentConfig;

/// One population: a species record plus its starting head count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(alias = "individuals_specs")]
    pub species: SpeciesSpec,
    pub initial_size: u32,
}

/// Configuration for a whole simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    /// Ticks per epoch (the loop runs while `time <= time_per_epoch`)
    pub time_per_epoch: u32,
    /// Ticks between neighbour list refreshes
    pub neighbour_update_interval: u32,
    /// RNG seed; drawn at random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub populations: Vec<PopulationConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "Meadow".to_string(),
            time_per_epoch: 50,
            neighbour_update_interval: 5,
            seed: None,
            environment: EnvironmentConfig::default(),
            populations: vec![
                PopulationConfig {
                    species: SpeciesSpec {
                        species_name: "rabbit".to_string(),
                        trophic_level: 1,
                        speed: 1.0,
                        base_hunger: 0,
                        feeding_range: 1.0,
                        feeding_chance: 0,
                        offspring_chance: 0,
                        litter_size: 1,
                    },
                    initial_size: 60,
                },
                PopulationConfig {
                    species: SpeciesSpec {
                        species_name: "fox".to_string(),
                        trophic_level: 2,
                        speed: 1.5,
                        base_hunger: 3,
                        feeding_range: 3.0,
                        feeding_chance: 60,
                        offspring_chance: 5,
                        litter_size: 1,
                    },
                    initial_size: 8,
                },
            ],
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON config and validate it
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.neighbour_update_interval == 0 {
            return Err(SimError::invalid(
                "neighbour_update_interval",
                "must be at least 1",
            ));
        }
        self.environment.validate()?;

        let mut names = HashSet::new();
        for (i, pop) in self.populations.iter().enumerate() {
            validate_species(&pop.species, i)?;
            if !names.insert(pop.species.species_name.as_str()) {
                return Err(SimError::invalid(
                    format!("populations[{}].species_name", i),
                    format!("duplicate species {}", pop.species.species_name),
                ));
            }
        }
        Ok(())
    }
}

fn validate_species(spec: &SpeciesSpec, index: usize) -> Result<(), SimError> {
    let field = |name: &str| format!("populations[{}].{}", index, name);

    if spec.species_name.trim().is_empty() {
        return Err(SimError::invalid(field("species_name"), "must not be empty"));
    }
    for (name, value) in [("speed", spec.speed), ("feeding_range", spec.feeding_range)] {
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::invalid(
                field(name),
                format!("must be a non-negative finite number, got {}", value),
            ));
        }
    }
    for (name, value) in [
        ("feeding_chance", spec.feeding_chance),
        ("offspring_chance", spec.offspring_chance),
    ] {
        if value > 100 {
            return Err(SimError::invalid(
                field(name),
                format!("must be within 0..=100, got {}", value),
            ));
        }
    }
    if spec.base_hunger < 0 {
        return Err(SimError::invalid(
            field("base_hunger"),
            format!("must not be negative, got {}", spec.base_hunger),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip_through_text() {
        let config = SimulationConfig {
            seed: Some(9),
            ..Default::default()
        };
        let text = config.to_json_pretty().unwrap();
        assert_eq!(SimulationConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "name": "pond",
            "time_per_epoch": 10,
            "neighbour_update_interval": 2,
            "environment": { "style": "rectangular_periodic", "width": 50, "height": 40 },
            "populations": [
                {
                    "individuals_specs": {
                        "species_name": "heron", "trophic_level": 2, "speed": 2.0,
                        "base_hunger": 4, "feeding_range": 1.5, "feeding_chance": 70,
                        "offspring_chance": 10, "litter_size": 1
                    },
                    "initial_size": 3
                }
            ]
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.environment.width, 50.0);
        assert_eq!(config.populations[0].species.species_name, "heron");
    }

    #[test]
    fn test_unknown_species_field_rejected() {
        let json = r#"{
            "name": "pond", "time_per_epoch": 10, "neighbour_update_interval": 2,
            "populations": [{ "initial_size": 1, "species": {
                "species_name": "heron", "trophic_level": 2, "speed": 2.0,
                "base_hunger": 4, "feeding_range": 1.5, "feeding_chance": 70,
                "offspring_chance": 10, "litter_size": 1, "wingspan": 3
            }}]
        }"#;
        assert!(matches!(
            SimulationConfig::from_json_str(json),
            Err(SimError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_environment_style() {
        let mut config = SimulationConfig::default();
        config.environment.style = "spherical".to_string();
        match config.validate() {
            Err(SimError::UnknownEnvironment { style, available }) => {
                assert_eq!(style, "spherical");
                assert!(available.contains("rectangular_non_periodic"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_update_interval_rejected() {
        let config = SimulationConfig {
            neighbour_update_interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig { field, .. }) if field == "neighbour_update_interval"
        ));
    }

    #[test]
    fn test_bad_species_values_rejected() {
        let mut config = SimulationConfig::default();
        config.populations[1].species.feeding_chance = 101;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.populations[0].species.speed = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.populations[0].species.species_name = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.populations[1].species.species_name = "rabbit".to_string();
        assert!(config.validate().is_err());
    }
}
