//! EcoSim Core - Predator-Prey Ecosystem Simulation Engine
//!
//! Populations of organisms move around a bounded 2D environment, eat
//! organisms of strictly lower trophic level and reproduce once satiated.
//! Time advances in ticks grouped into fixed-length epochs; at each epoch
//! boundary offspring join their population and survivors are reset.
//!
//! # Architecture
//!
//! Organisms live in a single `hecs` world used as a generational arena:
//! - **Entities**: organisms, including not-yet-admitted offspring
//! - **Components**: pure data (`Organism`, `Body`, `Navigation`, `Neighbours`, `Offspring`)
//! - **Systems**: the organism lifecycle and the neighbour index
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`components`] | Organism data and the 2D vector type |
//! | [`navigation`] | Pluggable boundary/distance rules (walls, periodic edges) |
//! | [`systems`] | Move/eat/reproduce state machine, buffered neighbour lists |
//! | [`population`] | Same-species cohorts: deaths, births, epoch rollover |
//! | [`engine`] | Tick/epoch clock driving every population in trophic order |
//! | [`config`] | JSON configuration and validation |
//! | [`persistence`] | Epoch-boundary save/resume |
//! | [`report`] | Read-only counts and positions for printing and plotting |
//!
//! # Example
//!
//! ```rust,no_run
//! use ecosim_core::prelude::*;
//!
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config).unwrap();
//!
//! for report in sim.start_simulation(10).unwrap() {
//!     println!("{}", report);
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod navigation;
pub mod persistence;
pub mod population;
pub mod report;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{PopulationConfig, SimulationConfig};
    pub use crate::engine::Simulation;
    pub use crate::error::SimError;
    pub use crate::navigation::{EnvironmentConfig, Navigator, NavigatorStyle};
    pub use crate::report::{EpochReport, PopulationCount};
}
