//! Component definitions for the organism arena.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod common;
mod organism;

pub use common::*;
pub use organism::*;
