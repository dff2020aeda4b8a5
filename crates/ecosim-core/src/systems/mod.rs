//! Systems - logic that operates on components

mod lifecycle;
mod neighbours;

pub use lifecycle::*;
pub use neighbours::*;
